#![cfg_attr(docsrs, feature(doc_cfg))]

//! This crate restores playable audio from the copy-protected `m4a` files served by
//! Soda Music (汽水音乐).
//!
//! Downloads from that platform are ordinary single track mp4 containers whose samples are
//! encrypted with AES-CTR, one IV per sample stored in a `senc` box. The AES key is not
//! delivered by a license server but hidden inside the `PlayAuth` token returned next to the
//! playback url. This crate recovers that key, decrypts every sample in place and patches
//! the sample description so that any player accepts the file.
//!
//! Nothing here touches the network or the filesystem, callers hand over the complete
//! file as a byte buffer.
//!
//! # Example
//!
//! ```no_run
//! use std::fs;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut data = fs::read("encrypted.m4a")?;
//!     soda_mp4::decrypt(&mut data, "nL8T+VS+E/dbvhz1VLkc91W6EvVapRLcW6UT3lqiE9xZoA==")?;
//!     fs::write("decrypted.m4a", data)?;
//!     Ok(())
//! }
//! ```
//!
//! # Optional Features
//!
//! - **serde**: Derives `Serialize` for [`ContainerInfo`].

pub mod boxes;
pub mod decrypt;

mod error;
mod parser;
mod play_auth;
mod reader;

pub use decrypt::{ContainerInfo, DecryptStats, decrypt, inspect};
pub use error::Error;
pub use parser::*;
pub use play_auth::{ContentKey, recover_key};
pub use reader::Reader;

/// A `Result` alias where the `Err` case is `soda_mp4::Error`.
pub type Result<T> = std::result::Result<T, Error>;
