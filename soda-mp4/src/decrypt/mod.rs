//! Whole sample AES-CTR decryption for Soda Music downloads.
//!
//! Downloads are plain (non fragmented) `m4a` files with a single audio track. The
//! encryption metadata lives in the sample table:
//!
//! | Box | Used for |
//! |-----|----------|
//! | `moov/trak/mdia/minf/stbl/stsz` | sample sizes |
//! | `moov/senc` (or `moov/trak/mdia/minf/stbl/senc`) | one 8 byte IV per sample |
//! | `moov/trak/mdia/minf/stbl/stsd` | the `enca` sample entry |
//! | `mdat` | the samples, back to back |
//!
//! # Quick Start
//!
//! ```no_run
//! use std::fs;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut data = fs::read("encrypted.m4a")?;
//!
//!     let info = soda_mp4::inspect(&data)?;
//!     println!("{} samples, {} IVs", info.sample_count, info.iv_count);
//!
//!     let stats = soda_mp4::decrypt(&mut data, "nL8T+VS+E/dbvhz1VLkc91W6EvVapRLcW6UT3lqiE9xZoA==")?;
//!     println!("{} samples decrypted", stats.samples_decrypted);
//!     fs::write("decrypted.m4a", data)?;
//!     Ok(())
//! }
//! ```
//!
//! # Thread Safety
//!
//! There is no shared state between calls. Separate buffers can be decrypted from
//! separate threads without any coordination.

mod cipher;
mod processor;

pub use cipher::SampleCipher;
pub use processor::{ContainerInfo, DecryptStats, decrypt, inspect};
