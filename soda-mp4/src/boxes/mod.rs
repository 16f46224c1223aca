//! Decoders for the sample table boxes needed to walk the media data.
//!
//! Both decoders are lenient: a payload that ends early yields a short table
//! instead of an error, the caller decides what to do with the samples left over.

mod senc;
mod stsz;

pub use senc::SencBox;
pub use stsz::StszBox;
