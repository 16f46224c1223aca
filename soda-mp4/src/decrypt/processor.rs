use super::cipher::SampleCipher;
use crate::{
    Error, Mp4Box, Result,
    boxes::{SencBox, StszBox},
    find_box, recover_key,
};
use std::ops::Range;

const ENCRYPTED_AUDIO_ENTRY: &[u8; 4] = b"enca";
const PLAIN_AUDIO_ENTRY: &[u8; 4] = b"mp4a";
const FREE_SPACE: &[u8; 4] = b"free";

/// Counters describing what one [`decrypt`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecryptStats {
    /// Samples that had an IV and went through AES-CTR.
    pub samples_decrypted: usize,
    /// Samples without an IV, copied verbatim.
    pub samples_copied: usize,
    /// Trailing mdat bytes not covered by the sample table, left unchanged.
    pub bytes_untouched: usize,
    /// Whether the `enca` sample entry was renamed to `mp4a`.
    pub entry_patched: bool,
}

/// Summary of an encrypted container, see [`inspect`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ContainerInfo {
    /// Number of entries in the sample size table.
    pub sample_count: usize,
    /// Sum of every sample size.
    pub sample_bytes: u64,
    /// Number of IVs in the sample encryption box.
    pub iv_count: usize,
    /// Whether the sample encryption box carries subsample maps.
    pub has_subsamples: bool,
    /// Length of the mdat payload.
    pub mdat_size: usize,
    /// Whether the sample description still advertises `enca`.
    pub encrypted_entry: bool,
}

/// Boxes needed for decryption, located along `moov/trak/mdia/minf/stbl`.
struct Layout<'a> {
    stsz: Mp4Box<'a>,
    senc: Mp4Box<'a>,
    stsd: Mp4Box<'a>,
    mdat: Mp4Box<'a>,
}

impl<'a> Layout<'a> {
    fn locate(data: &'a [u8]) -> Result<Self> {
        let moov = find_box(data, "moov", 0, data.len()).ok_or_else(|| Error::missing("moov"))?;
        let trak = require(&moov, "trak")?;
        let mdia = require(&trak, "mdia")?;
        let minf = require(&mdia, "minf")?;
        let stbl = require(&minf, "stbl")?;

        let stsz = require(&stbl, "stsz")?;
        let senc = moov
            .child("senc")
            .or_else(|| stbl.child("senc"))
            .ok_or_else(|| Error::missing("senc"))?;
        let stsd = require(&stbl, "stsd")?;
        let mdat = find_box(data, "mdat", 0, data.len()).ok_or_else(|| Error::missing("mdat"))?;

        log::debug!("located {:?} {:?} {:?} {:?}", stsz, senc, stsd, mdat);

        Ok(Self {
            stsz,
            senc,
            stsd,
            mdat,
        })
    }

    /// Absolute offset of the `enca` marker inside the sample description.
    fn encrypted_entry(&self) -> Option<usize> {
        self.stsd
            .payload()
            .windows(4)
            .position(|window| window == ENCRYPTED_AUDIO_ENTRY)
            .map(|position| self.stsd.payload_range().start + position)
    }
}

fn require<'a>(parent: &Mp4Box<'a>, name: &str) -> Result<Mp4Box<'a>> {
    parent.child(name).ok_or_else(|| Error::missing(name))
}

/// Byte ranges to overwrite once everything that can fail has succeeded.
struct Patch {
    mdat: Range<usize>,
    plaintext: Vec<u8>,
    senc_name: Range<usize>,
    entry: Option<usize>,
}

/// Decrypt a Soda Music download in place.
///
/// Every sample listed in `stsz` that has an IV in `senc` is decrypted with the key
/// recovered from `play_auth`, samples without an IV are kept as they are. Afterwards the
/// `enca` sample entry becomes `mp4a` and the `senc` box is turned into a `free` box,
/// so decrypting the same buffer twice fails with [`Error::MalformedContainer`].
///
/// The buffer is left untouched when an error is returned.
///
/// # Errors
///
/// - [`Error::MalformedContainer`] naming the first required box that could not be found.
/// - [`Error::InvalidToken`] when no key can be recovered from `play_auth`.
/// - [`Error::SizeMismatch`] only on an internal fault: the sample walk keeps every byte
///   it does not decrypt, so the rebuilt media data always has the original length.
pub fn decrypt(data: &mut [u8], play_auth: &str) -> Result<DecryptStats> {
    let (patch, mut stats) = prepare(data, play_auth)?;

    data[patch.mdat].copy_from_slice(&patch.plaintext);
    data[patch.senc_name].copy_from_slice(FREE_SPACE);

    if let Some(offset) = patch.entry {
        data[offset..offset + 4].copy_from_slice(PLAIN_AUDIO_ENTRY);
        stats.entry_patched = true;
    } else {
        log::warn!("sample description has no 'enca' entry, leaving it as is");
    }

    log::debug!("{stats:?}");
    Ok(stats)
}

fn prepare(data: &[u8], play_auth: &str) -> Result<(Patch, DecryptStats)> {
    let layout = Layout::locate(data)?;
    let stsz = StszBox::new(layout.stsz.payload());
    let senc = SencBox::new(layout.senc.payload());
    let key = recover_key(play_auth)?;
    let cipher = SampleCipher::new(&key)?;

    let payload = layout.mdat.payload();

    if stsz.total_size() != payload.len() as u64 {
        log::warn!(
            "sample sizes add up to {} bytes but mdat holds {} bytes",
            stsz.total_size(),
            payload.len()
        );
    }

    if senc.ivs.len() < stsz.len() {
        log::warn!(
            "only {} of {} samples have an IV, the rest are copied verbatim",
            senc.ivs.len(),
            stsz.len()
        );
    }

    let (plaintext, stats) = decrypt_samples(&cipher, &stsz, &senc, payload);

    if plaintext.len() != payload.len() {
        return Err(Error::SizeMismatch {
            expected: payload.len(),
            actual: plaintext.len(),
        });
    }

    let senc_name = layout.senc.offset + 4..layout.senc.offset + 8;

    Ok((
        Patch {
            mdat: layout.mdat.payload_range(),
            plaintext,
            senc_name,
            entry: layout.encrypted_entry(),
        },
        stats,
    ))
}

/// Walk the mdat payload sample by sample.
///
/// The walk stops at the first sample that would overrun the payload. Whatever is left
/// after the last complete sample is appended unchanged.
fn decrypt_samples(
    cipher: &SampleCipher,
    stsz: &StszBox,
    senc: &SencBox,
    payload: &[u8],
) -> (Vec<u8>, DecryptStats) {
    let mut output = Vec::with_capacity(payload.len());
    let mut stats = DecryptStats::default();
    let mut offset = 0;

    for (index, size) in stsz.sizes().enumerate() {
        let size = size as usize;

        let Some(sample) = payload.get(offset..offset + size) else {
            log::warn!(
                "sample {index} of {size} bytes at offset {offset} overruns mdat ({} bytes)",
                payload.len()
            );
            break;
        };

        let start = output.len();
        output.extend_from_slice(sample);

        if let Some(iv) = senc.iv(index) {
            log::trace!("sample {index}: {size} bytes decrypted");
            cipher.apply(iv, &mut output[start..]);
            stats.samples_decrypted += 1;
        } else {
            log::trace!("sample {index}: {size} bytes copied");
            stats.samples_copied += 1;
        }

        offset += size;
    }

    stats.bytes_untouched = payload.len() - offset;
    output.extend_from_slice(&payload[offset..]);
    (output, stats)
}

/// Describe an encrypted container without modifying it.
///
/// Fails like [`decrypt`] when a required box is missing, no token is involved.
pub fn inspect(data: &[u8]) -> Result<ContainerInfo> {
    let layout = Layout::locate(data)?;
    let stsz = StszBox::new(layout.stsz.payload());
    let senc = SencBox::new(layout.senc.payload());

    Ok(ContainerInfo {
        sample_count: stsz.len(),
        sample_bytes: stsz.total_size(),
        iv_count: senc.ivs.len(),
        has_subsamples: senc.has_subsamples(),
        mdat_size: layout.mdat.payload().len(),
        encrypted_entry: layout.encrypted_entry().is_some(),
    })
}
