use crate::Reader;

/// Flag set when every sample entry carries a subsample map.
const USE_SUBSAMPLE_ENCRYPTION: u32 = 0x02;

/// Sample Encryption Box (senc) - contains the per-sample IVs.
///
/// Samples are expected to use 8 byte IVs. Subsample maps are skipped, only
/// whole sample encryption is supported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SencBox {
    /// Flags from the full box header.
    pub flags: u32,
    /// Number of samples declared by the box.
    pub sample_count: u32,
    /// Counter blocks for AES-CTR, the 8 byte IV followed by 8 zero bytes.
    pub ivs: Vec<[u8; 16]>,
}

impl SencBox {
    /// Parse the payload of a senc box (everything after the box header).
    ///
    /// Layout: `version(1) + flags(3) + sample_count(4)` followed by
    /// `iv(8) [+ subsample_count(2) + subsample_count * 6]` for each sample.
    /// Stops at the first entry that does not fit the payload.
    pub fn new(payload: &[u8]) -> Self {
        let mut reader = Reader::new(payload);

        let (Ok(version_and_flags), Ok(sample_count)) = (reader.read_u32(), reader.read_u32())
        else {
            return Self::default();
        };

        let flags = version_and_flags & 0xFFFFFF;
        let has_subsamples = flags & USE_SUBSAMPLE_ENCRYPTION != 0;
        let mut ivs = Vec::with_capacity((reader.remaining() / 8).min(sample_count as u64) as usize);

        for _ in 0..sample_count {
            let Ok(raw_iv) = reader.read_array::<8>() else {
                break;
            };

            let mut iv = [0; 16];
            iv[..8].copy_from_slice(&raw_iv);
            ivs.push(iv);

            if has_subsamples {
                let Ok(subsample_count) = reader.read_u16() else {
                    break;
                };

                // bytes_of_clear_data(2) + bytes_of_protected_data(4)
                if reader.skip(subsample_count as u64 * 6).is_err() {
                    break;
                }
            }
        }

        if ivs.len() < sample_count as usize {
            log::warn!(
                "senc declares {} samples but only {} IVs could be read",
                sample_count,
                ivs.len()
            );
        }

        Self {
            flags,
            sample_count,
            ivs,
        }
    }

    /// Check if this senc box has subsample encryption info.
    pub fn has_subsamples(&self) -> bool {
        self.flags & USE_SUBSAMPLE_ENCRYPTION != 0
    }

    /// Counter block of sample `index`, if one was read.
    pub fn iv(&self, index: usize) -> Option<&[u8; 16]> {
        self.ivs.get(index)
    }
}
