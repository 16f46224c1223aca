use crate::Reader;

/// Sample Size Box (stsz) - plaintext byte count of every sample.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StszBox {
    /// Size shared by every sample, zero when sizes are listed per sample.
    pub sample_size: u32,
    /// Number of samples declared by the box.
    pub sample_count: u32,
    /// Per sample sizes, empty when `sample_size` is non zero.
    pub entry_sizes: Vec<u32>,
}

impl StszBox {
    /// Parse the payload of a stsz box (everything after the box header).
    ///
    /// Layout: `version(1) + flags(3) + sample_size(4) + sample_count(4) + entry_size(4) * count`.
    /// An empty table is returned for payloads shorter than 12 bytes and a variable
    /// size table stops at the last complete entry.
    pub fn new(payload: &[u8]) -> Self {
        let mut reader = Reader::new(payload);

        let (Ok(_), Ok(sample_size), Ok(sample_count)) =
            (reader.read_u32(), reader.read_u32(), reader.read_u32())
        else {
            return Self::default();
        };

        let mut entry_sizes = Vec::new();

        if sample_size == 0 {
            let available = (reader.remaining() / 4).min(sample_count as u64) as usize;
            entry_sizes.reserve_exact(available);

            for _ in 0..available {
                match reader.read_u32() {
                    Ok(size) => entry_sizes.push(size),
                    Err(_) => break,
                }
            }

            if available < sample_count as usize {
                log::warn!(
                    "stsz declares {} samples but lists only {}",
                    sample_count,
                    available
                );
            }
        }

        Self {
            sample_size,
            sample_count,
            entry_sizes,
        }
    }

    /// Number of decoded sample sizes.
    pub fn len(&self) -> usize {
        if self.sample_size != 0 {
            self.sample_count as usize
        } else {
            self.entry_sizes.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of sample `index`.
    pub fn get(&self, index: usize) -> Option<u32> {
        if self.sample_size != 0 {
            (index < self.sample_count as usize).then_some(self.sample_size)
        } else {
            self.entry_sizes.get(index).copied()
        }
    }

    /// Sizes of every sample in declared order.
    pub fn sizes(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).filter_map(|index| self.get(index))
    }

    /// Sum of every sample size.
    pub fn total_size(&self) -> u64 {
        self.sizes().map(u64::from).sum()
    }
}
