/*
    REFERENCES
    ----------

    1. ISO/IEC 14496-12 section 4.2 (Object Structure)

*/

use std::ops::Range;

/// size(4 bytes) + type(4 bytes) = 8 bytes
pub const BOX_HEADER_SIZE: usize = 8;

/// A box located inside a buffer.
///
/// This is only a view, the payload borrows from the buffer the box was found in.
#[derive(Clone, Copy)]
pub struct Mp4Box<'a> {
    data: &'a [u8],
    /// The box name, a 4-character code (fourcc).
    pub name: [u8; 4],
    /// The start of this box (before the header) in the original buffer.
    pub offset: usize,
    /// The size of this box (including the header).
    pub size: usize,
}

impl<'a> Mp4Box<'a> {
    /// The bytes following the box header.
    pub fn payload(&self) -> &'a [u8] {
        &self.data[self.payload_range()]
    }

    /// Absolute range of the payload in the original buffer.
    /// Useful for modifying boxes in place.
    pub fn payload_range(&self) -> Range<usize> {
        self.offset + BOX_HEADER_SIZE..self.end()
    }

    /// Absolute end of the box in the original buffer.
    pub fn end(&self) -> usize {
        self.offset + self.size
    }

    /// Box name as a string, lossy for non ascii codes.
    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    /// Find a direct child of this box.
    pub fn child(&self, name: &str) -> Option<Mp4Box<'a>> {
        find_box(self.data, name, self.offset + BOX_HEADER_SIZE, self.end())
    }
}

impl std::fmt::Debug for Mp4Box<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mp4Box")
            .field("name", &self.name())
            .field("offset", &self.offset)
            .field("size", &self.size)
            .finish()
    }
}

/// Find a box named `name` among the sibling boxes laid out in `data[start..end]`.
///
/// Only the given level is scanned, nested boxes are reached by chaining calls
/// (see [`Mp4Box::child`]). Returns `None` when no sibling matches, when a box header
/// declares a size smaller than the header itself or when the matching box runs past `end`.
pub fn find_box<'a>(data: &'a [u8], name: &str, start: usize, end: usize) -> Option<Mp4Box<'a>> {
    let target = type_from_string(name)?;
    let end = end.min(data.len());
    let mut pos = start;

    while pos + BOX_HEADER_SIZE <= end {
        let size = u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
            as usize;

        if size < BOX_HEADER_SIZE {
            log::debug!("corrupt box header at {pos} (declared size {size})");
            return None;
        }

        if data[pos + 4..pos + 8] == target {
            if pos + size > end {
                log::debug!(
                    "'{name}' box at {pos} declares {size} bytes but only {} are available",
                    end - pos
                );
                return None;
            }

            return Some(Mp4Box {
                data,
                name: target,
                offset: pos,
                size,
            });
        }

        pos += size;
    }

    None
}

/// Convert an ascii string name to the 4 byte code of a box.
/// Returns `None` unless the name is exactly four bytes long.
pub fn type_from_string(name: &str) -> Option<[u8; 4]> {
    name.as_bytes().try_into().ok()
}
