//! Pure chunk planning for multipart uploads.

/// One part's slot in the upload: 1-based number and exact byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    /// 1-based part number, contiguous across the session
    pub number: u32,

    /// Offset of the first byte within the source file
    pub start: u64,

    /// Exact number of bytes in this part
    pub length: u64,
}

/// Number of parts needed to cover `file_size` bytes in `chunk_size` chunks.
pub fn part_count(file_size: u64, chunk_size: u64) -> u64 {
    debug_assert!(chunk_size > 0);
    file_size.div_ceil(chunk_size)
}

/// Byte ranges of every part, in part-number order.
///
/// Ranges are contiguous and exactly cover `[0, file_size)`; every part but
/// the last has length `chunk_size`.
pub fn part_ranges(file_size: u64, chunk_size: u64) -> Vec<PartRange> {
    let count = part_count(file_size, chunk_size);
    (1..=count)
        .map(|number| {
            let start = (number - 1) * chunk_size;
            let end = (start + chunk_size).min(file_size);
            PartRange {
                number: number as u32,
                start,
                length: end - start,
            }
        })
        .collect()
}
