//! Fixed-width big-endian decoding for the IDX file layout.

/// Interprets the 4 bytes starting at `offset` as a big-endian `u32`.
///
/// Panics if `offset + 4 > bytes.len()`; callers only use the fixed header
/// offsets of files whose length has already been checked.
pub fn read_u32_be(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Appends `value` to `out` as 4 big-endian bytes.
pub fn write_u32_be(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}
