//! Subword replication (write path) and extraction (read path), plus the
//! byte-enable mask generation shared by both.

/// Computes the byte-enable mask for a `len`-byte access at `offset` within
/// a `line_bytes`-wide line. `len == 0` denotes a full `dbw_bytes`-wide word.
#[must_use]
pub fn byte_enable_mask(offset: usize, len: u8, dbw_bytes: usize, line_bytes: usize) -> Vec<bool> {
    let width = if len == 0 { dbw_bytes } else { len as usize };
    let mut mask = vec![false; line_bytes];
    for b in mask.iter_mut().skip(offset).take(width) {
        *b = true;
    }
    mask
}

/// Replicates a subword write value across a full cacheline-sized buffer so
/// that, combined with [`byte_enable_mask`], only the targeted bytes are
/// actually deposited.
///
/// `data` is taken little-endian from the low bytes of `value`.
#[must_use]
pub fn replicate(value: u64, offset: usize, len: u8, dbw_bytes: usize, line_bytes: usize) -> Vec<u8> {
    let width = if len == 0 { dbw_bytes } else { len as usize };
    let mut line = vec![0u8; line_bytes];
    let bytes = value.to_le_bytes();
    for i in 0..width {
        if offset + i < line_bytes {
            line[offset + i] = bytes[i];
        }
    }
    line
}

/// Extracts a `len`-byte subword from a full cacheline read at `offset`,
/// zero-extended into a `u64`. `len == 0` denotes a full `dbw_bytes`-wide
/// word.
#[must_use]
pub fn extract(line: &[u8], offset: usize, len: u8, dbw_bytes: usize) -> u64 {
    let width = if len == 0 { dbw_bytes } else { len as usize };
    let mut bytes = [0u8; 8];
    for i in 0..width {
        if offset + i < line.len() {
            bytes[i] = line[offset + i];
        }
    }
    u64::from_le_bytes(bytes)
}
