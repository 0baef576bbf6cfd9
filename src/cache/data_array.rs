//! Data array: one cacheline per `{way, index}`, with byte-masked writes.

use crate::config::CacheParams;

/// The `{way}[{index}]` data store. Each cell holds up to 256 bits
/// (`clw` is expected to be 64/128/256); a `u128` plus an overflow byte
/// vector would be overkill for this cache's supported widths, so cells are
/// stored as raw byte vectors sized to `clw/8`.
#[derive(Debug, Clone)]
pub struct DataArray {
    ways: usize,
    lines_per_way: usize,
    line_bytes: usize,
    cells: Vec<Vec<u8>>,
}

impl DataArray {
    /// Builds a data array sized for `params`, zero-initialized.
    #[must_use]
    pub fn new(params: &CacheParams) -> Self {
        let ways = params.associativity;
        let lines_per_way = params.lines_per_way();
        let line_bytes = params.line_bytes();
        Self {
            ways,
            lines_per_way,
            line_bytes,
            cells: vec![vec![0u8; line_bytes]; ways * lines_per_way],
        }
    }

    fn slot(&self, way: usize, index: usize) -> usize {
        way * self.lines_per_way + index
    }

    /// Reads the full cacheline at `{way, index}`.
    #[must_use]
    pub fn read(&self, way: usize, index: usize) -> &[u8] {
        &self.cells[self.slot(way, index)]
    }

    /// Writes `data` into the cacheline at `{way, index}`, honoring
    /// `byte_mask`: byte `i` of the line is overwritten iff bit `i` of
    /// `byte_mask` is set.
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not match the configured line size; this
    /// is an internal-caller contract, not a reachable request-level error.
    pub fn write_masked(&mut self, way: usize, index: usize, data: &[u8], byte_mask: &[bool]) {
        assert_eq!(data.len(), self.line_bytes, "cacheline width mismatch");
        let slot = self.slot(way, index);
        let cell = &mut self.cells[slot];
        for (byte_idx, &enabled) in byte_mask.iter().enumerate() {
            if enabled {
                cell[byte_idx] = data[byte_idx];
            }
        }
    }

    /// Number of ways.
    #[must_use]
    pub const fn ways(&self) -> usize {
        self.ways
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> CacheParams {
        CacheParams {
            size_bytes: 32,
            associativity: 1,
            clw: 128,
            ..CacheParams::default()
        }
    }

    #[test]
    fn fresh_array_reads_zero() {
        let array = DataArray::new(&params());
        assert!(array.read(0, 0).iter().all(|&b| b == 0));
    }

    #[test]
    fn masked_write_only_touches_enabled_bytes() {
        let mut array = DataArray::new(&params());
        let full = vec![0xFFu8; 16];
        let mask: Vec<bool> = (0..16).map(|i| i == 4 || i == 5).collect();
        array.write_masked(0, 0, &full, &mask);
        let line = array.read(0, 0);
        assert_eq!(line[4], 0xFF);
        assert_eq!(line[5], 0xFF);
        assert_eq!(line[0], 0);
        assert_eq!(line[6], 0);
    }

    #[test]
    #[should_panic(expected = "cacheline width mismatch")]
    fn write_masked_rejects_wrong_length() {
        let mut array = DataArray::new(&params());
        array.write_masked(0, 0, &[0u8; 4], &[true; 4]);
    }
}
