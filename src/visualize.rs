//! ASCII rendering of normalized fingerprints.

use std::fmt;

use crate::dataset::CLASSES;
use crate::fingerprint::NormalizedTable;

/// Intensity bands, checked from the top.
const BANDS: [(f64, u8); 3] = [(0.06, b'*'), (0.03, b'+'), (0.015, b'.')];

/// Symbol for a single normalized intensity.
pub fn symbol(value: f64) -> u8 {
    BANDS
        .iter()
        .find(|(cutoff, _)| value > *cutoff)
        .map_or(b' ', |&(_, s)| s)
}

/// One symbol per fingerprint cell, for every class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualGrid {
    col_count: usize,
    width: usize,
    cells: Vec<u8>,
}

impl VisualGrid {
    pub fn render(table: &NormalizedTable) -> Self {
        Self {
            col_count: table.col_count() as usize,
            width: table.width(),
            cells: table.values.iter().map(|&v| symbol(v)).collect(),
        }
    }

    pub fn class(&self, digit: usize) -> &[u8] {
        &self.cells[digit * self.width..(digit + 1) * self.width]
    }

    /// Rows of `col_count` symbols for class `digit`.
    pub fn lines(&self, digit: usize) -> impl Iterator<Item = &str> + '_ {
        self.class(digit)
            .chunks(self.col_count.max(1))
            // symbols are always ASCII
            .map(|line| std::str::from_utf8(line).unwrap_or_default())
    }
}

impl fmt::Display for VisualGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for digit in 0..CLASSES {
            for line in self.lines(digit) {
                writeln!(f, "{line}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{encode_images, encode_labels, RawDataset};
    use crate::fingerprint::FingerprintTable;

    #[test]
    fn thresholds() {
        assert_eq!(symbol(1.0), b'*');
        assert_eq!(symbol(0.0601), b'*');
        assert_eq!(symbol(0.06), b'+');
        assert_eq!(symbol(0.031), b'+');
        assert_eq!(symbol(0.03), b'.');
        assert_eq!(symbol(0.016), b'.');
        assert_eq!(symbol(0.015), b' ');
        assert_eq!(symbol(0.0), b' ');
    }

    #[test]
    fn renders_and_wraps_by_column_count() {
        // One 2x2 image of class 0 with each band represented.
        let v = |x: f64| (x * 255.0).round() as u8;
        let image = [v(0.5), v(0.045), v(0.02), 0];
        let dataset =
            RawDataset::from_bytes(&encode_images(2, 2, &[&image[..]]), &encode_labels(&[0])).unwrap();
        let grid = VisualGrid::render(&FingerprintTable::accumulate(&dataset).normalize());

        assert_eq!(grid.class(0), b"*+. ");
        assert_eq!(grid.lines(0).collect::<Vec<_>>(), vec!["*+", ". "]);
        assert_eq!(grid.class(9), b"    ");

        let printed = grid.to_string();
        assert_eq!(printed.lines().count(), 10 * 2);
        assert!(printed.starts_with("*+\n. \n  \n"));
    }
}
