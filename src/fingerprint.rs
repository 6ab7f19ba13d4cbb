//! Per-class intensity accumulation and normalization.

use log::debug;

use crate::dataset::{RawDataset, CLASSES};

const PROGRESS_EVERY: usize = 1000;

/// Per-class sums of pixel intensity over every training image of that class.
///
/// Cells are stored class-major, `width` cells per class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintTable {
    pub(crate) image_count: u32,
    pub(crate) row_count: u32,
    pub(crate) col_count: u32,
    /// [`RawDataset::checksum`] of the dataset the sums came from.
    pub(crate) checksum: u32,
    pub(crate) sums: Vec<u64>,
}

impl FingerprintTable {
    /// A zeroed table for images of `row_count * col_count` pixels.
    pub fn zeroed(image_count: u32, row_count: u32, col_count: u32) -> Self {
        let width = table_width(row_count, col_count);
        Self {
            image_count,
            row_count,
            col_count,
            checksum: 0,
            sums: vec![0; CLASSES * width],
        }
    }

    /// Sums every image of `dataset` into the row of its label.
    ///
    /// Source pixels are read row-major with stride `col_count`, but written
    /// with stride `row_count`. The two agree on square images; on non-square
    /// ones distinct pixels can land in the same cell.
    pub fn accumulate(dataset: &RawDataset) -> Self {
        let rows = dataset.row_count() as usize;
        let cols = dataset.col_count() as usize;
        let pixels = dataset.pixels_per_image();
        let mut table = Self::zeroed(
            dataset.image_count(),
            dataset.row_count(),
            dataset.col_count(),
        );
        table.checksum = dataset.checksum();
        let width = table.width();

        for (i, &label) in dataset.labels().iter().enumerate() {
            let image = &dataset.pixels()[i * pixels..(i + 1) * pixels];
            let row = &mut table.sums[label as usize * width..(label as usize + 1) * width];
            for r in 0..rows {
                for c in 0..cols {
                    row[c + r * rows] += image[c + r * cols] as u64;
                }
            }
            if i % PROGRESS_EVERY == 0 {
                debug!("{i} done.");
            }
        }
        table
    }

    pub fn image_count(&self) -> u32 {
        self.image_count
    }

    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    pub fn col_count(&self) -> u32 {
        self.col_count
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Cells per class.
    pub fn width(&self) -> usize {
        table_width(self.row_count, self.col_count)
    }

    /// Accumulated sums of class `digit`.
    pub fn class(&self, digit: usize) -> &[u64] {
        let width = self.width();
        &self.sums[digit * width..(digit + 1) * width]
    }

    /// Average intensity per cell: `sum / 255 / image_count`.
    ///
    /// Only the first `row_count * col_count` cells of each class are kept;
    /// anything a tall image's stride wrote past them is dropped.
    pub fn normalize(&self) -> NormalizedTable {
        debug!("normalizing...");
        let count = self.image_count as f64;
        let pixels = self.row_count as usize * self.col_count as usize;
        let mut values = Vec::with_capacity(CLASSES * pixels);
        for digit in 0..CLASSES {
            let sums = &self.class(digit)[..pixels];
            values.extend(sums.iter().map(|&sum| {
                if self.image_count == 0 {
                    0.0
                } else {
                    sum as f64 / 255.0 / count
                }
            }));
        }
        NormalizedTable {
            row_count: self.row_count,
            col_count: self.col_count,
            values,
        }
    }
}

/// Fingerprints scaled into `[0, 1]`, `row_count * col_count` cells per class.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub(crate) row_count: u32,
    pub(crate) col_count: u32,
    pub(crate) values: Vec<f64>,
}

impl NormalizedTable {
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    pub fn col_count(&self) -> u32 {
        self.col_count
    }

    /// Cells per class, one per image pixel.
    pub fn width(&self) -> usize {
        self.row_count as usize * self.col_count as usize
    }

    pub fn class(&self, digit: usize) -> &[f64] {
        let width = self.width();
        &self.values[digit * width..(digit + 1) * width]
    }
}

/// Row stride times the longer side, so a `row_count` write stride stays in
/// bounds. Equals `rows * cols` for square images.
pub(crate) fn table_width(row_count: u32, col_count: u32) -> usize {
    row_count as usize * row_count.max(col_count) as usize
}
