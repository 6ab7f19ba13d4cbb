//! On-disk store for accumulated fingerprint tables.
//!
//! Layout, every field a big-endian `u32` after the 4-byte magic:
//!
//! ```text
//! "MNFP" version class_count image_count row_count col_count width checksum
//! sums[class_count * width]   (class-major)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::bytes::{read_u32_be, write_u32_be};
use crate::dataset::{RawDataset, CLASSES};
use crate::error::CacheError;
use crate::fingerprint::{table_width, FingerprintTable};

pub const MAGIC: [u8; 4] = *b"MNFP";
pub const VERSION: u32 = 2;

const HEADER: usize = 4 + 7 * 4;

/// Serializes `table` into the cache layout.
pub fn encode(table: &FingerprintTable) -> Result<Vec<u8>, CacheError> {
    let width = table.width();
    let mut out = Vec::with_capacity(HEADER + table.sums.len() * 4);
    out.extend_from_slice(&MAGIC);
    for field in [
        VERSION,
        CLASSES as u32,
        table.image_count,
        table.row_count,
        table.col_count,
        width as u32,
        table.checksum,
    ] {
        write_u32_be(&mut out, field);
    }
    for (i, &sum) in table.sums.iter().enumerate() {
        let sum = u32::try_from(sum).map_err(|_| CacheError::SumOverflow {
            class: i / width.max(1),
            sum,
        })?;
        write_u32_be(&mut out, sum);
    }
    Ok(out)
}

/// Parses a cache buffer produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<FingerprintTable, CacheError> {
    if bytes.len() < HEADER {
        return Err(CacheError::Truncated {
            len: bytes.len(),
            expected: HEADER,
        });
    }
    let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
    if magic != MAGIC {
        return Err(CacheError::BadMagic(magic));
    }
    let version = read_u32_be(bytes, 4);
    if version != VERSION {
        return Err(CacheError::UnsupportedVersion(version));
    }
    let class_count = read_u32_be(bytes, 8);
    if class_count as usize != CLASSES {
        return Err(CacheError::Layout(format!(
            "{class_count} classes instead of {CLASSES}"
        )));
    }
    let image_count = read_u32_be(bytes, 12);
    let row_count = read_u32_be(bytes, 16);
    let col_count = read_u32_be(bytes, 20);
    let width = read_u32_be(bytes, 24) as usize;
    let checksum = read_u32_be(bytes, 28);
    if width != table_width(row_count, col_count) {
        return Err(CacheError::Layout(format!(
            "width {width} does not fit {row_count}x{col_count} images"
        )));
    }

    let expected = HEADER + CLASSES * width * 4;
    if bytes.len() != expected {
        return Err(CacheError::Truncated {
            len: bytes.len(),
            expected,
        });
    }
    let sums = (0..CLASSES * width)
        .map(|i| read_u32_be(bytes, HEADER + i * 4) as u64)
        .collect();

    Ok(FingerprintTable {
        image_count,
        row_count,
        col_count,
        checksum,
        sums,
    })
}

/// A fingerprint table persisted at a fixed path.
#[derive(Debug, Clone)]
pub struct FingerprintCache {
    path: PathBuf,
}

impl FingerprintCache {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<FingerprintTable, CacheError> {
        let bytes = fs::read(&self.path)?;
        decode(&bytes)
    }

    pub fn save(&self, table: &FingerprintTable) -> Result<(), CacheError> {
        let bytes = encode(table)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    /// Loads the cached table built from `dataset`. Tables from a dataset with
    /// other contents or geometry are stale and rejected.
    pub fn load_for(&self, dataset: &RawDataset) -> Result<FingerprintTable, CacheError> {
        let table = self.load()?;
        let found = (
            table.image_count,
            table.row_count,
            table.col_count,
            table.checksum,
        );
        let expected = (
            dataset.image_count(),
            dataset.row_count(),
            dataset.col_count(),
            dataset.checksum(),
        );
        if found != expected {
            let show = |(n, r, c, crc): (u32, u32, u32, u32)| {
                format!("{n} images of {r}x{c}, crc {crc:#010x}")
            };
            return Err(CacheError::Stale {
                found: show(found),
                expected: show(expected),
            });
        }
        Ok(table)
    }

    /// Returns the cached table, or accumulates `dataset` and rewrites the
    /// cache when the cached copy is missing or unusable.
    pub fn load_or_accumulate(&self, dataset: &RawDataset) -> FingerprintTable {
        match self.load_for(dataset) {
            Ok(table) => {
                info!("Loaded fingerprints from {:?}", self.path);
                return table;
            }
            Err(e) => warn!("Ignoring fingerprint cache {:?}: {e}", self.path),
        }

        let table = FingerprintTable::accumulate(dataset);
        match self.save(&table) {
            Ok(()) => info!("Saved fingerprints to {:?}", self.path),
            Err(e) => warn!("Could not write fingerprint cache {:?}: {e}", self.path),
        }
        table
    }
}
