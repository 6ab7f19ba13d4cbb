use std::path::PathBuf;

use thiserror::Error;

/// Which of the two IDX files a format problem was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdxKind {
    Images,
    Labels,
}

impl std::fmt::Display for IdxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdxKind::Images => f.write_str("image"),
            IdxKind::Labels => f.write_str("label"),
        }
    }
}

/// The dataset files do not follow the IDX layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("{kind} file has magic {found:#010x}, expected {expected:#010x}")]
    BadMagic {
        kind: IdxKind,
        expected: u32,
        found: u32,
    },
    #[error("{kind} file is {len} bytes, shorter than its {header}-byte header")]
    HeaderTooShort {
        kind: IdxKind,
        len: usize,
        header: usize,
    },
    #[error("{kind} file declares {declared} payload bytes but only {available} remain")]
    Truncated {
        kind: IdxKind,
        declared: u64,
        available: usize,
    },
    #[error("{kind} file declares {count} items of {rows}x{cols}, too large to address")]
    TooLarge {
        kind: IdxKind,
        count: u32,
        rows: u32,
        cols: u32,
    },
    #[error("label file has {labels} items but image file has {images}")]
    CountMismatch { labels: u32, images: u32 },
    #[error("label {label} at index {index} is not a digit")]
    LabelOutOfRange { index: usize, label: u8 },
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a fingerprint cache (magic {0:?})")]
    BadMagic([u8; 4]),
    #[error("unsupported cache version {0}")]
    UnsupportedVersion(u32),
    #[error("cache is {len} bytes, expected {expected}")]
    Truncated { len: usize, expected: usize },
    #[error("malformed cache layout: {0}")]
    Layout(String),
    #[error("class {class} has a sum of {sum}, too large for the cache format")]
    SumOverflow { class: usize, sum: u64 },
    #[error("cache geometry {found} does not match dataset {expected}")]
    Stale { found: String, expected: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("query has {len} pixels, fingerprints have {expected}")]
    QueryTooShort { len: usize, expected: usize },
}

#[derive(Error, Debug)]
pub enum PixmapError {
    #[error("requested pixel ({x}, {y}) is outside dimensions {width}x{height}")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    #[error("{len} pixels cannot fill a {width}x{height} pixmap")]
    ShortBuffer { len: usize, width: u32, height: u32 },
    #[error(transparent)]
    Encode(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("failed to load query image {path:?}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("request for {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Crate-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error(transparent)]
    Pixmap(#[from] PixmapError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Download(#[from] DownloadError),
}

pub type Result<T> = std::result::Result<T, Error>;
