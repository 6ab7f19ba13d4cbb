//! Loading of the MNIST IDX image and label files.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::Crc;
use log::info;

use crate::bytes::read_u32_be;
use crate::error::{Error, FormatError, IdxKind, Result};

pub const LABEL_MAGIC: u32 = 0x0000_0801;
pub const IMAGE_MAGIC: u32 = 0x0000_0803;

const LABEL_HEADER: usize = 8;
const IMAGE_HEADER: usize = 16;

/// Number of digit classes.
pub const CLASSES: usize = 10;

/// The decoded contents of an image file and its label file.
///
/// `pixels` holds every image back to back, `row_count * col_count` bytes each,
/// in the same order as `labels`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDataset {
    image_count: u32,
    row_count: u32,
    col_count: u32,
    labels: Vec<u8>,
    pixels: Vec<u8>,
}

impl RawDataset {
    /// Reads both files fully and decodes them. Paths ending in `.gz` are
    /// decompressed on the fly.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(images_path: P, labels_path: Q) -> Result<Self> {
        let labels = read_file(labels_path.as_ref())?;
        let images = read_file(images_path.as_ref())?;
        Self::from_bytes(&images, &labels)
    }

    /// Decodes in-memory copies of the image and label files.
    pub fn from_bytes(images: &[u8], labels: &[u8]) -> Result<Self> {
        let labels = parse_labels(labels)?;
        let header = parse_image_header(images)?;

        if labels.len() as u32 != header.count {
            return Err(FormatError::CountMismatch {
                labels: labels.len() as u32,
                images: header.count,
            }
            .into());
        }

        let payload = (header.count as u64)
            .checked_mul(header.rows as u64)
            .and_then(|n| n.checked_mul(header.cols as u64))
            .ok_or(FormatError::TooLarge {
                kind: IdxKind::Images,
                count: header.count,
                rows: header.rows,
                cols: header.cols,
            })?;
        let available = images.len() - IMAGE_HEADER;
        if payload > available as u64 {
            return Err(FormatError::Truncated {
                kind: IdxKind::Images,
                declared: payload,
                available,
            }
            .into());
        }
        let pixels = images[IMAGE_HEADER..IMAGE_HEADER + payload as usize].to_vec();

        Ok(Self {
            image_count: header.count,
            row_count: header.rows,
            col_count: header.cols,
            labels,
            pixels,
        })
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

    pub fn pixels_per_image(&self) -> usize {
        self.row_count as usize * self.col_count as usize
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Label of image `index`. Panics when out of range.
    pub fn label(&self, index: usize) -> u8 {
        self.labels[index]
    }

    /// Row-major pixels of image `index`. Panics when out of range.
    pub fn image(&self, index: usize) -> &[u8] {
        let n = self.pixels_per_image();
        &self.pixels[index * n..(index + 1) * n]
    }

    /// CRC32 over the label bytes followed by the pixel bytes.
    pub fn checksum(&self) -> u32 {
        let mut crc = Crc::new();
        crc.update(&self.labels);
        crc.update(&self.pixels);
        crc.sum()
    }

    /// Iterates `(label, pixels)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[u8])> + '_ {
        let n = self.pixels_per_image().max(1);
        self.labels.iter().copied().zip(self.pixels.chunks(n))
    }
}

struct ImageHeader {
    count: u32,
    rows: u32,
    cols: u32,
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let read = |path: &Path| -> std::io::Result<Vec<u8>> {
        let mut f = File::open(path)?;
        let mut buf = vec![];
        if path.extension().is_some_and(|ext| ext == "gz") {
            GzDecoder::new(f).read_to_end(&mut buf)?;
        } else {
            f.read_to_end(&mut buf)?;
        }
        Ok(buf)
    };
    read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_labels(buf: &[u8]) -> std::result::Result<Vec<u8>, FormatError> {
    if buf.len() < LABEL_HEADER {
        return Err(FormatError::HeaderTooShort {
            kind: IdxKind::Labels,
            len: buf.len(),
            header: LABEL_HEADER,
        });
    }
    let magic = read_u32_be(buf, 0);
    info!("Label magic is {magic}");
    if magic != LABEL_MAGIC {
        return Err(FormatError::BadMagic {
            kind: IdxKind::Labels,
            expected: LABEL_MAGIC,
            found: magic,
        });
    }
    let count = read_u32_be(buf, 4);
    info!("Total labels = {count}");

    let available = buf.len() - LABEL_HEADER;
    if count as u64 > available as u64 {
        return Err(FormatError::Truncated {
            kind: IdxKind::Labels,
            declared: count as u64,
            available,
        });
    }
    let labels = buf[LABEL_HEADER..LABEL_HEADER + count as usize].to_vec();
    if let Some(index) = labels.iter().position(|&l| l as usize >= CLASSES) {
        return Err(FormatError::LabelOutOfRange {
            index,
            label: labels[index],
        });
    }
    Ok(labels)
}

fn parse_image_header(buf: &[u8]) -> std::result::Result<ImageHeader, FormatError> {
    if buf.len() < IMAGE_HEADER {
        return Err(FormatError::HeaderTooShort {
            kind: IdxKind::Images,
            len: buf.len(),
            header: IMAGE_HEADER,
        });
    }
    let magic = read_u32_be(buf, 0);
    info!("Image magic is {magic}");
    if magic != IMAGE_MAGIC {
        return Err(FormatError::BadMagic {
            kind: IdxKind::Images,
            expected: IMAGE_MAGIC,
            found: magic,
        });
    }
    let header = ImageHeader {
        count: read_u32_be(buf, 4),
        rows: read_u32_be(buf, 8),
        cols: read_u32_be(buf, 12),
    };
    info!(
        "Total images = {}, rows = {}, cols = {}",
        header.count, header.rows, header.cols
    );
    Ok(header)
}

/// Builds an IDX label file in memory.
pub fn encode_labels(labels: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(LABEL_HEADER + labels.len());
    crate::bytes::write_u32_be(&mut out, LABEL_MAGIC);
    crate::bytes::write_u32_be(&mut out, labels.len() as u32);
    out.extend_from_slice(labels);
    out
}

/// Builds an IDX image file in memory from images of `rows * cols` bytes each.
pub fn encode_images(rows: u32, cols: u32, images: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    crate::bytes::write_u32_be(&mut out, IMAGE_MAGIC);
    crate::bytes::write_u32_be(&mut out, images.len() as u32);
    crate::bytes::write_u32_be(&mut out, rows);
    crate::bytes::write_u32_be(&mut out, cols);
    for image in images {
        out.extend_from_slice(image);
    }
    out
}
