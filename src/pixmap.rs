//! RGB pixel grid written out as binary P6 pixmaps.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};

use crate::error::PixmapError;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Grey level as an RGB triple.
pub fn grey(intensity: u8) -> Rgb<u8> {
    Rgb([intensity, intensity, intensity])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    image: RgbImage,
}

impl Pixmap {
    /// A `width` x `height` pixmap filled with white.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, WHITE),
        }
    }

    /// Builds a greyscale pixmap from row-major intensities.
    pub fn from_grey(width: u32, height: u32, pixels: &[u8]) -> Result<Self, PixmapError> {
        if (pixels.len() as u64) < width as u64 * height as u64 {
            return Err(PixmapError::ShortBuffer {
                len: pixels.len(),
                width,
                height,
            });
        }
        let mut pixmap = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let intensity = pixels[(x + y * width) as usize];
                pixmap.set_pixel(x, y, grey(intensity))?;
            }
        }
        Ok(pixmap)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    fn validate(&self, x: u32, y: u32) -> Result<(), PixmapError> {
        if x >= self.width() || y >= self.height() {
            return Err(PixmapError::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(())
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Rgb<u8>, PixmapError> {
        self.validate(x, y)?;
        Ok(*self.image.get_pixel(x, y))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, colour: Rgb<u8>) -> Result<(), PixmapError> {
        self.validate(x, y)?;
        self.image.put_pixel(x, y, colour);
        Ok(())
    }

    /// Encodes as binary P6 into `writer`.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), PixmapError> {
        let encoder =
            PnmEncoder::new(writer).with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary));
        encoder.write_image(
            self.image.as_raw(),
            self.width(),
            self.height(),
            ExtendedColorType::Rgb8,
        )?;
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PixmapError> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_to(&mut out)?;
        out.flush()?;
        Ok(())
    }
}
