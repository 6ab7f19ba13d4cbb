//! Turning an arbitrary image file into a classification query.

use std::path::Path;

use image::{DynamicImage, GenericImageView, Pixel};
use log::info;

use crate::error::QueryError;

/// Side length of MNIST digits.
pub const SIDE: u32 = 28;

/// A 28x28 greyscale query in MNIST polarity (light digit on dark ground).
#[derive(Debug, Clone, PartialEq)]
pub struct QueryImage {
    pub pixels: Vec<f64>,
    pub inverted: bool,
}

/// Opens `path`, resizes it to 28x28 and converts it to greyscale.
pub fn load_query_image<P: AsRef<Path>>(path: P) -> Result<QueryImage, QueryError> {
    let path = path.as_ref();
    info!("Loading {}...", path.display());
    let img = image::open(path).map_err(|source| QueryError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(query_from_image(&img))
}

/// Samples `img` down to 28x28 greyscale. Images brighter than mid-grey on
/// average are taken to be dark ink on light paper and inverted.
pub fn query_from_image(img: &DynamicImage) -> QueryImage {
    let img = img
        .resize_exact(SIDE, SIDE, image::imageops::FilterType::Nearest)
        .grayscale();

    let mut pixels = Vec::with_capacity((SIDE * SIDE) as usize);
    for y in 0..SIDE {
        for x in 0..SIDE {
            let p = img.get_pixel(x, y);
            pixels.push(p.channels()[0] as f64);
        }
    }

    let avg = pixels.iter().sum::<f64>() / pixels.len() as f64;
    let inverted = avg > 128.0;
    if inverted {
        info!("Average pixel value {avg:.1}, inverting to match MNIST");
        for p in &mut pixels {
            *p = 255.0 - *p;
        }
    }
    QueryImage { pixels, inverted }
}
