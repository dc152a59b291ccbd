// Numeric planes and the boundary between them and image files.
//
// Everything in the library works on in-memory buffers; decoding and
// encoding only happen through the helpers at the bottom of this file.

use std::path::Path;

use image::{GrayImage, Luma, RgbImage};
use ndarray::Array2;

use crate::error::{Error, Result};

/// Single-channel intensity samples indexed `[[row, col]]`.
pub type Plane = Array2<f64>;

/// Copy an 8-bit gray image into a floating-point plane.
pub fn from_gray(image: &GrayImage) -> Plane {
    let (width, height) = image.dimensions();
    Plane::from_shape_fn((height as usize, width as usize), |(row, col)| {
        image.get_pixel(col as u32, row as u32)[0] as f64
    })
}

/// Round and saturate a plane back to 8-bit samples. Non-finite samples
/// become 0.
pub fn to_gray(plane: &Plane) -> GrayImage {
    let (height, width) = plane.dim();
    GrayImage::from_fn(width as u32, height as u32, |x, y| {
        Luma([saturate(plane[[y as usize, x as usize]])])
    })
}

/// Round to the nearest integer and clamp to `[0, 255]`.
pub fn saturate(value: f64) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.round().clamp(0.0, 255.0) as u8
    }
}

fn pixel_to_grayscale(p: &[u8]) -> u8 {
    saturate(p[0] as f64 * 0.299 + p[1] as f64 * 0.587 + p[2] as f64 * 0.114)
}

/// Luma conversion of a colour image.
pub fn rgb_to_gray(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        Luma([pixel_to_grayscale(&image.get_pixel(x, y).0)])
    })
}

/// Largest absolute per-sample difference of two planes of equal shape.
pub fn max_abs_difference(a: &Plane, b: &Plane) -> Result<f64> {
    if a.dim() != b.dim() {
        return Err(crate::error::invalid(format!(
            "plane shapes differ: {:?} vs {:?}",
            a.dim(),
            b.dim()
        )));
    }
    Ok(a.iter()
        .zip(b.iter())
        .fold(0f64, |acc, (x, y)| acc.max((x - y).abs())))
}

// file boundary

pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    let image = image::open(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let rgb = image.to_rgb8();
    log::debug!("loaded {} {:?}", path.display(), rgb.dimensions());
    Ok(rgb)
}

pub fn load_gray(path: &Path) -> Result<GrayImage> {
    load_rgb(path).map(|rgb| rgb_to_gray(&rgb))
}

pub fn save_gray(image: &GrayImage, path: &Path) -> Result<()> {
    image.save(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("wrote {}", path.display());
    Ok(())
}

pub fn save_rgb(image: &RgbImage, path: &Path) -> Result<()> {
    image.save(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("wrote {}", path.display());
    Ok(())
}
