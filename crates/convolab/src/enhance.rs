// Edge enhancement: high-boost and high-pass filtering of gray images.

use image::{GrayImage, Luma};

use crate::error::{Result, invalid};
use crate::kernel::Kernel;
use crate::plane::{from_gray, saturate, to_gray};
use crate::spatial::{Border, convolve_spatial_with};

/// Side of the Gaussian used to build the unsharp mask.
pub const BLUR_SIZE: usize = 5;

pub const DEFAULT_AMPLIFICATION: f64 = 1.5;

/// `amplification * image + mask`, where the mask is the image minus a 5×5
/// Gaussian blur of itself (negative differences clipped to 0).
///
/// Every intermediate image is 8-bit, rounded and saturated, as if each step
/// had been stored.
pub fn high_boost(image: &GrayImage, amplification: f64) -> Result<GrayImage> {
    if !amplification.is_finite() {
        return Err(invalid(format!(
            "amplification must be finite, got {amplification}"
        )));
    }

    let blurred = to_gray(&convolve_spatial_with(
        &from_gray(image),
        &Kernel::gaussian(BLUR_SIZE, 0.0),
        Border::Replicate,
    )?);

    let (width, height) = image.dimensions();
    Ok(GrayImage::from_fn(width, height, |x, y| {
        let v = image.get_pixel(x, y)[0];
        let mask = v.saturating_sub(blurred.get_pixel(x, y)[0]);
        Luma([saturate(amplification * v as f64 + mask as f64)])
    }))
}

/// Laplacian high-pass filter; negative responses clip to 0.
pub fn high_pass(image: &GrayImage) -> Result<GrayImage> {
    let response = convolve_spatial_with(&from_gray(image), &Kernel::laplacian(), Border::Replicate)?;
    Ok(to_gray(&response))
}
