// Gray-level clustering.

use std::collections::BTreeSet;

use image::{GrayImage, Luma};

use crate::error::{Result, invalid};

/// Collapse the 256 gray levels into `groups` bands of equal width; every
/// sample is replaced by the lowest level of its band.
///
/// `groups` must be in `1..=256`. With 4 groups the band width is 64 and the
/// output only holds 0, 64, 128 and 192.
pub fn quantize_gray(image: &GrayImage, groups: u32) -> Result<GrayImage> {
    if !(1..=256).contains(&groups) {
        return Err(invalid(format!(
            "group count must be between 1 and 256, got {groups}"
        )));
    }
    let factor = 256 / groups;

    let (width, height) = image.dimensions();
    Ok(GrayImage::from_fn(width, height, |x, y| {
        let v = image.get_pixel(x, y)[0] as u32;
        Luma([((v / factor) * factor) as u8])
    }))
}

/// Number of distinct gray levels present.
pub fn distinct_levels(image: &GrayImage) -> usize {
    image.pixels().map(|p| p[0]).collect::<BTreeSet<_>>().len()
}
