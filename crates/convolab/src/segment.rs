// Background subtraction and delineation of the changed regions.

use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::error::{Result, invalid};
use crate::plane::rgb_to_gray;

pub const OUTLINE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const OUTLINE_THICKNESS: u32 = 2;

/// Axis-aligned box in pixel coordinates; `width` and `height` count pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

#[derive(Debug, Clone)]
pub struct Delineation {
    /// 255 where foreground and background differ by more than the threshold.
    pub mask: GrayImage,
    /// The colour foreground with every region outlined.
    pub outlined: RgbImage,
    pub boxes: Vec<BoundingBox>,
}

/// Per-pixel `|a - b|`.
pub fn abs_diff(a: &GrayImage, b: &GrayImage) -> Result<GrayImage> {
    if a.dimensions() != b.dimensions() {
        return Err(invalid(format!(
            "images differ in size: {:?} vs {:?}",
            a.dimensions(),
            b.dimensions()
        )));
    }
    let (width, height) = a.dimensions();
    Ok(GrayImage::from_fn(width, height, |x, y| {
        Luma([a.get_pixel(x, y)[0].abs_diff(b.get_pixel(x, y)[0])])
    }))
}

/// 255 where the sample is strictly above `threshold`, 0 elsewhere.
pub fn threshold_binary(image: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        Luma([if image.get_pixel(x, y)[0] > threshold { 255 } else { 0 }])
    })
}

/// One box per 8-connected component of non-zero pixels, ordered by the
/// component's first pixel in raster order.
pub fn bounding_boxes(mask: &GrayImage) -> Vec<BoundingBox> {
    let (width, height) = mask.dimensions();
    let mut visited = vec![false; width as usize * height as usize];
    let mut boxes = Vec::new();
    let mut stack = Vec::new();

    let index = |x: u32, y: u32| y as usize * width as usize + x as usize;

    for y in 0..height {
        for x in 0..width {
            if visited[index(x, y)] || mask.get_pixel(x, y)[0] == 0 {
                continue;
            }

            let (mut min_x, mut min_y, mut max_x, mut max_y) = (x, y, x, y);
            visited[index(x, y)] = true;
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                min_x = min_x.min(cx);
                max_x = max_x.max(cx);
                min_y = min_y.min(cy);
                max_y = max_y.max(cy);

                for ny in cy.saturating_sub(1)..=(cy + 1).min(height - 1) {
                    for nx in cx.saturating_sub(1)..=(cx + 1).min(width - 1) {
                        let i = index(nx, ny);
                        if !visited[i] && mask.get_pixel(nx, ny)[0] != 0 {
                            visited[i] = true;
                            stack.push((nx, ny));
                        }
                    }
                }
            }

            boxes.push(BoundingBox {
                x: min_x,
                y: min_y,
                width: max_x - min_x + 1,
                height: max_y - min_y + 1,
            });
        }
    }

    boxes
}

/// Outline from `(x, y)` to `(x + width, y + height)` inclusive, `thickness`
/// pixels wide growing inwards, clipped to the image.
pub fn draw_rectangle(image: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || thickness == 0 {
        return;
    }

    let left = bbox.x as u64;
    let top = bbox.y as u64;
    let right = left + bbox.width as u64;
    let bottom = top + bbox.height as u64;
    let t = thickness as u64;

    let x_end = right.min(width as u64 - 1);
    let y_end = bottom.min(height as u64 - 1);

    for py in top..=y_end {
        for px in left..=x_end {
            let on_edge =
                px < left + t || px + t > right || py < top + t || py + t > bottom;
            if on_edge {
                image.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

/// Subtract `background` from `foreground`, binarise the difference at
/// `threshold`, and outline every changed region on a copy of `foreground`.
pub fn delineate(
    background: &RgbImage,
    foreground: &RgbImage,
    threshold: u8,
) -> Result<Delineation> {
    let difference = abs_diff(&rgb_to_gray(foreground), &rgb_to_gray(background))?;
    let mask = threshold_binary(&difference, threshold);
    let boxes = bounding_boxes(&mask);

    let mut outlined = foreground.clone();
    for bbox in &boxes {
        draw_rectangle(&mut outlined, bbox, OUTLINE_COLOR, OUTLINE_THICKNESS);
    }

    log::info!(
        "{} region(s) above threshold {threshold}, largest {} px",
        boxes.len(),
        boxes.iter().map(BoundingBox::area).max().unwrap_or(0)
    );

    Ok(Delineation {
        mask,
        outlined,
        boxes,
    })
}
