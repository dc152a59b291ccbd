// Pixel-difference report between two images.

use std::fmt;

use image::RgbImage;

/// Box around the differing pixels; `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifferenceBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonReport {
    /// The images cannot be compared pixel by pixel.
    SizeMismatch {
        first: (u32, u32),
        second: (u32, u32),
    },
    Compared {
        total_pixels: u64,
        /// Pixels where any channel differs.
        differing_pixels: u64,
        /// Share of differing pixels in percent, rounded to 4 decimals.
        percent_different: f64,
        difference_box: Option<DifferenceBox>,
    },
}

impl ComparisonReport {
    pub fn identical(&self) -> bool {
        matches!(
            self,
            ComparisonReport::Compared {
                differing_pixels: 0,
                ..
            }
        )
    }
}

pub fn compare_images(first: &RgbImage, second: &RgbImage) -> ComparisonReport {
    if first.dimensions() != second.dimensions() {
        return ComparisonReport::SizeMismatch {
            first: first.dimensions(),
            second: second.dimensions(),
        };
    }

    let (width, height) = first.dimensions();
    let total_pixels = width as u64 * height as u64;
    let mut differing_pixels = 0u64;
    let mut difference_box: Option<DifferenceBox> = None;

    for (x, y, a) in first.enumerate_pixels() {
        if *a == *second.get_pixel(x, y) {
            continue;
        }
        differing_pixels += 1;

        let b = difference_box.get_or_insert(DifferenceBox {
            left: x,
            top: y,
            right: x + 1,
            bottom: y + 1,
        });
        b.left = b.left.min(x);
        b.top = b.top.min(y);
        b.right = b.right.max(x + 1);
        b.bottom = b.bottom.max(y + 1);
    }

    let percent_different = if total_pixels == 0 {
        0.0
    } else {
        let percent = differing_pixels as f64 / total_pixels as f64 * 100.0;
        (percent * 1e4).round() / 1e4
    };

    ComparisonReport::Compared {
        total_pixels,
        differing_pixels,
        percent_different,
        difference_box,
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonReport::SizeMismatch { first, second } => write!(
                f,
                "images differ in size: {}x{} vs {}x{}",
                first.0, first.1, second.0, second.1
            ),
            ComparisonReport::Compared {
                total_pixels,
                differing_pixels,
                percent_different,
                difference_box,
            } => {
                if *differing_pixels == 0 {
                    writeln!(f, "identical images")?;
                } else {
                    writeln!(f, "differences detected")?;
                }
                writeln!(f, "total pixels:       {total_pixels}")?;
                writeln!(f, "differing pixels:   {differing_pixels}")?;
                writeln!(f, "percent different:  {percent_different}")?;
                match difference_box {
                    Some(b) => write!(
                        f,
                        "difference box:     ({}, {}, {}, {})",
                        b.left, b.top, b.right, b.bottom
                    ),
                    None => write!(f, "difference box:     none"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn identical_images() {
        let a = RgbImage::from_pixel(4, 3, Rgb([1, 2, 3]));
        let report = compare_images(&a, &a.clone());

        assert!(report.identical());
        assert_eq!(
            report,
            ComparisonReport::Compared {
                total_pixels: 12,
                differing_pixels: 0,
                percent_different: 0.0,
                difference_box: None,
            }
        );
        assert!(report.to_string().starts_with("identical images"));
    }

    #[test]
    fn counts_pixels_with_any_channel_changed() {
        let a = RgbImage::from_pixel(3, 3, Rgb([0, 0, 0]));
        let mut b = a.clone();
        b.put_pixel(1, 0, Rgb([0, 0, 1]));
        b.put_pixel(2, 2, Rgb([9, 0, 0]));

        let report = compare_images(&a, &b);
        assert!(!report.identical());
        assert_eq!(
            report,
            ComparisonReport::Compared {
                total_pixels: 9,
                differing_pixels: 2,
                percent_different: 22.2222,
                difference_box: Some(DifferenceBox {
                    left: 1,
                    top: 0,
                    right: 3,
                    bottom: 3,
                }),
            }
        );
    }

    #[test]
    fn size_mismatch() {
        let report = compare_images(&RgbImage::new(2, 2), &RgbImage::new(2, 3));
        assert_eq!(
            report,
            ComparisonReport::SizeMismatch {
                first: (2, 2),
                second: (2, 3),
            }
        );
        assert!(!report.identical());
        assert!(report.to_string().contains("2x2 vs 2x3"));
    }
}
