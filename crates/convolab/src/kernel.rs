// Convolution kernels.

use ndarray::Array2;

use crate::error::{Result, invalid};
use crate::plane::Plane;

/// Immutable 2D filter weights, indexed `[[row, col]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Array2<f64>,
}

impl Kernel {
    pub fn from_array(weights: Array2<f64>) -> Self {
        Self { weights }
    }

    pub fn from_rows<const C: usize>(rows: &[[f64; C]]) -> Self {
        Self {
            weights: Array2::from_shape_fn((rows.len(), C), |(r, c)| rows[r][c]),
        }
    }

    /// Uniform averaging kernel, every weight `1 / (rows * cols)`.
    pub fn averaging(rows: usize, cols: usize) -> Self {
        let weight = if rows * cols == 0 {
            0.0
        } else {
            1.0 / (rows * cols) as f64
        };
        Self {
            weights: Array2::from_elem((rows, cols), weight),
        }
    }

    /// `size × size` kernel with a single 1 at the centre.
    pub fn identity(size: usize) -> Self {
        let mut weights = Array2::zeros((size, size));
        if size > 0 {
            weights[[size / 2, size / 2]] = 1.0;
        }
        Self { weights }
    }

    /// Normalised `size × size` Gaussian.
    ///
    /// A non-positive `sigma` is derived from the size as
    /// `0.3 * ((size - 1) * 0.5 - 1) + 0.8`; for sizes 1, 3, 5 and 7 the
    /// fixed binomial-like taps used by common imaging libraries are taken
    /// instead, so a 5×5 blur with no sigma is `[1 4 6 4 1] / 16` per axis.
    pub fn gaussian(size: usize, sigma: f64) -> Self {
        let taps = gaussian_1d(size, sigma);
        Self {
            weights: Array2::from_shape_fn((size, size), |(r, c)| taps[r] * taps[c]),
        }
    }

    /// 3×3 high-pass (Laplacian) kernel.
    pub fn laplacian() -> Self {
        Self::from_rows(&[
            [-1.0, -1.0, -1.0], //
            [-1.0, 8.0, -1.0],  //
            [-1.0, -1.0, -1.0], //
        ])
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn rows(&self) -> usize {
        self.weights.nrows()
    }

    pub fn cols(&self) -> usize {
        self.weights.ncols()
    }

    /// (row, col) of the anchor sample.
    pub fn center(&self) -> (usize, usize) {
        (self.rows() / 2, self.cols() / 2)
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.weights.sum()
    }
}

fn gaussian_1d(size: usize, sigma: f64) -> Vec<f64> {
    if sigma <= 0.0 {
        match size {
            1 => return vec![1.0],
            3 => return vec![0.25, 0.5, 0.25],
            5 => return vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
            7 => {
                return vec![
                    0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
                ];
            }
            _ => {}
        }
    }

    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8
    };

    let mean = (size as f64 - 1.0) / 2.0;
    let mut taps: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - mean;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let norm: f64 = taps.iter().sum();
    if norm > 0.0 {
        taps.iter_mut().for_each(|t| *t /= norm);
    }
    taps
}

/// Checks shared by both convolvers: a non-empty image and a non-empty,
/// odd-sized kernel that fits inside it.
pub(crate) fn check_operands(image: &Plane, kernel: &Kernel) -> Result<()> {
    let (height, width) = image.dim();
    if height == 0 || width == 0 {
        return Err(invalid(format!("image is empty ({height}x{width})")));
    }

    let (kh, kw) = (kernel.rows(), kernel.cols());
    if kh == 0 || kw == 0 {
        return Err(invalid(format!("kernel is empty ({kh}x{kw})")));
    }
    if kh % 2 == 0 || kw % 2 == 0 {
        return Err(invalid(format!(
            "kernel dimensions must be odd to have a centre, got {kh}x{kw}"
        )));
    }
    if kh > height || kw > width {
        return Err(invalid(format!(
            "kernel ({kh}x{kw}) is larger than the image ({height}x{width})"
        )));
    }
    if image.iter().any(|v| !v.is_finite()) {
        return Err(invalid("image contains non-finite samples"));
    }
    Ok(())
}
