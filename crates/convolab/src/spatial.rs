// Direct (sliding-window) convolution.
//
// The kernel is flipped, so for any kernel the result agrees with the
// frequency-domain path; for the symmetric kernels used in practice this is
// the same as correlation.

use ndarray::parallel::prelude::*;
use ndarray::{ArrayViewMut1, Axis};
use rayon::ThreadPool;

use crate::error::Result;
use crate::kernel::{Kernel, check_operands};
use crate::plane::Plane;

/// What a kernel sees where it overhangs the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Border {
    /// Samples outside the image are 0.
    #[default]
    Zero,
    /// Samples outside the image repeat the nearest edge sample.
    Replicate,
}

impl Border {
    /// Map a possibly out-of-range coordinate to a source index, or `None`
    /// when the sample contributes nothing.
    #[inline]
    fn resolve(self, index: isize, len: usize) -> Option<usize> {
        match self {
            Border::Zero => (index >= 0 && (index as usize) < len).then_some(index as usize),
            Border::Replicate => Some(index.clamp(0, len as isize - 1) as usize),
        }
    }
}

/// Same-size convolution with a zero border.
pub fn convolve_spatial(image: &Plane, kernel: &Kernel) -> Result<Plane> {
    convolve_spatial_with(image, kernel, Border::Zero)
}

pub fn convolve_spatial_with(image: &Plane, kernel: &Kernel, border: Border) -> Result<Plane> {
    check_operands(image, kernel)?;

    let mut out = Plane::zeros(image.dim());
    for (row, out_row) in out.axis_iter_mut(Axis(0)).enumerate() {
        convolve_row(image, kernel, border, row, out_row);
    }
    Ok(out)
}

/// Like [`convolve_spatial_with`], with output rows computed as independent
/// jobs inside `thread_pool`.
pub fn convolve_spatial_in(
    image: &Plane,
    kernel: &Kernel,
    border: Border,
    thread_pool: &ThreadPool,
) -> Result<Plane> {
    check_operands(image, kernel)?;

    let mut out = Plane::zeros(image.dim());
    thread_pool.install(|| {
        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, out_row)| convolve_row(image, kernel, border, row, out_row));
    });
    Ok(out)
}

fn convolve_row(
    image: &Plane,
    kernel: &Kernel,
    border: Border,
    row: usize,
    mut out_row: ArrayViewMut1<f64>,
) {
    let (height, width) = image.dim();
    let weights = kernel.weights();
    let (kh, kw) = weights.dim();
    let (cy, cx) = kernel.center();

    for col in 0..width {
        let mut acc = 0f64;

        for a in 0..kh {
            let Some(src_row) = border.resolve(row as isize + cy as isize - a as isize, height)
            else {
                continue;
            };

            for b in 0..kw {
                let Some(src_col) =
                    border.resolve(col as isize + cx as isize - b as isize, width)
                else {
                    continue;
                };
                acc += weights[[a, b]] * image[[src_row, src_col]];
            }
        }

        out_row[col] = acc;
    }
}
