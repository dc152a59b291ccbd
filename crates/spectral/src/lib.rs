#[cfg(test)]
mod tests;

// Radix-2 complex FFT on interleaved (re, im) buffers, in one and two
// dimensions, plus the helpers the convolution code needs around it.

use rayon::{ThreadPool, prelude::*};
use std::f64::consts::PI;

/// Errors reported by the transform routines.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FftError {
    /// The number of complex entries along an axis is not a power of two.
    #[error("transform length {len} is not a power of two")]
    NonPowerOfTwo { len: usize },

    /// An interleaved buffer with an odd number of values.
    #[error("interleaved complex buffer has odd length {len}")]
    OddLength { len: usize },

    /// A buffer does not hold `2 * width * height` values.
    #[error("buffer holds {actual} values but ({width}, {height}) complex entries need {expected}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, FftError>;

/// Smallest length the radix-2 transform accepts that is at least `len`.
///
/// Zero maps to one so callers never end up with an empty axis.
pub fn transform_size(len: usize) -> usize {
    len.max(1).next_power_of_two()
}

fn check_length(complex_len: usize) -> Result<()> {
    if complex_len.is_power_of_two() {
        Ok(())
    } else {
        Err(FftError::NonPowerOfTwo { len: complex_len })
    }
}

fn check_buffer(data: &[f64], dimensions: (usize, usize)) -> Result<()> {
    let (width, height) = dimensions;
    let expected = 2 * width * height;
    if data.len() != expected {
        return Err(FftError::DimensionMismatch {
            width,
            height,
            expected,
            actual: data.len(),
        });
    }
    check_length(width)?;
    check_length(height)
}

/// In-place FFT of a sequence of complex values, following the
/// Brenner/Numerical Recipes formulation:
///
/// ```text
/// Press, et al., _Numerical Recipes_, Third Edition.
/// Cambridge University Press, 2007.
/// ```
///
/// __Arguments:__
///
/// + `data` - N complex values, real parts in even entries and imaginary
///   parts in odd entries; N must be a power of two.
///
/// + `inverse` - compute the inverse transform; the 1/N normalizing factor
///   is applied on the inverse only.
///
pub fn fft(data: &mut [f64], inverse: bool) -> Result<()> {
    if data.len() % 2 != 0 {
        return Err(FftError::OddLength { len: data.len() });
    }
    let n = data.len() / 2;
    check_length(n)?;

    let scale = if inverse { 1f64 / (n as f64) } else { 1f64 };
    bit_reverse(data, scale);

    let sign = if inverse { 1f64 } else { -1f64 };
    butterflies(data, sign);

    Ok(())
}

/// Reorders the complex entries so that entry `k` moves to the index whose
/// binary digits are those of `k` reversed, scaling each entry once.
fn bit_reverse(data: &mut [f64], scale: f64) {
    let n = data.len() / 2;
    let nn = data.len();

    // 1-based indices into the interleaved buffer, as in the reference
    let mut j: usize = 1;
    for i in (1..nn).step_by(2) {
        if j > i {
            data.swap(j - 1, i - 1);
            data.swap(j, i);
        }

        let mut m = n;
        while m >= 2 && j > m {
            j -= m;
            m >>= 1;
        }
        j += m;

        data[i - 1] *= scale;
        data[i] *= scale;
    }
}

/// Danielson-Lanczos passes over bit-reversed data. Twiddle factors come
/// from a trigonometric recurrence rather than a sin/cos per entry.
fn butterflies(data: &mut [f64], sign: f64) {
    let nn = data.len();
    let mut mmax: usize = 2;

    while nn > mmax {
        let istep = mmax << 1;

        let theta = sign * 2f64 * PI / (mmax as f64);
        let half_sin = (theta / 2f64).sin();
        let wpr = -2f64 * half_sin * half_sin;
        let wpi = theta.sin();

        let (mut wr, mut wi) = (1f64, 0f64);

        for m in (1..mmax).step_by(2) {
            for i in (m..=nn).step_by(istep) {
                let j = i + mmax;
                let tr = wr * data[j - 1] - wi * data[j];
                let ti = wr * data[j] + wi * data[j - 1];

                data[j - 1] = data[i - 1] - tr;
                data[j] = data[i] - ti;
                data[i - 1] += tr;
                data[i] += ti;
            }

            let prev = wr;
            wr += wr * wpr - wi * wpi;
            wi += wi * wpr + prev * wpi;
        }

        mmax = istep;
    }
}

// 2D transforms

/// Row-wise FFT, transpose, row-wise FFT again, transpose back.
///
/// __Arguments:__
///
/// + `data` - flattened row-major 2D array of (real, imaginary) pairs
///
/// + `dimensions` - (width, height) counted in _complex_ entries; both must
///   be powers of two
///
/// + `inverse` - compute the inverse transform; the 1/MN normalizing factor
///   is applied on the inverse only.
///
pub fn fft_2d(data: &mut [f64], dimensions: (usize, usize), inverse: bool) -> Result<()> {
    check_buffer(data, dimensions)?;
    let (width, height) = dimensions;

    for row in data.chunks_exact_mut(width * 2) {
        fft(row, inverse)?;
    }

    let mut transposed = vec![0f64; data.len()];
    complex_transpose(data, dimensions, &mut transposed);

    // rows of the transposed matrix are the original columns
    for column in transposed.chunks_exact_mut(height * 2) {
        fft(column, inverse)?;
    }

    complex_transpose(&transposed, (height, width), data);
    Ok(())
}

/// Same as [`fft_2d`], but the row transforms of both passes run as rayon
/// jobs inside `thread_pool`.
///
/// `working_buffer` must have the length of `data`; it holds the transposed
/// matrix between the passes. The transposes themselves stay serial.
pub fn fft_2d_para(
    data: &mut [f64],
    working_buffer: &mut [f64],
    dimensions: (usize, usize),
    inverse: bool,
    thread_pool: &ThreadPool,
) -> Result<()> {
    check_buffer(data, dimensions)?;
    check_buffer(working_buffer, dimensions)?;
    let (width, height) = dimensions;

    thread_pool.install(|| {
        data.par_chunks_exact_mut(width * 2)
            .try_for_each(|row| fft(row, inverse))?;

        complex_transpose(data, dimensions, working_buffer);

        working_buffer
            .par_chunks_exact_mut(height * 2)
            .try_for_each(|column| fft(column, inverse))?;

        complex_transpose(working_buffer, (height, width), data);
        Ok(())
    })
}

/// Transpose a row-major matrix of interleaved complex entries.
/// `in_dimensions` is (width, height) of the input.
fn complex_transpose(data_in: &[f64], in_dimensions: (usize, usize), data_out: &mut [f64]) {
    let (width, height) = in_dimensions;

    for i in 0..height {
        for j in 0..width {
            let src = 2 * (i * width + j);
            let dst = 2 * (j * height + i);

            data_out[dst] = data_in[src];
            data_out[dst + 1] = data_in[src + 1];
        }
    }
}

// Helpers for working with spectra

/// Elementwise complex product `lhs[k] *= rhs[k]` of two interleaved buffers.
pub fn multiply_assign(lhs: &mut [f64], rhs: &[f64]) -> Result<()> {
    if lhs.len() % 2 != 0 {
        return Err(FftError::OddLength { len: lhs.len() });
    }
    if lhs.len() != rhs.len() {
        return Err(FftError::DimensionMismatch {
            width: rhs.len() / 2,
            height: 1,
            expected: rhs.len(),
            actual: lhs.len(),
        });
    }

    for (a, b) in lhs.chunks_exact_mut(2).zip(rhs.chunks_exact(2)) {
        let re = a[0] * b[0] - a[1] * b[1];
        let im = a[0] * b[1] + a[1] * b[0];
        a[0] = re;
        a[1] = im;
    }

    Ok(())
}

/// Largest absolute imaginary part in an interleaved buffer. After an inverse
/// transform of a real signal's spectrum this measures round-off.
pub fn max_imaginary(data: &[f64]) -> f64 {
    data.iter()
        .skip(1)
        .step_by(2)
        .fold(0f64, |acc, v| acc.max(v.abs()))
}
