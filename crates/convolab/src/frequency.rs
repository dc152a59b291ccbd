// Convolution through the Convolution Theorem.
//
// Image and kernel are zero-padded to a common power-of-two size that is at
// least `image + kernel - 1` along each axis, so the product of their spectra
// is the spectrum of the *linear* convolution (no wrap-around). The kernel
// sits in the top-left corner of its padded buffer without any circular
// shift; that offsets the linear result by the kernel centre, and the final
// crop starts at that centre so the output lines up with the spatial path
// under a zero border.

use std::time::Instant;

use ndarray::ArrayView2;
use rayon::ThreadPool;

use crate::error::Result;
use crate::kernel::{Kernel, check_operands};
use crate::plane::Plane;

/// Frequency-domain convolution, single-threaded.
pub fn convolve_frequency(image: &Plane, kernel: &Kernel) -> Result<Plane> {
    convolve(image, kernel, None)
}

/// Frequency-domain convolution with the row transforms run in `thread_pool`.
pub fn convolve_frequency_in(
    image: &Plane,
    kernel: &Kernel,
    thread_pool: &ThreadPool,
) -> Result<Plane> {
    convolve(image, kernel, Some(thread_pool))
}

/// Padded transform dimensions, (width, height) in complex entries.
pub fn padded_dimensions(image_dim: (usize, usize), kernel_dim: (usize, usize)) -> (usize, usize) {
    let (height, width) = image_dim;
    let (kh, kw) = kernel_dim;
    (
        spectral::transform_size(width + kw.saturating_sub(1)),
        spectral::transform_size(height + kh.saturating_sub(1)),
    )
}

fn convolve(image: &Plane, kernel: &Kernel, thread_pool: Option<&ThreadPool>) -> Result<Plane> {
    check_operands(image, kernel)?;

    let dims = padded_dimensions(image.dim(), kernel.weights().dim());
    log::debug!(
        "frequency convolution: image {:?}, kernel {:?}, padded (w, h) {:?}",
        image.dim(),
        kernel.weights().dim(),
        dims
    );

    let mut clock = StageClock::start();

    let mut spectrum = pad(image.view(), dims);
    let mut kernel_spectrum = pad(kernel.weights().view(), dims);
    clock.lap("pad");

    transform(&mut spectrum, dims, false, thread_pool)?;
    transform(&mut kernel_spectrum, dims, false, thread_pool)?;
    clock.lap("forward");

    spectral::multiply_assign(&mut spectrum, &kernel_spectrum)?;
    drop(kernel_spectrum);
    clock.lap("multiply");

    transform(&mut spectrum, dims, true, thread_pool)?;
    log::trace!(
        "largest imaginary residue after inverse: {:e}",
        spectral::max_imaginary(&spectrum)
    );
    clock.lap("inverse");

    let out = crop(&spectrum, dims, kernel.center(), image.dim());
    clock.lap("crop");

    Ok(out)
}

/// Zero-filled interleaved complex buffer with `src` in its top-left corner.
fn pad(src: ArrayView2<f64>, dims: (usize, usize)) -> Vec<f64> {
    let (width, height) = dims;
    let mut buffer = vec![0f64; 2 * width * height];

    for ((row, col), value) in src.indexed_iter() {
        buffer[2 * (row * width + col)] = *value;
    }

    buffer
}

fn transform(
    data: &mut [f64],
    dims: (usize, usize),
    inverse: bool,
    thread_pool: Option<&ThreadPool>,
) -> Result<()> {
    match thread_pool {
        Some(pool) => {
            let mut working_buffer = vec![0f64; data.len()];
            spectral::fft_2d_para(data, &mut working_buffer, dims, inverse, pool)?;
        }
        None => spectral::fft_2d(data, dims, inverse)?,
    }
    Ok(())
}

/// Real parts of the `shape` window starting at `origin` (row, col).
fn crop(
    data: &[f64],
    dims: (usize, usize),
    origin: (usize, usize),
    shape: (usize, usize),
) -> Plane {
    let width = dims.0;
    let (r0, c0) = origin;
    Plane::from_shape_fn(shape, |(row, col)| data[2 * ((row + r0) * width + col + c0)])
}

struct StageClock {
    start: Instant,
}

impl StageClock {
    fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    fn lap(&mut self, stage: &str) {
        if cfg!(feature = "timing") {
            log::info!("  {stage:<8} {:>9.3} ms", self.start.elapsed().as_secs_f64() * 1e3);
        }
        self.start = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_abs_diff_eq;

    #[test]
    fn padding_covers_linear_support() {
        assert_eq!(padded_dimensions((4, 4), (3, 3)), (8, 8));
        assert_eq!(padded_dimensions((512, 512), (25, 25)), (1024, 1024));
        assert_eq!(padded_dimensions((10, 3), (1, 1)), (4, 16));
        assert_eq!(padded_dimensions((1, 1), (1, 1)), (1, 1));
    }

    #[test]
    fn pad_places_samples_top_left() {
        let src = Plane::from_shape_fn((2, 3), |(r, c)| (10 * r + c + 1) as f64);
        let buffer = pad(src.view(), (4, 2));

        assert_eq!(buffer.len(), 16);
        assert_eq!(&buffer[0..6], &[1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
        assert_eq!(&buffer[6..8], &[0.0, 0.0]);
        assert_eq!(&buffer[8..14], &[11.0, 0.0, 12.0, 0.0, 13.0, 0.0]);
    }

    #[test]
    fn crop_reads_real_parts_at_offset() {
        let dims = (4, 2);
        let data: Vec<f64> = (0..16).map(|v| v as f64).collect();
        let out = crop(&data, dims, (1, 1), (1, 2));
        // row 1, cols 1 and 2 -> interleaved indices 10 and 12
        assert_eq!(out, ndarray::array![[10.0, 12.0]]);
    }

    #[test]
    fn single_pixel_kernel_scales() {
        let image = Plane::from_shape_fn((3, 5), |(r, c)| (r * 5 + c) as f64);
        let kernel = Kernel::from_rows(&[[2.0]]);
        let out = convolve_frequency(&image, &kernel).unwrap();
        for (a, b) in out.iter().zip(image.iter()) {
            assert_abs_diff_eq!(*a, 2.0 * b, epsilon = 1e-9);
        }
    }

    #[test]
    fn no_wrap_around_at_edges() {
        // a bright right column must not leak into the left column
        let mut image = Plane::zeros((4, 4));
        for r in 0..4 {
            image[[r, 3]] = 100.0;
        }
        let out = convolve_frequency(&image, &Kernel::averaging(3, 3)).unwrap();
        for r in 0..4 {
            assert_abs_diff_eq!(out[[r, 0]], 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn parallel_matches_serial() {
        let image = Plane::from_shape_fn((13, 9), |(r, c)| ((r * 31 + c * 17) % 23) as f64);
        let kernel = Kernel::gaussian(5, 1.0);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(2)
            .build()
            .unwrap();

        let serial = convolve_frequency(&image, &kernel).unwrap();
        let parallel = convolve_frequency_in(&image, &kernel, &pool).unwrap();
        for (a, b) in serial.iter().zip(parallel.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn rejects_empty_operands() {
        assert!(matches!(
            convolve_frequency(&Plane::zeros((3, 0)), &Kernel::identity(1)),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            convolve_frequency(&Plane::zeros((3, 3)), &Kernel::averaging(3, 0)),
            Err(Error::InvalidInput(_))
        ));
    }
}
