// unit tests

use super::*;
use approx::assert_abs_diff_eq;
use std::f64::consts::PI;

const TEST_ARRAY: [f64; 12] = [
    1.0, 6.0, 2.0, 5.0, 3.0, 4.0, //
    4.0, 3.0, 5.0, 2.0, 6.0, 1.0, //
];

const TEST_ARRAY_WIDTH: usize = 3;
const TEST_ARRAY_HEIGHT: usize = 2;

const FFT_TEST_ARRAY: [f64; 16] = [
    1.0, 6.0, 2.0, 5.0, 3.0, 4.0, 0.0, 0.0, //
    4.0, 3.0, 5.0, 2.0, 6.0, 1.0, 0.0, 0.0, //
];

const FFT_TEST_ARRAY_WIDTH: usize = 4;
const FFT_TEST_ARRAY_HEIGHT: usize = 2;

#[test]
fn complex_transpose_moves_pairs() {
    let mut transposed = vec![0f64; TEST_ARRAY.len()];
    complex_transpose(
        &TEST_ARRAY,
        (TEST_ARRAY_WIDTH, TEST_ARRAY_HEIGHT),
        &mut transposed,
    );

    let expected = [
        1.0, 6.0, 4.0, 3.0, //
        2.0, 5.0, 5.0, 2.0, //
        3.0, 4.0, 6.0, 1.0, //
    ];
    assert_eq!(transposed, expected);

    let mut back = vec![0f64; TEST_ARRAY.len()];
    complex_transpose(
        &transposed,
        (TEST_ARRAY_HEIGHT, TEST_ARRAY_WIDTH),
        &mut back,
    );
    assert_eq!(back, TEST_ARRAY);
}

#[test]
fn fft_of_constant_is_impulse() {
    let mut data = [
        1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0,
    ];
    fft(&mut data, false).unwrap();

    assert_abs_diff_eq!(data[0], 8.0, epsilon = 1e-12);
    for v in &data[1..] {
        assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-12);
    }
}

#[test]
fn fft_of_harmonic_lands_in_one_bin() {
    // k-th harmonic of length N transforms to N at bin k
    let n = 8;
    let k = 3;
    let mut data = vec![0f64; 2 * n];
    for t in 0..n {
        let phase = 2.0 * PI * (k as f64) * (t as f64) / (n as f64);
        data[2 * t] = phase.cos();
        data[2 * t + 1] = phase.sin();
    }

    fft(&mut data, false).unwrap();

    for bin in 0..n {
        let expected = if bin == k { n as f64 } else { 0.0 };
        assert_abs_diff_eq!(data[2 * bin], expected, epsilon = 1e-9);
        assert_abs_diff_eq!(data[2 * bin + 1], 0.0, epsilon = 1e-9);
    }
}

#[test]
fn inverse_undoes_forward() {
    let original: Vec<f64> = (0..32).map(|v| (v as f64 * 0.37).sin() * 10.0).collect();
    let mut data = original.clone();

    fft(&mut data, false).unwrap();
    fft(&mut data, true).unwrap();

    for (a, b) in data.iter().zip(&original) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
    }
}

#[test]
fn single_entry_is_left_alone() {
    let mut data = [3.0, -2.0];
    fft(&mut data, false).unwrap();
    assert_eq!(data, [3.0, -2.0]);
}

#[test]
fn rejects_non_power_of_two() {
    let mut data = vec![0f64; 2 * 6];
    assert_eq!(
        fft(&mut data, false),
        Err(FftError::NonPowerOfTwo { len: 6 })
    );

    let mut odd = vec![0f64; 5];
    assert_eq!(fft(&mut odd, false), Err(FftError::OddLength { len: 5 }));
}

#[test]
fn fft_2d_round_trip_and_dc() {
    let mut data = Vec::from(FFT_TEST_ARRAY);
    let dims = (FFT_TEST_ARRAY_WIDTH, FFT_TEST_ARRAY_HEIGHT);

    fft_2d(&mut data, dims, false).unwrap();

    // the DC term is the sum of all entries
    let re_sum: f64 = FFT_TEST_ARRAY.iter().step_by(2).sum();
    let im_sum: f64 = FFT_TEST_ARRAY.iter().skip(1).step_by(2).sum();
    assert_abs_diff_eq!(data[0], re_sum, epsilon = 1e-9);
    assert_abs_diff_eq!(data[1], im_sum, epsilon = 1e-9);

    fft_2d(&mut data, dims, true).unwrap();
    for (a, b) in data.iter().zip(FFT_TEST_ARRAY.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
    }
}

#[test]
fn fft_2d_checks_dimensions() {
    let mut data = vec![0f64; 2 * 4 * 2];
    assert!(matches!(
        fft_2d(&mut data, (4, 4), false),
        Err(FftError::DimensionMismatch { expected: 32, actual: 16, .. })
    ));

    let mut data = vec![0f64; 2 * 3 * 2];
    assert_eq!(
        fft_2d(&mut data, (3, 2), false),
        Err(FftError::NonPowerOfTwo { len: 3 })
    );
}

#[test]
fn parallel_matches_serial() {
    let dims = (16, 8);
    let source: Vec<f64> = (0..2 * dims.0 * dims.1)
        .map(|v| ((v * 7919) % 255) as f64)
        .collect();

    let mut serial = source.clone();
    fft_2d(&mut serial, dims, false).unwrap();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(2)
        .build()
        .unwrap();
    let mut parallel = source.clone();
    let mut working = vec![0f64; parallel.len()];
    fft_2d_para(&mut parallel, &mut working, dims, false, &pool).unwrap();

    for (a, b) in serial.iter().zip(&parallel) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
    }
}

#[test]
fn transform_size_rounds_up() {
    assert_eq!(transform_size(0), 1);
    assert_eq!(transform_size(1), 1);
    assert_eq!(transform_size(5), 8);
    assert_eq!(transform_size(512), 512);
    assert_eq!(transform_size(536), 1024);
}

#[test]
fn multiply_assign_is_complex_product() {
    // (1 + 2i)(3 - i) = 5 + 5i, (0 + 1i)(0 + 1i) = -1
    let mut lhs = [1.0, 2.0, 0.0, 1.0];
    let rhs = [3.0, -1.0, 0.0, 1.0];
    multiply_assign(&mut lhs, &rhs).unwrap();
    assert_eq!(lhs, [5.0, 5.0, -1.0, 0.0]);

    let mut short = [1.0, 0.0];
    assert!(multiply_assign(&mut short, &rhs).is_err());
}

#[test]
fn max_imaginary_reads_odd_entries() {
    let data = [100.0, -0.5, 3.0, 0.25, -7.0, 0.0];
    assert_eq!(max_imaginary(&data), 0.5);
}
