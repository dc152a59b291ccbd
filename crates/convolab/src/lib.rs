// top-level library module
//
// Spatial and frequency-domain convolution of gray images, the timing
// comparison between the two, and a few classic point/neighbourhood
// operations (gray clustering, background subtraction, edge enhancement,
// image comparison) built on the same buffers.

pub mod benchmark;
pub mod compare;
pub mod enhance;
pub mod error;
pub mod frequency;
pub mod kernel;
pub mod plane;
pub mod quantize;
pub mod segment;
pub mod spatial;

pub use benchmark::{
    BenchmarkConfig, BenchmarkReport, TimingSample, compare_convolution_performance,
    run_benchmark,
};
pub use error::{Error, Result};
pub use frequency::{convolve_frequency, convolve_frequency_in};
pub use kernel::Kernel;
pub use plane::Plane;
pub use spatial::{Border, convolve_spatial, convolve_spatial_in, convolve_spatial_with};
