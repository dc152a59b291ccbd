// Spatial vs. frequency convolution timing.

use std::fmt;
use std::time::{Duration, Instant};

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{Result, invalid};
use crate::frequency::{convolve_frequency, convolve_frequency_in};
use crate::kernel::{Kernel, check_operands};
use crate::plane::{Plane, max_abs_difference};
use crate::spatial::{Border, convolve_spatial, convolve_spatial_in};

pub const SPATIAL_LABEL: &str = "spatial convolution";
pub const FREQUENCY_LABEL: &str = "frequency convolution";

/// Wall-clock duration of one convolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingSample {
    pub label: &'static str,
    pub elapsed: Duration,
}

impl fmt::Display for TimingSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<22} {:>10.6} s", self.label, self.elapsed.as_secs_f64())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkConfig {
    /// Runs per convolver; the fastest one is reported.
    pub trials: usize,
    /// Run both convolvers in a rayon pool of this many threads.
    pub threads: Option<usize>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            trials: 1,
            threads: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    pub spatial: TimingSample,
    pub frequency: TimingSample,
    /// Largest per-pixel disagreement between the two outputs.
    pub max_abs_difference: f64,
}

impl BenchmarkReport {
    /// Spatial time over frequency time; above 1 the frequency path won.
    pub fn speedup(&self) -> f64 {
        let frequency = self.frequency.elapsed.as_secs_f64();
        if frequency == 0.0 {
            f64::INFINITY
        } else {
            self.spatial.elapsed.as_secs_f64() / frequency
        }
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.spatial)?;
        writeln!(f, "{}", self.frequency)?;
        writeln!(f, "{:<22} {:>10.2}x", "speed-up", self.speedup())?;
        write!(f, "{:<22} {:>10.3e}", "max |difference|", self.max_abs_difference)
    }
}

/// Time the spatial convolver, then the frequency convolver, on the same
/// inputs; one run each, serial. Returns (spatial, frequency).
pub fn compare_convolution_performance(
    image: &Plane,
    kernel: &Kernel,
) -> Result<(TimingSample, TimingSample)> {
    let report = run_benchmark(image, kernel, &BenchmarkConfig::default())?;
    Ok((report.spatial, report.frequency))
}

pub fn run_benchmark(
    image: &Plane,
    kernel: &Kernel,
    config: &BenchmarkConfig,
) -> Result<BenchmarkReport> {
    if config.trials == 0 {
        return Err(invalid("benchmark needs at least one trial"));
    }
    check_operands(image, kernel)?;

    let pool = config.threads.map(build_pool).transpose()?;

    log::info!(
        "benchmarking {}x{} image, {}x{} kernel, {} trial(s), {}",
        image.nrows(),
        image.ncols(),
        kernel.rows(),
        kernel.cols(),
        config.trials,
        match config.threads {
            Some(n) => format!("{n} thread(s)"),
            None => "serial".to_string(),
        }
    );

    let (spatial, spatial_out) = best_of(SPATIAL_LABEL, config.trials, || match &pool {
        Some(pool) => convolve_spatial_in(image, kernel, Border::Zero, pool),
        None => convolve_spatial(image, kernel),
    })?;
    log::info!("{spatial}");

    let (frequency, frequency_out) = best_of(FREQUENCY_LABEL, config.trials, || match &pool {
        Some(pool) => convolve_frequency_in(image, kernel, pool),
        None => convolve_frequency(image, kernel),
    })?;
    log::info!("{frequency}");

    let max_abs_difference = max_abs_difference(&spatial_out, &frequency_out)?;
    log::debug!("largest disagreement between outputs: {max_abs_difference:e}");

    Ok(BenchmarkReport {
        spatial,
        frequency,
        max_abs_difference,
    })
}

fn build_pool(threads: usize) -> Result<ThreadPool> {
    if threads == 0 {
        return Err(invalid("thread count must be positive"));
    }
    Ok(ThreadPoolBuilder::new().num_threads(threads).build()?)
}

/// Run `op` `trials` times, timing only the call, and keep the fastest run
/// together with the last output.
fn best_of<F>(label: &'static str, trials: usize, mut op: F) -> Result<(TimingSample, Plane)>
where
    F: FnMut() -> Result<Plane>,
{
    let mut best: Option<Duration> = None;
    let mut output = None;

    for trial in 0..trials {
        let start = Instant::now();
        let out = op()?;
        let elapsed = start.elapsed();

        log::debug!("{label} trial {trial}: {:.6} s", elapsed.as_secs_f64());
        best = Some(best.map_or(elapsed, |b| b.min(elapsed)));
        output = Some(out);
    }

    match (best, output) {
        (Some(elapsed), Some(out)) => Ok((TimingSample { label, elapsed }, out)),
        _ => Err(invalid("benchmark needs at least one trial")),
    }
}
