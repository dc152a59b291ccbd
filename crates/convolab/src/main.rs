// CLI for the convolab crate: one subcommand per exercise.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use convolab::{
    BenchmarkConfig, Error, Kernel, Result, compare, enhance, plane, quantize, run_benchmark,
    segment,
};

// setup command line args

#[derive(Parser)]
#[command(about, long_about = None)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub command: Command,
    /// Directory for the images written by the subcommands.
    #[clap(long, default_value = "out")]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert to gray and collapse the gray levels into equal bands.
    Cluster(ClusterArgs),
    /// Outline what changed between a background and a foreground image.
    Subtract(SubtractArgs),
    /// Unsharp-mask style high-boost filter.
    HighBoost(HighBoostArgs),
    /// Laplacian high-pass filter.
    HighPass(InputArgs),
    /// Pixel-difference report between two images.
    Compare(CompareArgs),
    /// Time spatial against frequency-domain convolution.
    Bench(BenchArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    #[clap(long, required = true)]
    input: PathBuf,
}

#[derive(Debug, Args)]
pub struct ClusterArgs {
    #[clap(long, required = true)]
    input: PathBuf,
    #[clap(long, default_value_t = 4)]
    groups: u32,
}

#[derive(Debug, Args)]
pub struct SubtractArgs {
    #[clap(long, required = true)]
    background: PathBuf,
    #[clap(long, required = true)]
    foreground: PathBuf,
    #[clap(long, default_value_t = 30)]
    threshold: u8,
}

#[derive(Debug, Args)]
pub struct HighBoostArgs {
    #[clap(long, required = true)]
    input: PathBuf,
    #[clap(long, default_value_t = enhance::DEFAULT_AMPLIFICATION)]
    amplification: f64,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    #[clap(required = true)]
    first: PathBuf,
    #[clap(required = true)]
    second: PathBuf,
}

#[derive(Debug, Args)]
pub struct BenchArgs {
    #[clap(long, required = true)]
    input: PathBuf,
    /// Side of the square averaging kernel; must be odd.
    #[clap(long, default_value_t = 5)]
    kernel_size: usize,
    #[clap(long, default_value_t = 1)]
    trials: usize,
    /// Run both convolvers on a rayon thread pool.
    #[clap(long, action)]
    parallel: bool,
    /// Pool size for --parallel; defaults to the number of CPUs.
    #[clap(long)]
    threads: Option<usize>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<()> {
    let out = args.output_dir.as_path();

    match args.command {
        Command::Cluster(args) => {
            let gray = plane::load_gray(&args.input)?;
            let clustered = quantize::quantize_gray(&gray, args.groups)?;
            log::info!(
                "{} gray levels -> {}",
                quantize::distinct_levels(&gray),
                quantize::distinct_levels(&clustered)
            );
            plane::save_gray(&clustered, &output_path(out, "01_clustered.png")?)?;
        }
        Command::Subtract(args) => {
            let background = plane::load_rgb(&args.background)?;
            let foreground = plane::load_rgb(&args.foreground)?;
            let result = segment::delineate(&background, &foreground, args.threshold)?;
            for b in &result.boxes {
                log::info!("region at ({}, {}) size {}x{}", b.x, b.y, b.width, b.height);
            }
            plane::save_gray(&result.mask, &output_path(out, "02_mask.png")?)?;
            plane::save_rgb(&result.outlined, &output_path(out, "02_outlined.png")?)?;
        }
        Command::HighBoost(args) => {
            let gray = plane::load_gray(&args.input)?;
            let boosted = enhance::high_boost(&gray, args.amplification)?;
            plane::save_gray(&boosted, &output_path(out, "03_high_boost.png")?)?;
        }
        Command::HighPass(args) => {
            let gray = plane::load_gray(&args.input)?;
            let edges = enhance::high_pass(&gray)?;
            plane::save_gray(&edges, &output_path(out, "03_high_pass.png")?)?;
        }
        Command::Compare(args) => {
            let first = plane::load_rgb(&args.first)?;
            let second = plane::load_rgb(&args.second)?;
            println!("{}", compare::compare_images(&first, &second));
        }
        Command::Bench(args) => {
            let image = plane::from_gray(&plane::load_gray(&args.input)?);
            let kernel = Kernel::averaging(args.kernel_size, args.kernel_size);
            let config = BenchmarkConfig {
                trials: args.trials,
                threads: args
                    .parallel
                    .then(|| args.threads.unwrap_or_else(num_cpus::get)),
            };
            let report = run_benchmark(&image, &kernel, &config)?;
            println!("{report}");
        }
    }

    Ok(())
}

/// `dir/name`, creating `dir` if needed.
fn output_path(dir: &Path, name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| Error::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(dir.join(name))
}
