//! 傅里叶环相关 (FRC) 分辨率分析的命令行入口.
//!
//! ```text
//! frc-batch -i rec_odd.dmp:rec_even.dmp,sart_odd.tif:sart_even.tif -l FBP:SART -r 2 -w
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use frc_berry::consts::{DEFAULT_POLY_DEGREE, DEFAULT_RESIDUAL_TOLERANCE, DEFAULT_RING_WIDTH};
use frc_berry::criterion::Criterion;
use log::LevelFilter;
use simple_logger::SimpleLogger;

mod result;
mod runner;

/// Fourier ring correlation resolution analysis.
#[derive(Parser, Debug)]
#[command(name = "frc-batch", version)]
pub struct Cli {
    /// Pairs of input images, e.g. `a_odd.dmp:a_even.dmp,b_odd.dmp:b_even.dmp`.
    #[arg(short = 'i', long = "images")]
    pub images: String,

    /// Output folder for log files and curve tables.
    /// Defaults to `$FRC_OUTPUT_DIR`, then `$HOME/frc`.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Thickness of the rings.
    #[arg(short = 'r', long = "ring-width", default_value_t = DEFAULT_RING_WIDTH)]
    pub ring_width: f64,

    /// Restrict the analysis to the square inscribed in the resolution circle.
    #[arg(short = 'n', long = "resol-square")]
    pub resol_square: bool,

    /// Multiply the images with a separable Hann window.
    #[arg(short = 'w', long = "hanning")]
    pub hanning: bool,

    /// One label per pair of images, e.g. `EST:GRIDREC:IFBPTV`.
    #[arg(short = 'l', long = "labels")]
    pub labels: Option<String>,

    /// Degree of the polynomial fitted to the FRC curve.
    #[arg(short = 'd', long = "degree", default_value_t = DEFAULT_POLY_DEGREE)]
    pub degree: u32,

    /// Physical size of one pixel; resolutions are also reported in this unit.
    #[arg(long)]
    pub pixel_size: Option<f64>,

    /// Criteria to evaluate.
    #[arg(
        long,
        value_delimiter = ',',
        default_values = ["one-bit", "half-bit", "half-height"]
    )]
    pub criteria: Vec<Criterion>,

    /// Largest accepted |fitted - criterion| at a crossing.
    #[arg(long, default_value_t = DEFAULT_RESIDUAL_TOLERANCE)]
    pub residual_tolerance: f64,

    /// Worker threads. Defaults to the number of available cores.
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Increase log verbosity (`-v` debug, `-vv` trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    SimpleLogger::new().with_level(level).env().init()?;

    let jobs = cli.jobs.unwrap_or_else(utils::cpus).max(1);
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build_global()?;

    println!("Fourier ring correlation analysis ({jobs} threads)");
    let outcome = runner::run(&cli)?;
    outcome.analyze();
    Ok(())
}
