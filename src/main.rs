#[macro_use]
extern crate log;

use clap::Parser;
use ndarray_rand::rand::SeedableRng;
use rand_isaac::Isaac64Rng;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use em_clustering::{
    read_points, write_compact, write_formatted, Cluster, EmClustering, EmError, Result,
};

#[derive(Parser, Debug)]
#[command(name = "em-clustering")]
#[command(about = "Estimate a Gaussian mixture over whitespace-delimited data points")]
#[command(version)]
struct Args {
    /// Input file: one data point per line, attributes separated by spaces
    #[arg(short, long)]
    input: PathBuf,

    /// Destination of the human-readable report
    #[arg(short, long)]
    output: PathBuf,

    /// Optional one-line-per-cluster report for downstream plotting tools
    #[arg(long)]
    compact: Option<PathBuf>,

    /// Number of mixture components
    #[arg(short = 'k', long, default_value_t = 2)]
    clusters: usize,

    /// Number of EM iterations, always run in full (no convergence check)
    #[arg(short = 'n', long, default_value_t = 500)]
    iterations: usize,

    /// Seed for the random cluster initialization
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Regularization added to covariance diagonals to keep them invertible
    #[arg(long, default_value_t = 1e-6)]
    reg_covariance: f64,

    /// Verbose logging
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() {
    let args = Args::parse();
    let level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    pretty_env_logger::formatted_timed_builder()
        .filter_level(level)
        .init();

    debug!("params: {:#?}", args);

    let points = match read_points(&args.input, args.clusters) {
        Ok(points) => points,
        Err(EmError::Io(e)) => {
            error!(
                "can't handle input file {}: {}. Please make sure that the input file exists.",
                args.input.display(),
                e
            );
            std::process::exit(1);
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!("{} points read from {}", points.len(), args.input.display());

    let rng = Isaac64Rng::seed_from_u64(args.seed);
    let model = EmClustering::params_with_rng(args.clusters, rng)
        .n_iterations(args.iterations)
        .reg_covariance(args.reg_covariance)
        .check()
        .and_then(|params| params.fit(points));
    let model = match model {
        Ok(model) => model,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!(
        "{} clusters estimated over {} iterations",
        args.clusters, args.iterations
    );

    if let Err(e) = write_reports(&args, model.clusters()) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn write_reports(args: &Args, clusters: &[Cluster]) -> Result<()> {
    let formatted = File::create(&args.output)?;
    write_formatted(BufWriter::new(formatted), clusters)?;
    info!("report written to {}", args.output.display());

    if let Some(path) = &args.compact {
        let compact = File::create(path)?;
        write_compact(BufWriter::new(compact), clusters)?;
        info!("compact report written to {}", path.display());
    }
    Ok(())
}
