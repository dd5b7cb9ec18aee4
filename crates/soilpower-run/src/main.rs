//! Runs the whole cleaning pipeline over one combined soil/climate CSV:
//! deduplication, column pruning, spatial-cluster imputation and the
//! validation report. Every intermediate table lands in the output directory.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use soilpower_core::{run_pipeline, CsvOptions, FallbackMode, PipelineParams};

#[derive(Parser, Debug)]
#[command(name = "soilpower-run", about = "Deduplicate, prune and impute a combined soil/climate table")]
struct Args {
    /// Combined CSV (output of `sjoin`).
    #[arg(short, long)]
    input: PathBuf,

    /// Directory receiving deduplicated.csv, pruned.csv, imputed.csv and the report.
    #[arg(short, long, default_value = "data/processed")]
    out_dir: PathBuf,

    /// JSON params file; keys left out take their defaults.
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// DBSCAN radius in degrees (overrides the params file).
    #[arg(long)]
    eps: Option<f64>,

    /// DBSCAN minimum neighbourhood size (overrides the params file).
    #[arg(long)]
    min_samples: Option<usize>,

    /// Fill each nearest-neighbour gap from the original values only.
    #[arg(long)]
    snapshot: bool,

    /// Preamble lines to skip before the header row.
    #[arg(long, default_value_t = 0)]
    skip_lines: usize,

    /// Columns to discard at read time (repeatable).
    #[arg(long = "drop")]
    drop_columns: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let args = Args::parse();

    let mut params = match &args.params {
        Some(path) => PipelineParams::from_json_file(path)
            .with_context(|| format!("loading params from {}", path.display()))?,
        None => PipelineParams::default(),
    };
    if let Some(eps) = args.eps {
        params.eps = eps;
    }
    if let Some(min_samples) = args.min_samples {
        params.min_samples = min_samples;
    }
    if args.snapshot {
        params.fallback = FallbackMode::Snapshot;
    }

    let opts = CsvOptions::default().skip(args.skip_lines).drop(args.drop_columns);
    info!("running pipeline on {}", args.input.display());
    let summary = run_pipeline(&args.input, &args.out_dir, &opts, &params)
        .with_context(|| format!("pipeline failed on {}", args.input.display()))?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
