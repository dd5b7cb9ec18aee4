//! Fill missing feature values by spatial clustering, falling back to the
//! nearest row holding a value, and write the validation report alongside.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use soilpower_core::pipeline::validation_path;
use soilpower_core::{read_csv, spatial_cluster_imputation, write_csv, CsvOptions, FallbackMode, PipelineParams};

#[derive(Parser, Debug)]
#[command(name = "impute", about = "Spatial-cluster imputation with nearest-neighbour fallback")]
struct Args {
    #[arg(short, long)]
    input: PathBuf,

    #[arg(short, long, default_value = "data/imputed.csv")]
    output: PathBuf,

    /// JSON params file; keys left out take their defaults.
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// DBSCAN radius in degrees.
    #[arg(long)]
    eps: Option<f64>,

    /// DBSCAN minimum neighbourhood size.
    #[arg(long)]
    min_samples: Option<usize>,

    /// Fill each nearest-neighbour gap from the original values only.
    #[arg(long)]
    snapshot: bool,
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

    let table = read_csv(&args.input, &CsvOptions::default())
        .with_context(|| format!("reading {}", args.input.display()))?;
    let (filled, summary) = spatial_cluster_imputation(&table, &params.impute_params())
        .with_context(|| format!("imputing {}", args.input.display()))?;
    write_csv(&args.output, &filled).with_context(|| format!("writing {}", args.output.display()))?;

    let report_path = validation_path(&args.output);
    fs::write(&report_path, summary.report.to_string())
        .with_context(|| format!("writing {}", report_path.display()))?;

    print!("{}", summary.report);
    eprintln!(
        "{} clusters, {} noise rows; report -> {}",
        summary.n_clusters,
        summary.noise_rows,
        report_path.display()
    );
    Ok(())
}
