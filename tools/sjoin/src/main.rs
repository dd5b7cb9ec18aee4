//! Attach soil-region properties to climate points whose coordinates fall
//! strictly inside a region's bounding box.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use soilpower_core::coords::BBOX_COLUMNS;
use soilpower_core::prune::drop_rows_only_in;
use soilpower_core::{read_csv, spatial_join, write_csv, CsvOptions};

#[derive(Parser, Debug)]
#[command(name = "sjoin", about = "Spatially join climate points onto soil regions")]
struct Args {
    /// Point table with LAT and LON columns.
    #[arg(short, long)]
    points: PathBuf,

    /// Region table with BOTTOM_LEFT_* and UPPER_RIGHT_* columns.
    #[arg(short, long)]
    regions: PathBuf,

    #[arg(short, long, default_value = "data/joined.csv")]
    output: PathBuf,

    /// Text columns to discard from either input (repeatable).
    #[arg(long = "drop")]
    drop_columns: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let args = Args::parse();
    let opts = CsvOptions::default().drop(args.drop_columns);

    let points = read_csv(&args.points, &opts).with_context(|| format!("reading {}", args.points.display()))?;
    let regions = read_csv(&args.regions, &opts).with_context(|| format!("reading {}", args.regions.display()))?;
    // Regions that carry nothing but their box contribute no properties.
    let regions = drop_rows_only_in(&regions, &BBOX_COLUMNS);

    let joined = spatial_join(&points, &regions)?;
    write_csv(&args.output, &joined).with_context(|| format!("writing {}", args.output.display()))?;

    eprintln!("{} joined rows -> {}", joined.len(), args.output.display());
    Ok(())
}
