//! Remove unwanted columns before imputation: name prefixes, exact names,
//! and optionally columns that hold no value at all.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use soilpower_core::prune::{drop_columns, drop_empty_columns};
use soilpower_core::{read_csv, write_csv, CsvOptions, PipelineParams};

#[derive(Parser, Debug)]
#[command(name = "prune", about = "Drop columns by prefix, by name, or when empty")]
struct Args {
    #[arg(short, long)]
    input: PathBuf,

    #[arg(short, long, default_value = "data/pruned.csv")]
    output: PathBuf,

    /// Column-name prefix to drop (repeatable). Defaults to SOIL and PROP.
    #[arg(long = "prefix")]
    prefixes: Vec<String>,

    /// Exact column name to drop (repeatable). Defaults to PARAMETER.
    #[arg(long = "column")]
    columns: Vec<String>,

    /// Also drop columns that are missing in every row.
    #[arg(long)]
    drop_empty: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let args = Args::parse();
    let defaults = PipelineParams::default();
    let prefixes = if args.prefixes.is_empty() { defaults.prune_prefixes } else { args.prefixes };
    let columns = if args.columns.is_empty() { defaults.prune_columns } else { args.columns };

    let table = read_csv(&args.input, &CsvOptions::default())
        .with_context(|| format!("reading {}", args.input.display()))?;
    let mut out = drop_columns(&table, &prefixes, &columns);
    if args.drop_empty {
        out = drop_empty_columns(&out);
    }
    write_csv(&args.output, &out).with_context(|| format!("writing {}", args.output.display()))?;

    eprintln!("{} -> {} columns -> {}", table.width(), out.width(), args.output.display());
    Ok(())
}
