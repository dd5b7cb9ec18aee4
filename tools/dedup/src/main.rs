//! Collapse rows sharing (LAT, LON, YEAR) into merged records where their
//! values agree; disagreeing rows pass through separately.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use soilpower_core::{deduplicate, read_csv, write_csv, CsvOptions};

#[derive(Parser, Debug)]
#[command(name = "dedup", about = "Deduplicate a table on its (LAT, LON, YEAR) identity key")]
struct Args {
    #[arg(short, long)]
    input: PathBuf,

    #[arg(short, long, default_value = "data/deduplicated.csv")]
    output: PathBuf,

    /// Text columns to discard at read time (repeatable).
    #[arg(long = "drop")]
    drop_columns: Vec<String>,

    /// Print the summary as JSON on stdout.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let args = Args::parse();
    let opts = CsvOptions::default().drop(args.drop_columns);

    let table = read_csv(&args.input, &opts).with_context(|| format!("reading {}", args.input.display()))?;
    let (out, summary) =
        deduplicate(&table).with_context(|| format!("deduplicating {}", args.input.display()))?;
    write_csv(&args.output, &out).with_context(|| format!("writing {}", args.output.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        eprintln!(
            "{} -> {} rows ({} groups) -> {}",
            summary.rows_in,
            summary.rows_out,
            summary.groups,
            args.output.display()
        );
    }
    Ok(())
}
