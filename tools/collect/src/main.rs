//! Merge a directory of NASA POWER CSV exports into one table.
//! Each export carries a preamble before its header; exact duplicate rows
//! across files are dropped.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use soilpower_core::{collect_dir, write_csv, CsvOptions};

#[derive(Parser, Debug)]
#[command(name = "collect", about = "Concatenate CSV exports from a directory")]
struct Args {
    /// Directory holding the per-point CSV exports.
    #[arg(short, long)]
    input_dir: PathBuf,

    /// Combined output CSV.
    #[arg(short, long, default_value = "data/nasa_power.csv")]
    output: PathBuf,

    /// Preamble lines to skip in every file.
    #[arg(long, default_value_t = 9)]
    skip_lines: usize,

    /// Text columns to discard (repeatable). NASA POWER exports carry a text
    /// PARAMETER column, which is dropped unless this flag is given.
    #[arg(long = "drop", default_value = "PARAMETER")]
    drop_columns: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let args = Args::parse();
    let opts = CsvOptions::default().skip(args.skip_lines).drop(args.drop_columns);

    let collected = collect_dir(&args.input_dir, &opts)
        .with_context(|| format!("listing {}", args.input_dir.display()))?;
    if collected.files_read.is_empty() {
        bail!("no readable CSV files in {}", args.input_dir.display());
    }
    write_csv(&args.output, &collected.table)
        .with_context(|| format!("writing {}", args.output.display()))?;

    eprintln!(
        "{} rows from {} files -> {}",
        collected.table.len(),
        collected.files_read.len(),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_column_dropped_by_default() {
        let args = Args::try_parse_from(["collect", "-i", "exports"]).unwrap();
        assert_eq!(args.skip_lines, 9);
        assert_eq!(args.drop_columns, vec!["PARAMETER".to_string()]);
    }

    #[test]
    fn explicit_drop_replaces_default() {
        let args = Args::try_parse_from(["collect", "-i", "exports", "--drop", "SRC", "--drop", "NOTE"]).unwrap();
        assert_eq!(args.drop_columns, vec!["SRC".to_string(), "NOTE".to_string()]);
    }

    #[test]
    fn defaults_read_a_power_export() {
        let dir = std::env::temp_dir().join(format!("soilpower-collect-bin-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let preamble = "-BEGIN HEADER-\n".repeat(9);
        std::fs::write(dir.join("p1.csv"), format!("{preamble}PARAMETER,YEAR,LAT,LON,JAN\nT2M,2001,10,20,1.5\n")).unwrap();

        let args = Args::try_parse_from(["collect", "-i", "unused"]).unwrap();
        let opts = CsvOptions::default().skip(args.skip_lines).drop(args.drop_columns);
        let got = collect_dir(&dir, &opts).unwrap();
        assert_eq!(got.files_read.len(), 1);
        assert_eq!(got.table.columns, vec!["YEAR", "LAT", "LON", "JAN"]);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
