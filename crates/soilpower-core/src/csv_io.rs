//! Delimited-text persistence for `Table`.
//!
//! Every stage reads its input fully before processing and writes its output
//! fully afterwards; a bad cell aborts the read with the path, row and column.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{Result, SoilError};
use crate::table::{parse_cell, Table};

/// Options applied while reading a CSV file.
#[derive(Debug, Clone, Default)]
pub struct CsvOptions {
    /// Preamble lines to discard before the header row (NASA POWER exports carry 9).
    pub skip_lines: usize,
    /// Columns removed at read time. Use this for text columns that the numeric
    /// model cannot hold.
    pub drop_columns: Vec<String>,
}

impl CsvOptions {
    pub fn skip(mut self, lines: usize) -> Self {
        self.skip_lines = lines;
        self
    }

    pub fn drop<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_columns.extend(columns.into_iter().map(Into::into));
        self
    }
}

pub fn read_csv(path: &Path, opts: &CsvOptions) -> Result<Table> {
    let file = File::open(path).map_err(|e| SoilError::io(path, e))?;
    let table = read_csv_from(BufReader::new(file), path, opts)?;
    debug!("read {} rows x {} columns from {}", table.len(), table.width(), path.display());
    Ok(table)
}

/// Read from any buffered source. `path` is only used to label errors.
pub fn read_csv_from<R: BufRead>(mut reader: R, path: &Path, opts: &CsvOptions) -> Result<Table> {
    let mut discard = String::new();
    for _ in 0..opts.skip_lines {
        discard.clear();
        if reader.read_line(&mut discard).map_err(|e| SoilError::io(path, e))? == 0 {
            break;
        }
    }
    parse_records(reader, path, opts)
}

fn parse_records<R: Read>(reader: R, path: &Path, opts: &CsvOptions) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| SoilError::csv(path, e))?.clone();
    let keep: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !opts.drop_columns.iter().any(|d| d == h))
        .map(|(i, _)| i)
        .collect();
    let columns: Vec<String> = keep.iter().map(|&i| headers[i].to_string()).collect();

    let mut table = Table::new(columns);
    for (n, rec) in rdr.records().enumerate() {
        let rec = rec.map_err(|e| SoilError::csv(path, e))?;
        let mut row = Vec::with_capacity(keep.len());
        for &i in &keep {
            let raw = rec.get(i).unwrap_or("");
            let value = parse_cell(raw).map_err(|_| SoilError::Parse {
                path: path.to_path_buf(),
                row: n + 1,
                column: headers[i].to_string(),
                value: raw.to_string(),
            })?;
            row.push(value);
        }
        table.rows.push(row);
    }
    Ok(table)
}

/// Result of collecting a directory of CSV exports.
#[derive(Debug, Default)]
pub struct Collected {
    pub table: Table,
    pub files_read: Vec<PathBuf>,
    /// Files that failed to read or did not match the first file's header.
    pub files_skipped: Vec<PathBuf>,
    pub duplicates_dropped: usize,
}

/// Concatenate every `*.csv` in `dir` (by file name) and drop exact duplicate rows.
/// Files that fail to read are logged and skipped.
pub fn collect_dir(dir: &Path, opts: &CsvOptions) -> Result<Collected> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| SoilError::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")))
        .collect();
    paths.sort();

    let mut out = Collected::default();
    for path in paths {
        match read_csv(&path, opts).and_then(|t| out.table.concat(t)) {
            Ok(()) => out.files_read.push(path),
            Err(e) => {
                warn!("skipping {}: {e}", path.display());
                out.files_skipped.push(path);
            }
        }
    }

    let before = out.table.len();
    out.table = out.table.drop_duplicate_rows();
    out.duplicates_dropped = before - out.table.len();
    info!(
        "collected {} rows from {} files ({} skipped, {} duplicate rows dropped)",
        out.table.len(),
        out.files_read.len(),
        out.files_skipped.len(),
        out.duplicates_dropped
    );
    Ok(out)
}

/// Write `table` to `path`, creating parent directories. Missing cells are empty.
pub fn write_csv(path: &Path, table: &Table) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SoilError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| SoilError::io(path, e))?;
    write_csv_to(BufWriter::new(file), table).map_err(|e| SoilError::csv(path, e))?;
    debug!("wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

pub fn write_csv_to<W: Write>(writer: W, table: &Table) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&table.columns)?;
    let mut cells: Vec<String> = Vec::with_capacity(table.width());
    for row in &table.rows {
        cells.clear();
        cells.extend(row.iter().map(|v| v.map(|x| x.to_string()).unwrap_or_default()));
        wtr.write_record(&cells)?;
    }
    wtr.flush()?;
    Ok(())
}
