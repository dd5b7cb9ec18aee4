use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SoilError};

/// A single cell. `None` is a missing value; the pipeline never stores NaN.
pub type Value = Option<f64>;

/// One observation, aligned with the owning table's column list.
pub type Record = Vec<Value>;

/// Column-named numeric table, row-major.
/// Every stage takes a `&Table` and produces a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Table {
    /// Create an empty table with the given header.
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn with_rows(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like `column_index`, but a missing column is a schema error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| SoilError::MissingColumn { column: name.to_string() })
    }

    pub fn missing_in_column(&self, col: usize) -> usize {
        self.rows.iter().filter(|r| r[col].is_none()).count()
    }

    pub fn total_missing(&self) -> usize {
        self.rows.iter().map(|r| r.iter().filter(|v| v.is_none()).count()).sum()
    }

    /// Append `other`'s rows. Both tables must share the same header.
    pub fn concat(&mut self, other: Table) -> Result<()> {
        if self.columns.is_empty() && self.rows.is_empty() {
            *self = other;
            return Ok(());
        }
        if self.columns != other.columns {
            return Err(SoilError::Schema(format!(
                "cannot concatenate tables with headers {:?} and {:?}",
                self.columns, other.columns
            )));
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Keep the first occurrence of every exactly-equal row.
    pub fn drop_duplicate_rows(&self) -> Table {
        let mut seen: HashSet<Vec<Option<u64>>> = HashSet::with_capacity(self.rows.len());
        let rows = self
            .rows
            .iter()
            .filter(|r| seen.insert(r.iter().map(|v| v.map(canonical_bits)).collect()))
            .cloned()
            .collect();
        Table::with_rows(self.columns.clone(), rows)
    }

    /// Project onto the given column indices, in the given order.
    pub fn select(&self, cols: &[usize]) -> Table {
        let columns = cols.iter().map(|&c| self.columns[c].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|r| cols.iter().map(|&c| r[c]).collect())
            .collect();
        Table::with_rows(columns, rows)
    }
}

/// Bit pattern used for hashing and equality of cell values; folds -0.0 into 0.0.
#[inline]
pub(crate) fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }
}

/// Parse a raw cell. Empty strings and NaN spellings are missing;
/// `Err(())` means the text is not a finite number (`inf`, `1e400` included).
pub(crate) fn parse_cell(raw: &str) -> std::result::Result<Value, ()> {
    let t = raw.trim();
    if t.is_empty() || t.eq_ignore_ascii_case("nan") || t == "NA" {
        return Ok(None);
    }
    match t.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(()),
    }
}
