//! Column and row pruning between the deduplication and imputation stages.

use log::{info, warn};

use crate::table::Table;

/// Remove columns whose name starts with any of `prefixes` or equals any of
/// `names`. Names not present in the table are logged and ignored.
pub fn drop_columns(table: &Table, prefixes: &[String], names: &[String]) -> Table {
    let absent: Vec<&String> = names.iter().filter(|n| table.column_index(n).is_none()).collect();
    if !absent.is_empty() {
        warn!("columns not present, ignored: {absent:?}");
    }

    let keep: Vec<usize> = (0..table.width())
        .filter(|&c| {
            let name = &table.columns[c];
            !prefixes.iter().any(|p| name.starts_with(p.as_str())) && !names.contains(name)
        })
        .collect();
    let out = table.select(&keep);
    info!("dropped {} columns, {} remain", table.width() - out.width(), out.width());
    out
}

/// Remove columns holding no value in any row.
pub fn drop_empty_columns(table: &Table) -> Table {
    let keep: Vec<usize> = (0..table.width())
        .filter(|&c| table.rows.iter().any(|r| r[c].is_some()))
        .collect();
    table.select(&keep)
}

/// Remove rows whose only values sit in `fields`, e.g. rows carrying nothing but
/// a bounding box.
pub fn drop_rows_only_in(table: &Table, fields: &[&str]) -> Table {
    let other: Vec<usize> = (0..table.width())
        .filter(|&c| !fields.contains(&table.columns[c].as_str()))
        .collect();
    let rows = table
        .rows
        .iter()
        .filter(|r| other.iter().any(|&c| r[c].is_some()))
        .cloned()
        .collect();
    Table::with_rows(table.columns.clone(), rows)
}
