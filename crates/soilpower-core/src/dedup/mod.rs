//! Deduplication driver: partition by identity key, resolve every group,
//! concatenate in ascending key order.
//!
//! Groups share no state. With the `threading` feature the per-group map runs on
//! rayon; the indexed collect keeps group order, so both paths emit identical
//! tables.
pub mod partition;
pub mod resolve;

use log::{debug, info, warn};
use serde::Serialize;

use crate::error::Result;
use crate::table::{Record, Table};
use partition::{partition, Group};
use resolve::{resolve_conflicts, Resolution};

/// Counts reported by one deduplication pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupSummary {
    pub rows_in: usize,
    pub rows_out: usize,
    pub groups: usize,
    /// Rows absorbed into another row.
    pub absorbed: usize,
    /// Rows passed through unmerged because of a disagreement.
    pub conflicted: usize,
    /// Rows absorbed into a seed that a later disagreement voided.
    pub voided: usize,
}

/// Deduplicate `table` on (LAT, LON, YEAR).
///
/// A malformed key anywhere aborts the pass before any group is resolved.
pub fn deduplicate(table: &Table) -> Result<(Table, DedupSummary)> {
    let groups = partition(table)?;
    let resolved = resolve_all(table, &groups);

    let mut summary = DedupSummary {
        rows_in: table.len(),
        groups: groups.len(),
        ..DedupSummary::default()
    };
    let mut rows: Vec<Record> = Vec::with_capacity(table.len());
    for res in resolved {
        summary.absorbed += res.absorbed;
        summary.conflicted += res.conflicted;
        summary.voided += res.voided;
        rows.extend(res.rows);
    }
    summary.rows_out = rows.len();

    info!(
        "deduplicated {} rows in {} groups -> {} rows ({} absorbed, {} conflicting seeds kept)",
        summary.rows_in, summary.groups, summary.rows_out, summary.absorbed, summary.conflicted
    );
    Ok((Table::with_rows(table.columns.clone(), rows), summary))
}

fn resolve_group(table: &Table, group: &Group) -> Resolution {
    let rows: Vec<&Record> = group.rows.iter().map(|&i| &table.rows[i]).collect();
    let res = resolve_conflicts(&rows);
    if res.voided > 0 {
        warn!(
            "group ({}, {}, {}): {} conflicting seeds discarded {} absorbed rows",
            group.key.lat, group.key.lon, group.key.year, res.conflicted, res.voided
        );
    } else if res.conflicted > 0 {
        debug!(
            "group ({}, {}, {}): {} rows, {} conflicting",
            group.key.lat, group.key.lon, group.key.year, rows.len(), res.conflicted
        );
    }
    res
}

#[cfg(feature = "threading")]
fn resolve_all(table: &Table, groups: &[Group]) -> Vec<Resolution> {
    use rayon::prelude::*;
    groups.par_iter().map(|g| resolve_group(table, g)).collect()
}

#[cfg(not(feature = "threading"))]
fn resolve_all(table: &Table, groups: &[Group]) -> Vec<Resolution> {
    groups.iter().map(|g| resolve_group(table, g)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SoilError;

    fn table(rows: Vec<Vec<Option<f64>>>) -> Table {
        Table::with_rows(
            vec!["LAT".into(), "LON".into(), "YEAR".into(), "X".into(), "Y".into()],
            rows,
        )
    }

    #[test]
    fn merges_within_groups_and_orders_by_key() {
        let t = table(vec![
            vec![Some(5.0), Some(5.0), Some(2001.0), Some(1.0), None],
            vec![Some(1.0), Some(1.0), Some(2000.0), None, Some(7.0)],
            vec![Some(5.0), Some(5.0), Some(2001.0), None, Some(2.0)],
            vec![Some(1.0), Some(1.0), Some(2000.0), Some(3.0), None],
        ]);
        let (out, summary) = deduplicate(&t).unwrap();
        assert_eq!(
            out.rows,
            vec![
                vec![Some(1.0), Some(1.0), Some(2000.0), Some(3.0), Some(7.0)],
                vec![Some(5.0), Some(5.0), Some(2001.0), Some(1.0), Some(2.0)],
            ]
        );
        assert_eq!(summary.groups, 2);
        assert_eq!(summary.rows_out, 2);
        assert_eq!(summary.absorbed, 2);
        assert_eq!(summary.conflicted, 0);
        assert_eq!(summary.voided, 0);
    }

    #[test]
    fn conflicting_chain_within_group_keeps_seed() {
        let t = table(vec![
            vec![Some(0.0), Some(0.0), Some(2000.0), Some(1.0), None],
            vec![Some(0.0), Some(0.0), Some(2000.0), None, Some(2.0)],
            vec![Some(0.0), Some(0.0), Some(2000.0), Some(2.0), None],
        ]);
        let (out, summary) = deduplicate(&t).unwrap();
        assert_eq!(
            out.rows,
            vec![
                vec![Some(0.0), Some(0.0), Some(2000.0), Some(1.0), None],
                vec![Some(0.0), Some(0.0), Some(2000.0), Some(2.0), None],
            ]
        );
        assert_eq!(summary.conflicted, 1);
        // Row 1's Y value sat only in the voided accumulator.
        assert_eq!(summary.absorbed, 1);
        assert_eq!(summary.voided, 1);
    }

    #[test]
    fn different_years_never_merge() {
        let t = table(vec![
            vec![Some(0.0), Some(0.0), Some(2000.0), Some(1.0), None],
            vec![Some(0.0), Some(0.0), Some(2001.0), None, Some(2.0)],
        ]);
        let (out, _) = deduplicate(&t).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn output_never_exceeds_input() {
        let t = table(vec![
            vec![Some(0.0), Some(0.0), Some(2000.0), Some(1.0), Some(1.0)],
            vec![Some(0.0), Some(0.0), Some(2000.0), Some(2.0), Some(1.0)],
            vec![Some(0.0), Some(0.0), Some(2000.0), Some(3.0), None],
            vec![Some(9.0), Some(0.0), Some(2000.0), None, None],
        ]);
        let (out, summary) = deduplicate(&t).unwrap();
        assert!(out.len() <= t.len());
        assert_eq!(summary.rows_in, 4);
        assert_eq!(summary.rows_out, out.len());
    }

    #[test]
    fn malformed_key_aborts() {
        let t = table(vec![
            vec![Some(0.0), Some(0.0), Some(2000.0), Some(1.0), None],
            vec![None, Some(0.0), Some(2000.0), Some(1.0), None],
        ]);
        assert!(matches!(deduplicate(&t), Err(SoilError::MissingKey { row: 2, .. })));
    }

    #[test]
    fn rerun_is_stable() {
        let t = table(vec![
            vec![Some(1.0), Some(1.0), Some(2000.0), Some(1.0), None],
            vec![Some(1.0), Some(1.0), Some(2000.0), None, Some(2.0)],
            vec![Some(2.0), Some(1.0), Some(2000.0), Some(4.0), None],
        ]);
        let (once, _) = deduplicate(&t).unwrap();
        let (twice, _) = deduplicate(&once).unwrap();
        assert_eq!(once, twice);
    }
}
