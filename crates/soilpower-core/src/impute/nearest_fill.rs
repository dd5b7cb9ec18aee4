//! Second imputation pass: nearest-neighbour fallback.
//!
//! Every cell still missing after the cluster pass copies the value of the
//! geographically nearest row that holds one for the same feature. Rows are scanned
//! in order and ties go to the lowest row index. This pass is sequential: in
//! `Sequential` mode each fill immediately becomes a source for later rows.

use log::warn;
use rstar::{PointDistance, RTree};
use serde::{Deserialize, Serialize};

use crate::coords::{IndexedPoint, LatLon};
use crate::table::Table;

/// Which candidate set later lookups in the same column see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// Candidates are the column after the cluster pass plus every fill made so far.
    #[default]
    Sequential,
    /// Candidates are frozen to the column as it stood after the cluster pass.
    Snapshot,
}

/// Fill remaining gaps in `features` from the nearest row with a value.
/// `coords` is aligned with the table rows. Returns the number of cells filled.
pub fn fill_from_nearest(table: &mut Table, coords: &[LatLon], features: &[usize], mode: FallbackMode) -> usize {
    let mut filled = 0;
    for &col in features {
        let missing: Vec<usize> = (0..table.len()).filter(|&r| table.rows[r][col].is_none()).collect();
        if missing.is_empty() {
            continue;
        }

        let mut tree = RTree::bulk_load(
            (0..table.len())
                .filter(|&r| table.rows[r][col].is_some())
                .map(|r| IndexedPoint { idx: r, lat: coords[r].lat, lon: coords[r].lon })
                .collect(),
        );
        if tree.size() == 0 {
            warn!("column {} has no values anywhere; {} cells left missing", table.columns[col], missing.len());
            continue;
        }

        for row in missing {
            let Some(src) = nearest_source(&tree, coords[row].as_array()) else {
                continue;
            };
            table.rows[row][col] = table.rows[src][col];
            filled += 1;
            if mode == FallbackMode::Sequential {
                tree.insert(IndexedPoint { idx: row, lat: coords[row].lat, lon: coords[row].lon });
            }
        }
    }
    filled
}

/// Nearest point to `q`; among equidistant points the lowest row index wins.
fn nearest_source(tree: &RTree<IndexedPoint>, q: [f64; 2]) -> Option<usize> {
    let mut it = tree.nearest_neighbor_iter(&q);
    let first = it.next()?;
    let best_d2 = first.distance_2(&q);
    let mut best = first.idx;
    for p in it {
        if p.distance_2(&q) > best_d2 {
            break;
        }
        best = best.min(p.idx);
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(lons: &[f64]) -> Vec<LatLon> {
        lons.iter().map(|&lon| LatLon::new(0.0, lon)).collect()
    }

    fn column(values: Vec<Option<f64>>) -> Table {
        Table::with_rows(vec!["V".into()], values.into_iter().map(|v| vec![v]).collect())
    }

    #[test]
    fn isolated_gap_copies_nearest_value() {
        let coords = vec![LatLon::new(0.0, 0.0), LatLon::new(1.0, 1.0)];
        let mut t = column(vec![Some(5.0), None]);
        let n = fill_from_nearest(&mut t, &coords, &[0], FallbackMode::Sequential);
        assert_eq!(n, 1);
        assert_eq!(t.rows[1][0], Some(5.0));
    }

    #[test]
    fn fills_chain_in_sequential_mode_only() {
        // A=5 at 0, B gap at 1, C gap at 1.6, D=9 at 3.
        // B always takes A. C's nearest original source is D, but B (now filled) is closer.
        let coords = line(&[0.0, 1.0, 1.6, 3.0]);
        let values = vec![Some(5.0), None, None, Some(9.0)];

        let mut seq = column(values.clone());
        fill_from_nearest(&mut seq, &coords, &[0], FallbackMode::Sequential);
        assert_eq!(seq.rows.iter().map(|r| r[0]).collect::<Vec<_>>(), vec![Some(5.0), Some(5.0), Some(5.0), Some(9.0)]);

        let mut snap = column(values);
        fill_from_nearest(&mut snap, &coords, &[0], FallbackMode::Snapshot);
        assert_eq!(snap.rows.iter().map(|r| r[0]).collect::<Vec<_>>(), vec![Some(5.0), Some(5.0), Some(9.0), Some(9.0)]);
    }

    #[test]
    fn ties_go_to_lowest_row_index() {
        let coords = line(&[2.0, -1.0, 0.0, 1.0]);
        let mut t = column(vec![Some(7.0), Some(1.0), None, Some(3.0)]);
        fill_from_nearest(&mut t, &coords, &[0], FallbackMode::Sequential);
        assert_eq!(t.rows[2][0], Some(1.0));
    }

    #[test]
    fn column_without_values_stays_missing() {
        let coords = line(&[0.0, 1.0]);
        let mut t = column(vec![None, None]);
        assert_eq!(fill_from_nearest(&mut t, &coords, &[0], FallbackMode::Sequential), 0);
        assert_eq!(t.rows, vec![vec![None], vec![None]]);
    }

    #[test]
    fn columns_are_independent() {
        let coords = line(&[0.0, 1.0, 10.0]);
        let mut t = Table::with_rows(
            vec!["A".into(), "B".into()],
            vec![
                vec![Some(1.0), None],
                vec![None, None],
                vec![Some(3.0), Some(30.0)],
            ],
        );
        fill_from_nearest(&mut t, &coords, &[0, 1], FallbackMode::Sequential);
        assert_eq!(t.rows[1], vec![Some(1.0), Some(30.0)]);
        assert_eq!(t.rows[0], vec![Some(1.0), Some(30.0)]);
    }
}
