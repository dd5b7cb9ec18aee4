//! Spatial-cluster imputation: DBSCAN over (LAT, LON) → per-cluster mean fill →
//! nearest-neighbour fallback → before/after audit.
pub mod cluster_fill;
pub mod dbscan;
pub mod nearest_fill;
pub mod validate;

use log::info;
use serde::Serialize;

use crate::coords::{LatLon, BBOX_COLUMNS, LAT, LON};
use crate::error::{Result, SoilError};
use crate::table::Table;
use cluster_fill::fill_from_clusters;
use dbscan::{dbscan, DbscanParams};
use nearest_fill::{fill_from_nearest, FallbackMode};
use validate::ImputationReport;

/// Everything the imputation stage needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ImputeParams {
    pub clustering: DbscanParams,
    pub fallback: FallbackMode,
    /// Columns never imputed (coordinates and bounding box by default).
    pub excluded_columns: Vec<String>,
}

impl Default for ImputeParams {
    fn default() -> Self {
        Self {
            clustering: DbscanParams { eps: 0.5, min_samples: 5 },
            fallback: FallbackMode::Sequential,
            excluded_columns: default_excluded_columns(),
        }
    }
}

pub fn default_excluded_columns() -> Vec<String> {
    [LAT, LON].iter().chain(BBOX_COLUMNS.iter()).map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ImputeSummary {
    pub n_clusters: usize,
    pub noise_rows: usize,
    pub filled_by_cluster: usize,
    pub filled_by_nearest: usize,
    pub report: ImputationReport,
}

/// Coordinates of every row; a row missing LAT or LON cannot be placed.
pub fn row_coordinates(table: &Table) -> Result<Vec<LatLon>> {
    let lat = table.require_column(LAT)?;
    let lon = table.require_column(LON)?;
    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let get = |c: usize, name: &str| {
                r[c].ok_or_else(|| SoilError::MissingCoordinate { row: i + 1, column: name.to_string() })
            };
            Ok(LatLon::new(get(lat, LAT)?, get(lon, LON)?))
        })
        .collect()
}

/// Impute missing feature values of `table` and return the filled copy.
pub fn spatial_cluster_imputation(table: &Table, params: &ImputeParams) -> Result<(Table, ImputeSummary)> {
    params.clustering.validate()?;
    let coords = row_coordinates(table)?;
    let features: Vec<usize> = (0..table.width())
        .filter(|&c| !params.excluded_columns.iter().any(|e| *e == table.columns[c]))
        .collect();

    let assignment = dbscan(&coords, params.clustering)?;
    info!(
        "clustered {} rows: {} clusters, {} noise (eps={}, min_samples={})",
        table.len(),
        assignment.n_clusters,
        assignment.noise_count(),
        params.clustering.eps,
        params.clustering.min_samples
    );

    let mut filled = table.clone();
    let by_cluster = fill_from_clusters(&mut filled, &assignment, &features);
    let by_nearest = fill_from_nearest(&mut filled, &coords, &features, params.fallback);
    let report = ImputationReport::compare(table, &filled);
    info!(
        "imputed {} cells ({} cluster mean, {} nearest); {} still missing",
        by_cluster + by_nearest,
        by_cluster,
        by_nearest,
        report.total_missing_after
    );

    let summary = ImputeSummary {
        n_clusters: assignment.n_clusters,
        noise_rows: assignment.noise_count(),
        filled_by_cluster: by_cluster,
        filled_by_nearest: by_nearest,
        report,
    };
    Ok((filled, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unclustered_pair_falls_back_to_nearest() {
        let t = Table::with_rows(
            cols(&["LAT", "LON", "V"]),
            vec![vec![Some(0.0), Some(0.0), Some(5.0)], vec![Some(1.0), Some(1.0), None]],
        );
        let params = ImputeParams {
            clustering: DbscanParams { eps: 0.5, min_samples: 5 },
            ..ImputeParams::default()
        };
        let (out, summary) = spatial_cluster_imputation(&t, &params).unwrap();
        assert_eq!(out.rows[1][2], Some(5.0));
        assert_eq!(summary.n_clusters, 0);
        assert_eq!(summary.noise_rows, 2);
        assert_eq!(summary.filled_by_nearest, 1);
    }

    #[test]
    fn cluster_mean_takes_precedence_over_nearest() {
        // Rows 0-2 cluster together; row 3 is far away noise holding a value.
        let t = Table::with_rows(
            cols(&["LAT", "LON", "V"]),
            vec![
                vec![Some(0.0), Some(0.0), Some(10.0)],
                vec![Some(0.0), Some(0.1), None],
                vec![Some(0.0), Some(0.2), Some(20.0)],
                vec![Some(9.0), Some(9.0), None],
            ],
        );
        let params = ImputeParams {
            clustering: DbscanParams { eps: 0.5, min_samples: 3 },
            ..ImputeParams::default()
        };
        let (out, summary) = spatial_cluster_imputation(&t, &params).unwrap();
        assert_relative_eq!(out.rows[1][2].unwrap(), 15.0);
        // Noise row takes its nearest source, row 2.
        assert_eq!(out.rows[3][2], Some(20.0));
        assert_eq!(summary.filled_by_cluster, 1);
        assert_eq!(summary.filled_by_nearest, 1);
        assert_eq!(summary.report.total_missing_after, 0);
    }

    #[test]
    fn feature_missing_across_a_cluster_falls_through_to_nearest() {
        // Rows 0-2 cluster with no V at all; noise rows 3 and 4 hold values.
        let t = Table::with_rows(
            cols(&["LAT", "LON", "V"]),
            vec![
                vec![Some(0.0), Some(0.0), None],
                vec![Some(0.0), Some(0.1), None],
                vec![Some(0.0), Some(0.2), None],
                vec![Some(0.0), Some(3.0), Some(7.0)],
                vec![Some(0.0), Some(-5.0), Some(1.0)],
            ],
        );
        let params = ImputeParams {
            clustering: DbscanParams { eps: 0.5, min_samples: 3 },
            ..ImputeParams::default()
        };
        let (out, summary) = spatial_cluster_imputation(&t, &params).unwrap();
        assert_eq!(summary.n_clusters, 1);
        assert_eq!(summary.filled_by_cluster, 0);
        assert_eq!(summary.filled_by_nearest, 3);
        // Row 0 copies row 3; rows 1 and 2 then chain from the freshly filled rows.
        assert_eq!(out.rows[0][2], Some(7.0));
        assert_eq!(out.rows[1][2], Some(7.0));
        assert_eq!(out.rows[2][2], Some(7.0));
        assert_eq!(summary.report.total_missing_after, 0);
    }

    #[test]
    fn excluded_columns_are_left_alone() {
        let t = Table::with_rows(
            cols(&["LAT", "LON", "BOTTOM_LEFT_LAT", "V"]),
            vec![
                vec![Some(0.0), Some(0.0), Some(-1.0), Some(1.0)],
                vec![Some(0.0), Some(0.1), None, None],
            ],
        );
        let (out, _) = spatial_cluster_imputation(&t, &ImputeParams::default()).unwrap();
        assert_eq!(out.rows[1][2], None);
        assert_eq!(out.rows[1][3], Some(1.0));
    }

    #[test]
    fn input_table_is_not_mutated() {
        let t = Table::with_rows(
            cols(&["LAT", "LON", "V"]),
            vec![vec![Some(0.0), Some(0.0), Some(5.0)], vec![Some(1.0), Some(1.0), None]],
        );
        let copy = t.clone();
        let _ = spatial_cluster_imputation(&t, &ImputeParams::default()).unwrap();
        assert_eq!(t, copy);
    }

    #[test]
    fn missing_coordinate_is_an_error() {
        let t = Table::with_rows(
            cols(&["LAT", "LON", "V"]),
            vec![vec![Some(0.0), None, Some(5.0)]],
        );
        assert!(matches!(
            spatial_cluster_imputation(&t, &ImputeParams::default()),
            Err(SoilError::MissingCoordinate { row: 1, .. })
        ));
    }
}
