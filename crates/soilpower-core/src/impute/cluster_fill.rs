//! First imputation pass: per-cluster mean fill.

use log::debug;

use super::dbscan::ClusterAssignment;
use crate::table::Table;

/// Fill each clustered row's missing features with the mean of the non-missing
/// values of the same feature inside its cluster. Noise rows are untouched, as
/// are features missing across a whole cluster. Returns the number of cells filled.
pub fn fill_from_clusters(table: &mut Table, assignment: &ClusterAssignment, features: &[usize]) -> usize {
    let mut filled = 0;
    for (label, members) in assignment.members().iter().enumerate() {
        for &col in features {
            let Some(mean) = cluster_mean(table, members, col) else {
                continue;
            };
            for &row in members {
                if table.rows[row][col].is_none() {
                    table.rows[row][col] = Some(mean);
                    filled += 1;
                }
            }
        }
        debug!("cluster {label}: {} rows", members.len());
    }
    filled
}

/// Arithmetic mean of the present values, `None` when every value is missing.
fn cluster_mean(table: &Table, members: &[usize], col: usize) -> Option<f64> {
    let (sum, n) = members
        .iter()
        .filter_map(|&r| table.rows[r][col])
        .fold((0.0f64, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impute::dbscan::NOISE;
    use approx::assert_relative_eq;

    fn assignment(labels: Vec<i32>) -> ClusterAssignment {
        let n_clusters = labels.iter().filter(|&&l| l >= 0).map(|&l| l as usize + 1).max().unwrap_or(0);
        ClusterAssignment { labels, n_clusters }
    }

    #[test]
    fn gap_takes_cluster_mean() {
        let mut t = Table::with_rows(vec!["V".into()], vec![vec![Some(10.0)], vec![None], vec![Some(20.0)]]);
        let n = fill_from_clusters(&mut t, &assignment(vec![0, 0, 0]), &[0]);
        assert_eq!(n, 1);
        assert_relative_eq!(t.rows[1][0].unwrap(), 15.0);
    }

    #[test]
    fn all_missing_cluster_stays_missing() {
        let mut t = Table::with_rows(vec!["V".into()], vec![vec![None], vec![None]]);
        let n = fill_from_clusters(&mut t, &assignment(vec![0, 0]), &[0]);
        assert_eq!(n, 0);
        assert_eq!(t.rows, vec![vec![None], vec![None]]);
    }

    #[test]
    fn clusters_do_not_share_means_and_noise_is_skipped() {
        let mut t = Table::with_rows(
            vec!["A".into(), "B".into()],
            vec![
                vec![Some(1.0), None],
                vec![None, Some(4.0)],
                vec![Some(100.0), Some(8.0)],
                vec![None, None],
                vec![None, Some(0.0)],
            ],
        );
        let a = assignment(vec![0, 0, 1, 1, NOISE]);
        let n = fill_from_clusters(&mut t, &a, &[0, 1]);
        assert_eq!(n, 4);
        assert_eq!(t.rows[0], vec![Some(1.0), Some(4.0)]);
        assert_eq!(t.rows[1], vec![Some(1.0), Some(4.0)]);
        assert_eq!(t.rows[3], vec![Some(100.0), Some(8.0)]);
        assert_eq!(t.rows[4], vec![None, Some(0.0)]);
    }

    #[test]
    fn only_listed_features_are_filled() {
        let mut t = Table::with_rows(
            vec!["LAT".into(), "V".into()],
            vec![vec![Some(1.0), Some(2.0)], vec![None, None]],
        );
        fill_from_clusters(&mut t, &assignment(vec![0, 0]), &[1]);
        assert_eq!(t.rows[1], vec![None, Some(2.0)]);
    }
}
