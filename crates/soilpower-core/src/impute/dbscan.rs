//! Density-based spatial clustering over (lat, lon).
//!
//! A point is core when at least `min_samples` points (itself included) lie within
//! `eps`, distances planar and inclusive. Clusters grow outward from core points in
//! row order, so label 0 belongs to the lowest-index core point. Border points join
//! the first cluster that reaches them; the rest are `NOISE`.

use std::collections::VecDeque;

use rstar::RTree;

use crate::coords::{IndexedPoint, LatLon};
use crate::error::{Result, SoilError};

/// Label for points in no dense neighbourhood.
pub const NOISE: i32 = -1;

const UNVISITED: i32 = -2;

/// Clustering parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DbscanParams {
    /// Neighbourhood radius in degrees.
    pub eps: f64,
    /// Minimum neighbourhood size, the point itself included.
    pub min_samples: usize,
}

impl DbscanParams {
    pub fn validate(&self) -> Result<()> {
        if !self.eps.is_finite() || self.eps <= 0.0 {
            return Err(SoilError::InvalidParameter(format!("eps must be > 0, got {}", self.eps)));
        }
        if self.min_samples == 0 {
            return Err(SoilError::InvalidParameter("min_samples must be >= 1".into()));
        }
        Ok(())
    }
}

/// Cluster labels aligned with the input points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    pub labels: Vec<i32>,
    pub n_clusters: usize,
}

impl ClusterAssignment {
    /// Row indices of each cluster, by label. Noise is excluded.
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut out = vec![Vec::new(); self.n_clusters];
        for (i, &l) in self.labels.iter().enumerate() {
            if l >= 0 {
                out[l as usize].push(i);
            }
        }
        out
    }

    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == NOISE).count()
    }
}

pub fn dbscan(points: &[LatLon], params: DbscanParams) -> Result<ClusterAssignment> {
    params.validate()?;

    let tree = RTree::bulk_load(
        points
            .iter()
            .enumerate()
            .map(|(idx, p)| IndexedPoint { idx, lat: p.lat, lon: p.lon })
            .collect(),
    );
    let eps2 = params.eps * params.eps;
    // Sorted so that expansion order, and with it border ownership, is stable.
    let neighbours = |i: usize| -> Vec<usize> {
        let mut v: Vec<usize> = tree
            .locate_within_distance(points[i].as_array(), eps2)
            .map(|p| p.idx)
            .collect();
        v.sort_unstable();
        v
    };

    let mut labels = vec![UNVISITED; points.len()];
    let mut next_label = 0i32;
    let mut queue: VecDeque<usize> = VecDeque::new();

    for i in 0..points.len() {
        if labels[i] != UNVISITED {
            continue;
        }
        let seeds = neighbours(i);
        if seeds.len() < params.min_samples {
            labels[i] = NOISE;
            continue;
        }

        let label = next_label;
        next_label += 1;
        labels[i] = label;
        queue.extend(seeds.into_iter().filter(|&j| j != i));

        while let Some(j) = queue.pop_front() {
            if labels[j] == NOISE {
                labels[j] = label;
                continue;
            }
            if labels[j] != UNVISITED {
                continue;
            }
            labels[j] = label;
            let nb = neighbours(j);
            if nb.len() >= params.min_samples {
                queue.extend(nb.into_iter().filter(|&k| labels[k] == UNVISITED || labels[k] == NOISE));
            }
        }
    }

    Ok(ClusterAssignment { labels, n_clusters: next_label as usize })
}
