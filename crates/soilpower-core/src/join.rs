//! Point-in-box spatial join of climate points onto soil regions.
//!
//! A point matches a region when it lies strictly inside the region's bounding
//! box; points on an edge do not match. Output rows follow point order, then region
//! order. Output columns are the point columns followed by the region columns, with
//! `_left` / `_right` suffixes on names the two tables share.

use log::{info, warn};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::RTree;

use crate::coords::{BOTTOM_LEFT_LAT, BOTTOM_LEFT_LON, LAT, LON, UPPER_RIGHT_LAT, UPPER_RIGHT_LON};
use crate::error::Result;
use crate::table::{Record, Table};

type RegionBox = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Inner join `points` (LAT, LON) into `regions` (bounding-box columns).
pub fn spatial_join(points: &Table, regions: &Table) -> Result<Table> {
    let lat = points.require_column(LAT)?;
    let lon = points.require_column(LON)?;
    let bl_lat = regions.require_column(BOTTOM_LEFT_LAT)?;
    let bl_lon = regions.require_column(BOTTOM_LEFT_LON)?;
    let ur_lat = regions.require_column(UPPER_RIGHT_LAT)?;
    let ur_lon = regions.require_column(UPPER_RIGHT_LON)?;

    let mut skipped = 0usize;
    let boxes: Vec<RegionBox> = regions
        .rows
        .iter()
        .enumerate()
        .filter_map(|(i, r)| match (r[bl_lat], r[bl_lon], r[ur_lat], r[ur_lon]) {
            (Some(a), Some(b), Some(c), Some(d)) => {
                Some(GeomWithData::new(Rectangle::from_corners([a, b], [c, d]), i))
            }
            _ => {
                skipped += 1;
                None
            }
        })
        .collect();
    if skipped > 0 {
        warn!("{skipped} regions without a complete bounding box were skipped");
    }
    let tree = RTree::bulk_load(boxes);

    let mut out = Table::new(joined_columns(&points.columns, &regions.columns));
    let mut candidates: Vec<usize> = Vec::new();
    for p in &points.rows {
        let (Some(plat), Some(plon)) = (p[lat], p[lon]) else {
            continue;
        };
        candidates.clear();
        candidates.extend(
            tree.locate_all_at_point(&[plat, plon])
                .filter(|b| strictly_inside(b.geom(), plat, plon))
                .map(|b| b.data),
        );
        candidates.sort_unstable();
        for &ri in &candidates {
            let mut row: Record = Vec::with_capacity(out.width());
            row.extend_from_slice(p);
            row.extend_from_slice(&regions.rows[ri]);
            out.rows.push(row);
        }
    }

    info!(
        "joined {} points onto {} regions -> {} rows",
        points.len(),
        regions.len(),
        out.len()
    );
    Ok(out)
}

fn strictly_inside(rect: &Rectangle<[f64; 2]>, lat: f64, lon: f64) -> bool {
    let lo = rect.lower();
    let hi = rect.upper();
    lat > lo[0] && lat < hi[0] && lon > lo[1] && lon < hi[1]
}

fn joined_columns(left: &[String], right: &[String]) -> Vec<String> {
    let suffixed = |name: &String, other: &[String], suffix: &str| {
        if other.contains(name) {
            format!("{name}{suffix}")
        } else {
            name.clone()
        }
    };
    left.iter()
        .map(|c| suffixed(c, right, "_left"))
        .chain(right.iter().map(|c| suffixed(c, left, "_right")))
        .collect()
}
