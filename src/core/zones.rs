//! Grouping of hazard points into zones
//!
//! Two points belong to the same zone when a chain of points links them
//! with every hop at most `radius` apart (Manhattan). Duplicates count once.

use std::collections::HashSet;

use crate::core::grid::Coord;

/// Neighbor radius used when none is given
pub const DEFAULT_ZONE_RADIUS: u32 = 1;
/// Smallest component reported as a zone by default
pub const DEFAULT_ZONE_MIN_SIZE: usize = 6;

/// A connected group of hazard points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HazardZone {
    /// 1-based, largest zone first
    pub zone_id: usize,
    pub points: Vec<Coord>,
}

impl HazardZone {
    pub fn size(&self) -> usize {
        self.points.len()
    }

    /// Mean position as `(row, col)`
    pub fn centroid(&self) -> (f64, f64) {
        if self.points.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.points.len() as f64;
        let (sr, sc) = self.points.iter().fold((0i64, 0i64), |(sr, sc), p| {
            (sr + i64::from(p.row), sc + i64::from(p.col))
        });
        (sr as f64 / n, sc as f64 / n)
    }

    /// `(min_row, min_col, max_row, max_col)`, `None` for an empty zone
    pub fn bbox(&self) -> Option<(i32, i32, i32, i32)> {
        let first = self.points.first()?;
        Some(self.points.iter().fold(
            (first.row, first.col, first.row, first.col),
            |(r0, c0, r1, c1), p| (r0.min(p.row), c0.min(p.col), r1.max(p.row), c1.max(p.col)),
        ))
    }
}

/// Connected components of `points` with at least `min_size` members
/// (clamped to at least 1), largest first.
pub fn cluster_hazards(points: &[Coord], radius: u32, min_size: usize) -> Vec<HazardZone> {
    let min_size = min_size.max(1);
    let r = i32::try_from(radius).unwrap_or(i32::MAX);

    let offsets: Vec<(i32, i32)> = (-r..=r)
        .flat_map(|dr| {
            let span = r - dr.abs();
            (-span..=span).map(move |dc| (dr, dc))
        })
        .collect();

    let present: HashSet<Coord> = points.iter().copied().collect();
    let mut visited: HashSet<Coord> = HashSet::with_capacity(present.len());
    let mut components: Vec<Vec<Coord>> = Vec::new();

    for &seed in points {
        if !visited.insert(seed) {
            continue;
        }
        let mut stack = vec![seed];
        let mut component = Vec::new();
        while let Some(p) = stack.pop() {
            component.push(p);
            for &(dr, dc) in &offsets {
                let q = Coord::new(p.row.saturating_add(dr), p.col.saturating_add(dc));
                if present.contains(&q) && visited.insert(q) {
                    stack.push(q);
                }
            }
        }
        if component.len() >= min_size {
            components.push(component);
        }
    }

    // stable: equal sizes keep discovery order
    components.sort_by(|a, b| b.len().cmp(&a.len()));
    components
        .into_iter()
        .enumerate()
        .map(|(idx, points)| HazardZone {
            zone_id: idx + 1,
            points,
        })
        .collect()
}
