//! Seeded generation of crossing times and blocked streets
//!
//! Every function here is deterministic for a given seed.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

use crate::core::astar::{search_path, Traversal};
use crate::core::grid::{Coord, Edge, GridConfig};

/// Attempts made by [`generate_blocked_streets`] to keep the goal reachable
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Assign every street an integer crossing time drawn uniformly from
/// `[max(1, min), max(max(1, min), max)]`.
pub fn generate_crossing_times(
    grid: GridConfig,
    seed: u64,
    min: u32,
    max: u32,
) -> HashMap<Edge, u32> {
    let lo = min.max(1);
    let hi = max.max(lo);
    let mut rng = StdRng::seed_from_u64(seed);

    grid.all_edges()
        .into_iter()
        .map(|edge| (edge, rng.gen_range(lo..=hi)))
        .collect()
}

struct OpenStreets<'a> {
    blocked: &'a HashSet<Edge>,
}

impl Traversal for OpenStreets<'_> {
    fn is_edge_blocked(&self, from: Coord, to: Coord) -> bool {
        self.blocked.contains(&Edge::new(from, to))
    }

    fn step_cost(&self, _from: Coord, _to: Coord) -> f64 {
        1.0
    }
}

fn sample_blocked(edges: &[Edge], target: usize, seed: u64) -> HashSet<Edge> {
    let mut shuffled = edges.to_vec();
    shuffled.shuffle(&mut StdRng::seed_from_u64(seed));
    shuffled.into_iter().take(target).collect()
}

/// Pick `round(density * streets)` streets to block, retrying with seeds
/// `seed, seed + 1, ...` until `start` can still reach `goal`.
///
/// When no attempt leaves a route open the first sample is returned anyway.
/// Endpoints outside the grid make every attempt count as unsolvable.
pub fn generate_blocked_streets(
    grid: GridConfig,
    density: f64,
    seed: u64,
    start: Coord,
    goal: Coord,
    max_attempts: u32,
) -> HashSet<Edge> {
    let edges = grid.all_edges();
    let density = if density.is_nan() {
        0.0
    } else {
        density.clamp(0.0, 1.0)
    };
    let target = ((density * edges.len() as f64).round() as usize).min(edges.len());

    let mut first: Option<HashSet<Edge>> = None;
    for attempt in 0..max_attempts.max(1) {
        let blocked = sample_blocked(&edges, target, seed.wrapping_add(u64::from(attempt)));
        let solvable = matches!(
            search_path(grid, start, goal, &OpenStreets { blocked: &blocked }),
            Ok(Some(_))
        );
        if solvable {
            debug!(
                "Blocked {} of {} streets (attempt {})",
                blocked.len(),
                edges.len(),
                attempt + 1
            );
            return blocked;
        }
        if first.is_none() {
            first = Some(blocked);
        }
    }

    warn!("No solvable layout after {max_attempts} attempts, keeping the first sample");
    first.unwrap_or_default()
}
