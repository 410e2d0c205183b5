//! K shortest loopless paths (Yen) on top of the grid A*
//!
//! Path 0 is a plain A* search. Every further path is the cheapest deviation
//! from an already confirmed path: for each spur node along confirmed path
//! `i`, the root prefix up to the spur is fixed, its interior intersections
//! are closed, and the next step of every confirmed path sharing that root is
//! closed too. A* from the spur to the goal then yields a new candidate.
//! Candidates wait in a [`CandidateStore`] keyed by total cost.

use butterfly_common::Result;
use log::{debug, trace};
use serde::Serialize;
use std::collections::HashSet;

use crate::core::astar::{search_path, Exclusions, Traversal};
use crate::core::avl::CandidateStore;
use crate::core::grid::{Coord, GridConfig};

/// Per-route figures that do not drive the search itself
pub trait RouteMetrics {
    /// Crossing time of the street `from -> to`
    fn crossing_time(&self, from: Coord, to: Coord) -> f64;

    /// Risk score of a complete route
    fn risk(&self, path: &[Coord]) -> u64;
}

/// [`RouteMetrics`] from a pair of closures
pub struct Metrics<T, R> {
    pub time: T,
    pub risk: R,
}

impl<T, R> RouteMetrics for Metrics<T, R>
where
    T: Fn(Coord, Coord) -> f64,
    R: Fn(&[Coord]) -> u64,
{
    fn crossing_time(&self, from: Coord, to: Coord) -> f64 {
        (self.time)(from, to)
    }

    fn risk(&self, path: &[Coord]) -> u64 {
        (self.risk)(path)
    }
}

/// One ranked route
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// 1-based rank after sorting by cost
    pub route_id: usize,
    pub path: Vec<Coord>,
    /// Number of streets walked
    pub distance: usize,
    /// Sum of crossing times, rounded to the nearest integer
    pub time: u64,
    pub risk: u64,
    /// Ranking objective
    pub cost: f64,
}

/// Up to `k` loopless routes from `start` to `goal`, cheapest first.
///
/// `k == 0` and an unreachable goal both give an empty list.
pub fn k_shortest_paths<T, M>(
    grid: GridConfig,
    start: Coord,
    goal: Coord,
    traversal: &T,
    metrics: &M,
    k: usize,
) -> Result<Vec<Route>>
where
    T: Traversal + ?Sized,
    M: RouteMetrics + ?Sized,
{
    k_shortest_paths_with_progress(grid, start, goal, traversal, metrics, k, |_, _| {})
}

/// Same as [`k_shortest_paths`], calling `on_confirmed(found, k)` whenever a
/// path is confirmed.
pub fn k_shortest_paths_with_progress<T, M, F>(
    grid: GridConfig,
    start: Coord,
    goal: Coord,
    traversal: &T,
    metrics: &M,
    k: usize,
    mut on_confirmed: F,
) -> Result<Vec<Route>>
where
    T: Traversal + ?Sized,
    M: RouteMetrics + ?Sized,
    F: FnMut(usize, usize),
{
    if k == 0 {
        return Ok(Vec::new());
    }

    let Some(first) = search_path(grid, start, goal, traversal)? else {
        debug!("No path from {start} to {goal}");
        return Ok(Vec::new());
    };

    let mut confirmed: Vec<(Vec<Coord>, f64)> = vec![(first.path, first.cost)];
    on_confirmed(1, k);

    let mut candidates: CandidateStore<Vec<Coord>> = CandidateStore::new();
    // every path ever confirmed or queued, so no path is queued twice
    let mut seen: HashSet<Vec<Coord>> = HashSet::new();
    seen.insert(confirmed[0].0.clone());

    let mut blocked_nodes: HashSet<Coord> = HashSet::new();
    let mut blocked_edges: HashSet<(Coord, Coord)> = HashSet::new();

    for i in 0..k - 1 {
        let base = confirmed[i].0.clone();

        for j in 0..base.len() - 1 {
            let spur = base[j];
            let root = &base[..=j];

            blocked_nodes.clear();
            blocked_nodes.extend(root[..j].iter().copied());

            blocked_edges.clear();
            for (path, _) in &confirmed {
                if path.len() > j + 1 && &path[..=j] == root {
                    blocked_edges.insert((path[j], path[j + 1]));
                }
            }

            let restricted = Exclusions::new(traversal, &blocked_nodes, &blocked_edges);
            let Some(spur_result) = search_path(grid, spur, goal, &restricted)? else {
                continue;
            };

            let mut candidate = Vec::with_capacity(j + spur_result.path.len());
            candidate.extend_from_slice(&root[..j]);
            candidate.extend_from_slice(&spur_result.path);
            if seen.contains(&candidate) {
                continue;
            }

            let root_cost: f64 = root
                .windows(2)
                .map(|w| traversal.step_cost(w[0], w[1]))
                .sum();
            let total = root_cost + spur_result.cost;

            seen.insert(candidate.clone());
            candidates.insert(total, candidate);
        }

        trace!(
            "Yen iteration {}: {} candidates queued",
            i + 1,
            candidates.len()
        );

        if candidates.is_empty() {
            break;
        }
        let (cost, path) = candidates.extract_min()?;
        confirmed.push((path, cost));
        on_confirmed(confirmed.len(), k);
    }

    let mut routes: Vec<Route> = confirmed
        .into_iter()
        .take(k)
        .map(|(path, cost)| package(path, cost, metrics))
        .collect();

    routes.sort_by(|a, b| a.cost.total_cmp(&b.cost));
    for (idx, route) in routes.iter_mut().enumerate() {
        route.route_id = idx + 1;
    }

    debug!(
        "Found {} of {} requested routes from {start} to {goal}",
        routes.len(),
        k
    );
    Ok(routes)
}

fn package<M: RouteMetrics + ?Sized>(path: Vec<Coord>, cost: f64, metrics: &M) -> Route {
    let time: f64 = path
        .windows(2)
        .map(|w| metrics.crossing_time(w[0], w[1]))
        .sum();
    let risk = metrics.risk(&path);
    Route {
        route_id: 0,
        distance: path.len().saturating_sub(1),
        time: time.round().max(0.0) as u64,
        risk,
        cost,
        path,
    }
}
