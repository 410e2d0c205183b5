//! # Butterfly-grid Library
//!
//! Finds the K best loop-free routes between two intersections of a
//! rectangular street grid in which some streets are blocked.
//!
//! ## Features
//!
//! - **A\* search**: single best route with pluggable blocking rules and step costs
//! - **Yen's algorithm**: K shortest loopless routes ranked by distance or time
//! - **Risk scoring**: closest approach to a blocked street via a vantage-point tree
//! - **Scenarios**: seeded map generation, JSON files, CSV export of results
//!
//! ## Basic Usage
//!
//! ```rust
//! use butterfly_grid::{Coord, Criterion, GridConfig, StreetNetwork};
//! use std::collections::{HashMap, HashSet};
//!
//! let network = StreetNetwork::new(GridConfig::new(3, 3), HashSet::new(), HashMap::new());
//! let routes = butterfly_grid::find_routes(
//!     &network,
//!     Coord::new(0, 0),
//!     Coord::new(2, 2),
//!     6,
//!     Criterion::Distance,
//! )?;
//!
//! assert_eq!(routes.len(), 6);
//! assert_eq!(routes[0].distance, 4);
//! # Ok::<(), butterfly_grid::Error>(())
//! ```
//!
//! ## Custom Traversal
//!
//! ```rust
//! use butterfly_grid::{search_path, Coord, GridConfig, Traversal};
//!
//! struct Hilly;
//!
//! impl Traversal for Hilly {
//!     fn step_cost(&self, from: Coord, to: Coord) -> f64 {
//!         if to.row > from.row { 3.0 } else { 1.0 }
//!     }
//! }
//!
//! let best = search_path(GridConfig::new(4, 4), Coord::new(0, 0), Coord::new(3, 0), &Hilly)?
//!     .expect("open grid");
//! assert_eq!(best.cost, 9.0);
//! # Ok::<(), butterfly_grid::Error>(())
//! ```

// Re-export core types that users might need
pub use crate::core::astar::{search_path, Exclusions, PathResult, Traversal};
pub use crate::core::avl::CandidateStore;
pub use crate::core::generate::{
    generate_blocked_streets, generate_crossing_times, DEFAULT_MAX_ATTEMPTS,
};
pub use crate::core::grid::{normalize_edge, Coord, Edge, GridConfig, MAX_GRID_DIM};
pub use crate::core::network::{Criterion, RoutingProfile, StreetNetwork, DEFAULT_CROSSING_TIME};
pub use crate::core::report::{export_csv, format_path, render_table, to_records, RouteRecord};
pub use crate::core::scenario::Scenario;
pub use crate::core::vptree::{Manhattan, Metric, VpTree, NO_DISTANCE};
pub use crate::core::yen::{
    k_shortest_paths, k_shortest_paths_with_progress, Metrics, Route, RouteMetrics,
};
pub use crate::core::zones::{
    cluster_hazards, HazardZone, DEFAULT_ZONE_MIN_SIZE, DEFAULT_ZONE_RADIUS,
};
pub use butterfly_common::{Error, Result};

// Internal modules
mod core;

/// Rank up to `k` routes on a street network
///
/// # Arguments
/// * `network` - Map with blocked streets and crossing times
/// * `start`, `goal` - Endpoints, both inside the grid
/// * `k` - Maximum number of routes
/// * `criterion` - Whether routes are ranked by distance or by time
///
/// An unreachable goal gives an empty list, not an error.
pub fn find_routes(
    network: &StreetNetwork,
    start: Coord,
    goal: Coord,
    k: usize,
    criterion: Criterion,
) -> Result<Vec<Route>> {
    find_routes_with_progress(network, start, goal, k, criterion, |_, _| {})
}

/// Rank routes with progress tracking
///
/// `progress(found, k)` is called every time another route is confirmed.
pub fn find_routes_with_progress<F>(
    network: &StreetNetwork,
    start: Coord,
    goal: Coord,
    k: usize,
    criterion: Criterion,
    progress: F,
) -> Result<Vec<Route>>
where
    F: FnMut(usize, usize),
{
    let profile = network.profile(criterion);
    k_shortest_paths_with_progress(network.grid(), start, goal, &profile, &profile, k, progress)
}

/// Best single route between two intersections, `None` when unreachable
pub fn best_route(
    network: &StreetNetwork,
    start: Coord,
    goal: Coord,
    criterion: Criterion,
) -> Result<Option<PathResult>> {
    search_path(network.grid(), start, goal, &network.profile(criterion))
}

/// Hazard zones formed by the blocked streets of a network.
///
/// Clustering runs on the doubled grid, where the midpoints of two streets
/// meeting at an intersection lie two steps apart.
pub fn hazard_zones(network: &StreetNetwork, radius: u32, min_size: usize) -> Vec<HazardZone> {
    let mut midpoints: Vec<Coord> = network.blocked().iter().map(Edge::midpoint).collect();
    midpoints.sort();
    cluster_hazards(&midpoints, radius, min_size)
}
