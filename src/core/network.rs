//! Street network of one map and the routing profiles built on it
//!
//! A [`StreetNetwork`] is immutable once built and can be shared read-only
//! between requests. A [`RoutingProfile`] pairs it with the ranking
//! criterion of one request and supplies the search with blocking rules,
//! step costs, crossing times and risk scores.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::core::astar::Traversal;
use crate::core::grid::{Coord, Edge, GridConfig};
use crate::core::vptree::{Manhattan, VpTree};
use crate::core::yen::RouteMetrics;

/// Crossing time of a street missing from the table
pub const DEFAULT_CROSSING_TIME: u32 = 1;

/// What the route ranking minimises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    /// Number of streets walked
    #[default]
    Distance,
    /// Sum of crossing times
    Time,
}

impl Criterion {
    pub fn name(&self) -> &'static str {
        match self {
            Criterion::Distance => "distance",
            Criterion::Time => "time",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Blocked streets, crossing times and the hazard index of one map
pub struct StreetNetwork {
    grid: GridConfig,
    blocked: HashSet<Edge>,
    crossing_times: HashMap<Edge, u32>,
    hazards: VpTree<Coord, Manhattan>,
}

impl StreetNetwork {
    pub fn new(
        grid: GridConfig,
        blocked: HashSet<Edge>,
        crossing_times: HashMap<Edge, u32>,
    ) -> Self {
        let midpoints: Vec<Coord> = blocked.iter().map(Edge::midpoint).collect();
        let hazards = VpTree::build(midpoints, Manhattan);
        Self {
            grid,
            blocked,
            crossing_times,
            hazards,
        }
    }

    pub fn grid(&self) -> GridConfig {
        self.grid
    }

    pub fn blocked(&self) -> &HashSet<Edge> {
        &self.blocked
    }

    pub fn crossing_times(&self) -> &HashMap<Edge, u32> {
        &self.crossing_times
    }

    pub fn is_blocked(&self, a: Coord, b: Coord) -> bool {
        self.blocked.contains(&Edge::new(a, b))
    }

    pub fn crossing_time(&self, a: Coord, b: Coord) -> u32 {
        self.crossing_times
            .get(&Edge::new(a, b))
            .copied()
            .unwrap_or(DEFAULT_CROSSING_TIME)
    }

    /// Doubled-grid Manhattan distance from `c` to the closest blocked
    /// street midpoint, `None` when no street is blocked
    pub fn hazard_distance(&self, c: Coord) -> Option<u64> {
        match self.hazards.nearest(&c.doubled()) {
            (Some(_), d) => Some(d),
            (None, _) => None,
        }
    }

    /// Risk of a route: its closest approach to a blocked street.
    ///
    /// Without blocked streets every route scores `rows + cols`.
    pub fn route_risk(&self, path: &[Coord]) -> u64 {
        if self.hazards.is_empty() {
            return u64::from(self.grid.rows) + u64::from(self.grid.cols);
        }
        path.iter()
            .filter_map(|c| self.hazard_distance(*c))
            .min()
            .unwrap_or(0)
    }

    pub fn profile(&self, criterion: Criterion) -> RoutingProfile<'_> {
        RoutingProfile {
            network: self,
            criterion,
        }
    }
}

/// A network seen through one ranking criterion
#[derive(Clone, Copy)]
pub struct RoutingProfile<'a> {
    pub network: &'a StreetNetwork,
    pub criterion: Criterion,
}

impl Traversal for RoutingProfile<'_> {
    fn is_edge_blocked(&self, from: Coord, to: Coord) -> bool {
        self.network.is_blocked(from, to)
    }

    fn step_cost(&self, from: Coord, to: Coord) -> f64 {
        match self.criterion {
            Criterion::Distance => 1.0,
            Criterion::Time => f64::from(self.network.crossing_time(from, to)),
        }
    }
}

impl RouteMetrics for RoutingProfile<'_> {
    fn crossing_time(&self, from: Coord, to: Coord) -> f64 {
        f64::from(self.network.crossing_time(from, to))
    }

    fn risk(&self, path: &[Coord]) -> u64 {
        self.network.route_risk(path)
    }
}
