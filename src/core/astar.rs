//! A* search on the 4-connected grid
//!
//! The search is parameterized by a [`Traversal`]: which intersections and
//! streets are closed and what a step costs. The heuristic is the Manhattan
//! distance to the goal, which stays admissible only while every step costs
//! at least 1. That is the caller's obligation and is not checked here.
//!
//! Among equal `f = g + h` the frontier pops in insertion order, and
//! neighbors are generated up, down, left, right, so results are
//! deterministic for a given input.

use butterfly_common::Result;
use log::trace;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::core::grid::{Coord, GridConfig};

/// Blocking rules and step costs for one search
pub trait Traversal {
    /// Intersection may not be entered
    fn is_node_blocked(&self, _node: Coord) -> bool {
        false
    }

    /// Street may not be taken in the direction `from -> to`
    fn is_edge_blocked(&self, _from: Coord, _to: Coord) -> bool {
        false
    }

    /// Cost of stepping from `from` to the adjacent `to`
    fn step_cost(&self, from: Coord, to: Coord) -> f64;
}

impl<T: Traversal + ?Sized> Traversal for &T {
    fn is_node_blocked(&self, node: Coord) -> bool {
        (**self).is_node_blocked(node)
    }

    fn is_edge_blocked(&self, from: Coord, to: Coord) -> bool {
        (**self).is_edge_blocked(from, to)
    }

    fn step_cost(&self, from: Coord, to: Coord) -> f64 {
        (**self).step_cost(from, to)
    }
}

/// A base traversal with extra closed intersections and directed streets
/// layered on top. Step costs are those of the base.
pub struct Exclusions<'a, T: ?Sized> {
    base: &'a T,
    nodes: &'a HashSet<Coord>,
    edges: &'a HashSet<(Coord, Coord)>,
}

impl<'a, T: Traversal + ?Sized> Exclusions<'a, T> {
    pub fn new(
        base: &'a T,
        nodes: &'a HashSet<Coord>,
        edges: &'a HashSet<(Coord, Coord)>,
    ) -> Self {
        Self { base, nodes, edges }
    }
}

impl<T: Traversal + ?Sized> Traversal for Exclusions<'_, T> {
    fn is_node_blocked(&self, node: Coord) -> bool {
        self.base.is_node_blocked(node) || self.nodes.contains(&node)
    }

    fn is_edge_blocked(&self, from: Coord, to: Coord) -> bool {
        self.base.is_edge_blocked(from, to) || self.edges.contains(&(from, to))
    }

    fn step_cost(&self, from: Coord, to: Coord) -> f64 {
        self.base.step_cost(from, to)
    }
}

/// Lowest-cost path found by [`search_path`]
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    /// Intersections from start to goal, both inclusive
    pub path: Vec<Coord>,
    pub cost: f64,
}

impl PathResult {
    /// Number of streets walked
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

// Frontier entry. Ordered for a min-heap on (estimated_total, seq).
#[derive(Debug)]
struct FrontierEntry {
    estimated_total: f64,
    seq: u64,
    cost: f64,
    node: Coord,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other
            .estimated_total
            .total_cmp(&self.estimated_total)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn heuristic(node: Coord, goal: Coord) -> f64 {
    node.manhattan(goal) as f64
}

/// Find the lowest-cost path from `start` to `goal`.
///
/// Returns `Ok(None)` when the goal is unreachable, and
/// `Err(InputOutOfBounds)` when either endpoint lies outside the grid.
pub fn search_path<T: Traversal + ?Sized>(
    grid: GridConfig,
    start: Coord,
    goal: Coord,
    traversal: &T,
) -> Result<Option<PathResult>> {
    grid.check(start)?;
    grid.check(goal)?;

    if start == goal {
        return Ok(Some(PathResult {
            path: vec![start],
            cost: 0.0,
        }));
    }
    if traversal.is_node_blocked(start) || traversal.is_node_blocked(goal) {
        return Ok(None);
    }

    let mut open_set = BinaryHeap::new();
    let mut g_score: HashMap<Coord, f64> = HashMap::new();
    let mut came_from: HashMap<Coord, Coord> = HashMap::new();
    let mut settled: HashSet<Coord> = HashSet::new();
    let mut seq = 0u64;

    g_score.insert(start, 0.0);
    open_set.push(FrontierEntry {
        estimated_total: heuristic(start, goal),
        seq,
        cost: 0.0,
        node: start,
    });

    while let Some(current) = open_set.pop() {
        // stale entry for an already settled node
        if !settled.insert(current.node) {
            continue;
        }

        if current.node == goal {
            let mut path = vec![goal];
            let mut node = goal;
            while let Some(&prev) = came_from.get(&node) {
                path.push(prev);
                node = prev;
            }
            path.reverse();
            trace!(
                "A* {start} -> {goal}: settled {} nodes, pushed {} entries, cost {}",
                settled.len(),
                seq + 1,
                current.cost
            );
            return Ok(Some(PathResult {
                path,
                cost: current.cost,
            }));
        }

        for neighbor in grid.neighbors4(current.node) {
            if traversal.is_node_blocked(neighbor)
                || traversal.is_edge_blocked(current.node, neighbor)
            {
                continue;
            }

            let tentative = current.cost + traversal.step_cost(current.node, neighbor);
            if tentative < g_score.get(&neighbor).copied().unwrap_or(f64::INFINITY) {
                g_score.insert(neighbor, tentative);
                came_from.insert(neighbor, current.node);
                seq += 1;
                open_set.push(FrontierEntry {
                    estimated_total: tentative + heuristic(neighbor, goal),
                    seq,
                    cost: tentative,
                    node: neighbor,
                });
            }
        }
    }

    trace!(
        "A* {start} -> {goal}: frontier exhausted after settling {} nodes",
        settled.len()
    );
    Ok(None)
}
