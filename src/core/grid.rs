//! Grid model: intersections, streets and the bounds of a map
//!
//! Intersections are integer `(row, col)` pairs. A street connects two
//! cardinally adjacent intersections and is stored in canonical orientation
//! (smaller coordinate first) so it can be used as a set or map key.

use serde::{Deserialize, Serialize};
use std::fmt;

use butterfly_common::{Error, Result};

/// An intersection on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Manhattan (L1) distance between two intersections
    pub fn manhattan(self, other: Coord) -> u64 {
        u64::from(self.row.abs_diff(other.row)) + u64::from(self.col.abs_diff(other.col))
    }

    /// True when `other` is one cardinal step away
    pub fn is_adjacent(self, other: Coord) -> bool {
        self.manhattan(other) == 1
    }

    /// Position on the doubled grid, where street midpoints are integral too
    pub fn doubled(self) -> Coord {
        Coord::new(self.row.saturating_mul(2), self.col.saturating_mul(2))
    }
}

impl From<(i32, i32)> for Coord {
    fn from((row, col): (i32, i32)) -> Self {
        Coord::new(row, col)
    }
}

impl From<Coord> for (i32, i32) {
    fn from(c: Coord) -> Self {
        (c.row, c.col)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A street between two adjacent intersections, in canonical orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "(Coord, Coord)", into = "(Coord, Coord)")]
pub struct Edge {
    a: Coord,
    b: Coord,
}

impl Edge {
    /// Normalize an undirected pair. Adjacency is assumed, not checked.
    pub fn new(a: Coord, b: Coord) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    /// Normalize an undirected pair, rejecting non-adjacent endpoints
    pub fn try_new(a: Coord, b: Coord) -> Result<Self> {
        if !a.is_adjacent(b) {
            return Err(Error::InvalidInput(format!(
                "street {a} - {b} does not connect adjacent intersections"
            )));
        }
        Ok(Self::new(a, b))
    }

    pub fn a(&self) -> Coord {
        self.a
    }

    pub fn b(&self) -> Coord {
        self.b
    }

    /// Midpoint on the doubled grid
    pub fn midpoint(&self) -> Coord {
        Coord::new(
            self.a.row.saturating_add(self.b.row),
            self.a.col.saturating_add(self.b.col),
        )
    }
}

impl TryFrom<(Coord, Coord)> for Edge {
    type Error = Error;

    fn try_from((a, b): (Coord, Coord)) -> Result<Self> {
        Edge::try_new(a, b)
    }
}

impl From<Edge> for (Coord, Coord) {
    fn from(e: Edge) -> Self {
        (e.a, e.b)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.a, self.b)
    }
}

/// Canonical form of the street between `a` and `b`
pub fn normalize_edge(a: Coord, b: Coord) -> Edge {
    Edge::new(a, b)
}

/// Largest number of rows or columns. Keeps every doubled-grid coordinate
/// inside `i32`.
pub const MAX_GRID_DIM: u32 = (i32::MAX / 2) as u32;

/// Dimensions of a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub rows: u32,
    pub cols: u32,
}

impl GridConfig {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Reject empty grids and grids too large for `i32` coordinates
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(Error::InvalidInput(format!(
                "grid must have at least one row and one column, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.rows > MAX_GRID_DIM || self.cols > MAX_GRID_DIM {
            return Err(Error::InvalidInput(format!(
                "grid {}x{} exceeds the {MAX_GRID_DIM} limit per dimension",
                self.rows, self.cols
            )));
        }
        Ok(())
    }

    pub fn in_bounds(&self, c: Coord) -> bool {
        c.row >= 0 && c.col >= 0 && (c.row as u32) < self.rows && (c.col as u32) < self.cols
    }

    /// Bounds check that reports the offending coordinate
    pub fn check(&self, c: Coord) -> Result<()> {
        if self.in_bounds(c) {
            Ok(())
        } else {
            Err(Error::InputOutOfBounds {
                row: c.row,
                col: c.col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Cardinal neighbors inside the grid, in up, down, left, right order
    pub fn neighbors4(&self, c: Coord) -> impl Iterator<Item = Coord> + '_ {
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .map(move |(dr, dc)| Coord::new(c.row.saturating_add(dr), c.col.saturating_add(dc)))
            .filter(move |n| self.in_bounds(*n))
    }

    /// Every street of the grid exactly once, row-major
    pub fn all_edges(&self) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(self.edge_count());
        for row in 0..self.rows as i32 {
            for col in 0..self.cols as i32 {
                let u = Coord::new(row, col);
                if ((col + 1) as u32) < self.cols {
                    edges.push(Edge::new(u, Coord::new(row, col + 1)));
                }
                if ((row + 1) as u32) < self.rows {
                    edges.push(Edge::new(u, Coord::new(row + 1, col)));
                }
            }
        }
        edges
    }

    /// Number of streets, `rows*(cols-1) + cols*(rows-1)`
    pub fn edge_count(&self) -> usize {
        let (r, c) = (self.rows as usize, self.cols as usize);
        r * c.saturating_sub(1) + c * r.saturating_sub(1)
    }

    pub fn contains_edge(&self, e: &Edge) -> bool {
        self.in_bounds(e.a()) && self.in_bounds(e.b()) && e.a().is_adjacent(e.b())
    }
}
