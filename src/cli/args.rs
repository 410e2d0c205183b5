//! Argument parsers for the command-line interface

use butterfly_grid::{Coord, Criterion};
use clap::ValueEnum;

/// Route ranking as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CriterionArg {
    /// Fewest streets walked
    Distance,
    /// Shortest total crossing time
    Time,
}

impl From<CriterionArg> for Criterion {
    fn from(arg: CriterionArg) -> Self {
        match arg {
            CriterionArg::Distance => Criterion::Distance,
            CriterionArg::Time => Criterion::Time,
        }
    }
}

/// Parse an intersection written as `row,col`
pub fn parse_coord(s: &str) -> Result<Coord, String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL but got '{s}'"))?;
    let row: i32 = row
        .trim()
        .parse()
        .map_err(|_| format!("invalid row '{}' in '{s}'", row.trim()))?;
    let col: i32 = col
        .trim()
        .parse()
        .map_err(|_| format!("invalid column '{}' in '{s}'", col.trim()))?;
    Ok(Coord::new(row, col))
}
