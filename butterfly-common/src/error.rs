//! Error types for the butterfly-grid router
//!
//! A search that simply finds no route is not an error: `search_path` returns
//! `Ok(None)` and `k_shortest_paths` returns an empty list. The variants below
//! cover caller misuse and I/O around scenario files and exports.

use thiserror::Error;

/// Main error type for butterfly-grid operations
#[derive(Debug, Error)]
pub enum Error {
    /// Start or goal lies outside the grid
    #[error("Coordinate ({row}, {col}) is outside the {rows}x{cols} grid")]
    InputOutOfBounds {
        row: i32,
        col: i32,
        rows: u32,
        cols: u32,
    },

    /// Extraction from an empty ordered store or proximity index
    #[error("Cannot take an element from an empty {0}")]
    EmptyStructure(&'static str),

    /// Invalid configuration, parameters or scenario content
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Scenario document could not be parsed or encoded
    #[error("Scenario format error: {0}")]
    ScenarioFormat(String),

    /// Route export failed
    #[error("Export failed: {0}")]
    ExportFailed(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// True for errors caused by the caller handing in bad data rather than
    /// by the environment.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Error::InputOutOfBounds { .. } | Error::EmptyStructure(_) | Error::InvalidInput(_)
        )
    }
}

/// Convenience result type for butterfly-grid operations
pub type Result<T> = std::result::Result<T, Error>;
