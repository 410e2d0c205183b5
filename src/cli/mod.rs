//! CLI-specific utilities for butterfly-grid
//!
//! Argument parsing helpers and progress display, kept apart from the
//! library so the core stays free of terminal concerns.

pub mod args;
pub mod progress;

pub use args::{parse_coord, CriterionArg};
pub use progress::ProgressManager;
