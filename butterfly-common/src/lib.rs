//! Common utilities for the butterfly-grid router

pub mod error;

pub use error::{Error, Result};
