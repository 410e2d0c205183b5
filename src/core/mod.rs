//! Core library modules for butterfly-grid
//!
//! Grid model, the two search algorithms and the data structures they rely
//! on, plus map generation, scenario files and reporting.

pub mod astar;
pub mod avl;
pub mod generate;
pub mod grid;
pub mod network;
pub mod report;
pub mod scenario;
pub mod vptree;
pub mod yen;
pub mod zones;
