//! Scenario files: a map stored as JSON
//!
//! ```json
//! {
//!   "rows": 3,
//!   "cols": 3,
//!   "blocked": [[[1, 1], [1, 2]]],
//!   "crossing_times": [[[[0, 0], [0, 1]], 4]]
//! }
//! ```

use butterfly_common::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::core::grid::{Edge, GridConfig};
use crate::core::network::StreetNetwork;

/// Serializable description of one map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub rows: u32,
    pub cols: u32,
    #[serde(default)]
    pub blocked: Vec<Edge>,
    #[serde(default)]
    pub crossing_times: Vec<(Edge, u32)>,
}

impl Scenario {
    /// Build a scenario from in-memory sets, sorted so files are stable
    pub fn from_parts(
        grid: GridConfig,
        blocked: &HashSet<Edge>,
        crossing_times: &HashMap<Edge, u32>,
    ) -> Self {
        let mut blocked: Vec<Edge> = blocked.iter().copied().collect();
        blocked.sort();
        let mut crossing_times: Vec<(Edge, u32)> =
            crossing_times.iter().map(|(e, t)| (*e, *t)).collect();
        crossing_times.sort();
        Self {
            rows: grid.rows,
            cols: grid.cols,
            blocked,
            crossing_times,
        }
    }

    pub fn grid(&self) -> GridConfig {
        GridConfig::new(self.rows, self.cols)
    }

    /// Check that every street lies on the grid and every time is positive
    pub fn validate(&self) -> Result<()> {
        let grid = self.grid();
        grid.validate()?;
        if let Some(edge) = self.blocked.iter().find(|e| !grid.contains_edge(e)) {
            return Err(Error::InvalidInput(format!(
                "blocked street {edge} is outside the {}x{} grid",
                self.rows, self.cols
            )));
        }
        for (edge, secs) in &self.crossing_times {
            if !grid.contains_edge(edge) {
                return Err(Error::InvalidInput(format!(
                    "timed street {edge} is outside the {}x{} grid",
                    self.rows, self.cols
                )));
            }
            if *secs == 0 {
                return Err(Error::InvalidInput(format!(
                    "street {edge} has a zero crossing time"
                )));
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let scenario: Scenario =
            serde_json::from_str(json).map_err(|e| Error::ScenarioFormat(e.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::ScenarioFormat(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let scenario = Self::from_json(&json)?;
        debug!(
            "Loaded {}x{} scenario with {} blocked streets from {}",
            scenario.rows,
            scenario.cols,
            scenario.blocked.len(),
            path.display()
        );
        Ok(scenario)
    }

    /// Write the scenario, creating missing parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn into_network(self) -> StreetNetwork {
        let grid = self.grid();
        StreetNetwork::new(
            grid,
            self.blocked.into_iter().collect(),
            self.crossing_times.into_iter().collect(),
        )
    }
}
