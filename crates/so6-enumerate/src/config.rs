//! Search Configuration
//!
//! Everything a run needs travels in one explicit record handed to the
//! driver, never through ambient globals. A configuration can come from CLI flags or
//! a JSON file and is normalised before use.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./data")
}

/// Everything a run needs to know.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Enumerate products up to this T-count.
    pub target_t_count: usize,
    /// Keep full levels in memory up to this T-count; beyond it the
    /// free-multiply phase works from retained generating sets.
    pub stored_depth_max: usize,
    /// Worker threads for the per-level parallel loop.
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Optional pattern checklist to search against.
    #[serde(default)]
    pub pattern_file: Option<PathBuf>,
    /// Directory receiving the per-T-count `<k>.dat` files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl SearchConfig {
    /// Configuration with defaults for everything but the depths.
    pub fn new(target_t_count: usize, stored_depth_max: usize) -> Self {
        SearchConfig {
            target_t_count,
            stored_depth_max,
            threads: default_threads(),
            pattern_file: None,
            output_dir: default_output_dir(),
        }
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Resolve inconsistencies and reject configurations the run cannot
    /// honour.
    pub fn normalize(&mut self) -> Result<()> {
        if self.target_t_count == 0 {
            return Err(Error::Config("target T-count must be at least 1".into()));
        }
        if self.stored_depth_max == 0 || self.stored_depth_max > self.target_t_count {
            self.stored_depth_max = self.target_t_count;
        }
        if self.threads == 0 {
            self.threads = default_threads();
        }
        // Free levels past stored_depth_max + 1 draw on generating sets;
        // there are only ever `stored_depth_max` of those to build.
        if self.target_t_count > 2 * self.stored_depth_max + 1 {
            return Err(Error::Config(format!(
                "target T-count {} needs more generating sets than stored depth {} can provide \
                 (max reachable: {})",
                self.target_t_count,
                self.stored_depth_max,
                2 * self.stored_depth_max + 1
            )));
        }
        Ok(())
    }

    /// Levels computed without a stored frontier.
    pub fn free_multiply_depth(&self) -> usize {
        self.target_t_count - self.stored_depth_max
    }

    /// How many generating sets the stored phase must retain.
    pub fn num_generating_sets(&self) -> usize {
        (self.target_t_count.saturating_sub(self.stored_depth_max + 1)).min(self.stored_depth_max)
    }
}
