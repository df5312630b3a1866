//! Configuration management for warpcheck
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence)
//! 2. Environment variables (WARPCHECK_* prefix)
//! 3. warpcheck.local.toml (gitignored, local overrides)
//! 4. warpcheck.toml (git-tracked, project config)
//! 5. ~/.config/warpcheck/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod error;
mod layer;
mod loader;

pub use error::ConfigError;
pub use layer::{ConfigLayer, existing_layers};
pub use loader::ConfigLoader;

/// Main warpcheck configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpcheckConfig {
    pub trace: TraceConfig,
    pub validator: ValidatorConfig,
    pub stats: StatsConfig,
    pub testbench: TestbenchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Simulator log read when no path is given on the command line.
    pub log_path: PathBuf,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("../verilog/sim.log"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Core count of the simulated hardware. Logs naming higher cores are
    /// still checked.
    pub cores: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self { cores: 16 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Histogram covers queue depths `0..=queue_slots`.
    pub queue_slots: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self { queue_slots: 62 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestbenchConfig {
    pub iterations: u64,
    pub capacity: usize,
    pub max_value: u64,
    pub output: PathBuf,
}

impl Default for TestbenchConfig {
    fn default() -> Self {
        Self {
            iterations: 1_000_000,
            capacity: 63,
            max_value: 255,
            output: PathBuf::from("prio_q_test_data.dat"),
        }
    }
}

impl WarpcheckConfig {
    /// Reject settings no run could use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = [
            ("validator.cores", self.validator.cores == 0),
            ("stats.queue_slots", self.stats.queue_slots == 0),
            ("testbench.capacity", self.testbench.capacity == 0),
            ("testbench.max_value", self.testbench.max_value == 0),
        ];
        match zero.iter().find(|(_, is_zero)| *is_zero) {
            Some((key, _)) => Err(ConfigError::ValidationError(format!(
                "{key} must be greater than zero"
            ))),
            None => Ok(()),
        }
    }

    /// Resolve relative paths to absolute
    pub fn resolve_paths(&mut self, base_dir: impl AsRef<Path>) {
        let base = base_dir.as_ref();

        if self.trace.log_path.is_relative() {
            self.trace.log_path = base.join(&self.trace.log_path);
        }

        if self.testbench.output.is_relative() {
            self.testbench.output = base.join(&self.testbench.output);
        }
    }

    /// Render as TOML, in the layout of `warpcheck.toml`.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
