//! Configuration types for Game of Life simulation parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_ticks_per_second() -> u32 {
    60
}

fn default_true() -> bool {
    true
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Driver cadence: generations advanced per second.
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: u32,
    /// Evolve rows on the rayon pool instead of sequentially.
    #[serde(default = "default_true")]
    pub parallel_evolution: bool,
    /// Pattern scanning parameters.
    #[serde(default)]
    pub scan: ScanConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            ticks_per_second: default_ticks_per_second(),
            parallel_evolution: true,
            scan: ScanConfig::default(),
        }
    }
}

/// Pattern scanner parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Scan every generation for library patterns.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Worker count. 0 uses the available hardware parallelism.
    #[serde(default)]
    pub workers: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            workers: 0,
        }
    }
}

impl SimulationConfig {
    /// Get total grid size (width * height).
    #[inline]
    pub fn grid_size(&self) -> usize {
        self.width * self.height
    }

    /// Wall-clock budget for one tick at the configured cadence.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.ticks_per_second.max(1)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.ticks_per_second == 0 {
            return Err(ConfigError::InvalidTickRate);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid dimensions (width, height) must be non-zero")]
    InvalidDimensions,
    #[error("Tick rate must be non-zero")]
    InvalidTickRate,
}
