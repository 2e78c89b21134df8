//! Analysis configuration loaded from TOML.
//!
//! Every table and key is optional; anything left out takes its default.
//!
//! ```toml
//! [environment]
//! water_density = 999.0
//!
//! [sink]
//! lower = -8.0
//!
//! [aoa]
//! upper_deg = 15.0
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::vpp::{AoaSolveConfig, SinkSolveConfig};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub environment: Environment,
    pub sink: SinkSolveConfig,
    pub aoa: AoaSolveConfig,
}

impl AnalysisConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse analysis config.")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read analysis config {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid analysis config {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        let env = &self.environment;
        if env.gravity <= 0.0 || env.water_density <= 0.0 || env.kinematic_viscosity <= 0.0 {
            bail!("environment gravity, water density and kinematic viscosity must be positive.");
        }
        if self.sink.lower > self.sink.upper {
            bail!(
                "sink lower bound {} is above upper bound {}.",
                self.sink.lower,
                self.sink.upper
            );
        }
        if self.sink.upper >= 0.0 {
            bail!("sink upper bound must be below zero, got {}.", self.sink.upper);
        }
        if self.aoa.lower_deg > self.aoa.upper_deg {
            bail!(
                "angle-of-attack lower bound {} deg is above upper bound {} deg.",
                self.aoa.lower_deg,
                self.aoa.upper_deg
            );
        }
        if self.sink.force_scale <= 0.0 || self.aoa.force_scale <= 0.0 {
            bail!("force scales must be positive.");
        }
        Ok(())
    }
}
