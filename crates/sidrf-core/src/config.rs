//! Configuration types for sidrf

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{SidrfError, SidrfResult};

/// Scheduling policy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyKind {
    /// Dominant-resource fairness blended with cumulative service time
    #[serde(rename = "SIDRF", alias = "sidrf")]
    Sidrf,
}

impl PolicyKind {
    /// Every policy name accepted on the command line
    pub const VALID_NAMES: &'static [&'static str] = &["SIDRF"];
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyKind::Sidrf => write!(f, "SIDRF"),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = SidrfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("SIDRF") {
            Ok(PolicyKind::Sidrf)
        } else {
            Err(SidrfError::Config(format!(
                "unknown scheduling policy '{}' (valid: {})",
                s,
                Self::VALID_NAMES.join(", ")
            )))
        }
    }
}

/// Simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Scheduling policy to run
    pub policy: PolicyKind,
    /// Weight of the resource share against cumulative runtime, in `[0, 1]`
    pub p: f64,
    /// Preemption trigger: waiting sum must exceed `alpha` times running sum
    pub alpha: f64,
    /// Upper bound of the preemption threshold
    pub beta: f64,
    /// Maximum simulated time advanced per scheduling step (gamma)
    pub lease_time: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::Sidrf,
            p: 0.5,
            alpha: 1.0,
            beta: 1e9,
            lease_time: 1.0,
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> SidrfResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Reject parameter combinations the engine cannot run with
    pub fn validate(&self) -> SidrfResult<()> {
        if !(0.0..=1.0).contains(&self.p) {
            return Err(SidrfError::Config(format!(
                "p must be within [0, 1], got {}",
                self.p
            )));
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(SidrfError::Config(format!(
                "alpha must be a non-negative number, got {}",
                self.alpha
            )));
        }
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(SidrfError::Config(format!(
                "beta must be a non-negative number, got {}",
                self.beta
            )));
        }
        // A zero lease never advances the clock.
        if !self.lease_time.is_finite() || self.lease_time <= 0.0 {
            return Err(SidrfError::Config(format!(
                "lease time (gamma) must be positive, got {}",
                self.lease_time
            )));
        }
        Ok(())
    }
}
