use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Dissection strategies. Both produce a valid dissection; only `GridMarker`
/// yields the reference rect list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Row-major cursor sweep; grows each rect width-first, then height.
    GridMarker,
    /// Sweep-line over horizontal bands between hole edges; merges identical spans vertically.
    Bands,
}

impl FromStr for Strategy {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grid" | "gm" | "grid_marker" | "gridmarker" => Ok(Self::GridMarker),
            "bands" | "band" | "sweep" => Ok(Self::Bands),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DissectConfig {
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
    /// Pixels per grid step. Inputs are snapped to multiples of this value.
    #[serde(default = "default_granularity")]
    pub granularity: f64,
    /// Clip holes to the source before sweeping.
    #[serde(default = "default_clip_holes")]
    pub clip_holes: bool,
    /// Compute bands in parallel when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for DissectConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            granularity: default_granularity(),
            clip_holes: default_clip_holes(),
            parallel: false,
        }
    }
}

impl DissectConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if the granularity is not a finite positive number.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::DissectError;

        if !self.granularity.is_finite() || self.granularity <= 0.0 {
            return Err(DissectError::InvalidConfig(format!(
                "granularity must be finite and > 0 (got {})",
                self.granularity
            )));
        }
        Ok(())
    }
}

fn default_strategy() -> Strategy {
    Strategy::GridMarker
}
fn default_granularity() -> f64 {
    1.0
}
fn default_clip_holes() -> bool {
    true
}

/// Builder for `DissectConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct DissectConfigBuilder {
    cfg: DissectConfig,
}

impl DissectConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: DissectConfig::default(),
        }
    }
    pub fn strategy(mut self, v: Strategy) -> Self {
        self.cfg.strategy = v;
        self
    }
    pub fn granularity(mut self, v: f64) -> Self {
        self.cfg.granularity = v;
        self
    }
    pub fn clip_holes(mut self, v: bool) -> Self {
        self.cfg.clip_holes = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> DissectConfig {
        self.cfg
    }
}

impl DissectConfig {
    /// Create a fluent builder for `DissectConfig`.
    pub fn builder() -> DissectConfigBuilder {
        DissectConfigBuilder::new()
    }
}
