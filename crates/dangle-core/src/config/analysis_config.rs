//! Analysis configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the escape checks.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Emit lower-confidence findings. Default: false.
    pub inconclusive: Option<bool>,
    /// Rule ids whose findings are dropped.
    #[serde(default)]
    pub suppress: Vec<String>,
}

impl AnalysisConfig {
    /// Returns whether inconclusive findings are enabled, defaulting to false.
    pub fn effective_inconclusive(&self) -> bool {
        self.inconclusive.unwrap_or(false)
    }
}
