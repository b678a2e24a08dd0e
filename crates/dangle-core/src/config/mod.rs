//! Configuration system for dangle.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod analysis_config;
pub mod dangle_config;
pub mod settings;

pub use analysis_config::AnalysisConfig;
pub use dangle_config::{CliOverrides, DangleConfig};
pub use settings::CheckSettings;
