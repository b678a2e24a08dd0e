//! Top-level dangle configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{AnalysisConfig, CheckSettings};
use crate::diagnostics::RuleId;
use crate::errors::ConfigError;

/// Project config file name, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "dangle.toml";

/// Top-level configuration.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`DANGLE_*`)
/// 3. Project config (`dangle.toml` in project root)
/// 4. User config (`~/.dangle/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DangleConfig {
    pub analysis: AnalysisConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub inconclusive: Option<bool>,
    pub suppress: Vec<String>,
}

impl DangleConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        tracing::debug!(
            inconclusive = config.analysis.effective_inconclusive(),
            suppressed = config.analysis.suppress.len(),
            "configuration resolved"
        );
        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &DangleConfig) -> Result<(), ConfigError> {
        for id in &config.analysis.suppress {
            if id.parse::<RuleId>().is_err() {
                return Err(ConfigError::ValidationFailed {
                    field: "analysis.suppress".to_string(),
                    message: format!("unknown rule id '{id}'"),
                });
            }
        }
        Ok(())
    }

    /// Resolve into the settings a check run consumes.
    pub fn check_settings(&self) -> Result<CheckSettings, ConfigError> {
        let suppressed = self
            .analysis
            .suppress
            .iter()
            .map(|id| {
                id.parse::<RuleId>().map_err(|e| ConfigError::InvalidValue {
                    field: "analysis.suppress".to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CheckSettings::new(self.analysis.effective_inconclusive()).with_suppressed(suppressed))
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    /// Returns the user config path: `~/.dangle/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".dangle").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut DangleConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: DangleConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins only where it has a value.
    fn merge(base: &mut DangleConfig, other: &DangleConfig) {
        if other.analysis.inconclusive.is_some() {
            base.analysis.inconclusive = other.analysis.inconclusive;
        }
        if !other.analysis.suppress.is_empty() {
            base.analysis.suppress = other.analysis.suppress.clone();
        }
    }

    /// Apply environment variable overrides.
    /// `DANGLE_INCONCLUSIVE=true`, `DANGLE_SUPPRESS=returnTempPointer,returnReference`.
    fn apply_env_overrides(config: &mut DangleConfig) {
        if let Ok(val) = std::env::var("DANGLE_INCONCLUSIVE") {
            if let Ok(v) = val.parse::<bool>() {
                config.analysis.inconclusive = Some(v);
            }
        }
        if let Ok(val) = std::env::var("DANGLE_SUPPRESS") {
            let ids: Vec<String> = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if !ids.is_empty() {
                config.analysis.suppress = ids;
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut DangleConfig, cli: &CliOverrides) {
        if let Some(v) = cli.inconclusive {
            config.analysis.inconclusive = Some(v);
        }
        if !cli.suppress.is_empty() {
            config.analysis.suppress = cli.suppress.clone();
        }
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
