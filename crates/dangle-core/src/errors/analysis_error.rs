//! Top-level analysis errors.

use super::error_code::DangleErrorCode;
use super::{ConfigError, ParseError};

/// Errors surfaced by the analysis pipeline.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl DangleErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }
}
