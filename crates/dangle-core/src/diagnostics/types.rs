//! Diagnostic value types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::RuleId;

/// Severity of a finding. Every escape finding is an error: the program
/// has undefined behaviour once the dangling address is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
        }
    }
}

/// How sure the check is about a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Definite,
    /// Only emitted when inconclusive findings are enabled.
    Inconclusive,
}

/// Source position of the token a finding is anchored at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// A single finding.
///
/// `message` holds the summary line, then a newline, then the detailed
/// explanation when the rule has one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub location: Location,
    pub severity: Severity,
    pub rule_id: RuleId,
    pub message: String,
    pub confidence: Confidence,
}

impl Diagnostic {
    /// First line of the message.
    pub fn summary(&self) -> &str {
        self.message.split('\n').next().unwrap_or_default()
    }

    /// Detailed explanation, or the summary when the rule has none.
    pub fn verbose(&self) -> &str {
        match self.message.split_once('\n') {
            Some((_, detail)) => detail,
            None => &self.message,
        }
    }

    pub fn is_inconclusive(&self) -> bool {
        self.confidence == Confidence::Inconclusive
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}]: ({}) {}",
            self.location.file,
            self.location.line,
            self.severity.as_str(),
            self.summary()
        )?;
        if self.is_inconclusive() {
            f.write_str(" (inconclusive)")?;
        }
        Ok(())
    }
}
