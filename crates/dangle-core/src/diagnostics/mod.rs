//! Findings and the append-only sinks that collect them.

pub mod rule_id;
pub mod sink;
pub mod types;

pub use rule_id::RuleId;
pub use sink::{DiagnosticLog, DiagnosticSink, SuppressingSink};
pub use types::{Confidence, Diagnostic, Location, Severity};
