//! dangle-core: shared foundation for the dangle analyzer.
//!
//! - Types: identifier newtypes, hash collections
//! - Diagnostics: findings, rule ids, sinks
//! - Errors: one `thiserror` enum per subsystem
//! - Config: TOML-based, layered resolution
//! - Tracing: `DANGLE_LOG`-driven subscriber setup

pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod tracing;
pub mod types;

pub use config::{CheckSettings, DangleConfig};
pub use diagnostics::{
    Confidence, Diagnostic, DiagnosticLog, DiagnosticSink, Location, RuleId, Severity,
    SuppressingSink,
};
