//! Checks and the explicit registry that runs them.
//!
//! A check reads a fully built [`Program`] and writes findings to a sink.
//! The registry is assembled by the caller; checks run in registration order.

pub mod autovariables;
mod messages;

use dangle_core::{CheckSettings, DiagnosticSink, RuleId, Severity};
use serde::Serialize;

use crate::program::Program;
use crate::symbols::{SymbolClassifier, SymbolDatabase};
use crate::tokens::TokenList;

pub use autovariables::AutoVariablesCheck;

/// Read-only inputs of one check run.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub program: &'a Program,
    pub settings: &'a CheckSettings,
}

impl<'a> CheckContext<'a> {
    pub fn new(program: &'a Program, settings: &'a CheckSettings) -> Self {
        Self { program, settings }
    }

    pub fn tokens(&self) -> &'a TokenList {
        &self.program.tokens
    }

    pub fn symbols(&self) -> &'a SymbolDatabase {
        &self.program.symbols
    }

    pub fn classifier(&self) -> SymbolClassifier<'a> {
        SymbolClassifier::new(&self.program.symbols)
    }
}

/// Catalogue entry describing one rule a check can report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleInfo {
    pub id: RuleId,
    pub severity: Severity,
    /// Full message text, summary line first.
    pub message: String,
}

impl RuleInfo {
    pub fn summary(&self) -> &str {
        self.message.split('\n').next().unwrap_or_default()
    }
}

pub trait Check {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// Every rule this check may report, with its message.
    fn rules(&self) -> Vec<RuleInfo>;
    fn run(&self, ctx: &CheckContext<'_>, sink: &mut dyn DiagnosticSink);
}

/// Ordered list of checks.
#[derive(Default)]
pub struct CheckRegistry {
    checks: Vec<Box<dyn Check>>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the auto-variable check.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(AutoVariablesCheck::new()));
        registry
    }

    pub fn register(&mut self, check: Box<dyn Check>) {
        self.checks.push(check);
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn checks(&self) -> impl Iterator<Item = &dyn Check> {
        self.checks.iter().map(|c| c.as_ref())
    }

    /// Run every check in registration order.
    pub fn run_all(&self, ctx: &CheckContext<'_>, sink: &mut dyn DiagnosticSink) {
        for check in &self.checks {
            tracing::debug!(check = check.name(), "running check");
            check.run(ctx, sink);
        }
    }
}

impl std::fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.checks().map(|c| c.name())).finish()
    }
}
