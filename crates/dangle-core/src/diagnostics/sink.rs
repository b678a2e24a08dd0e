//! Append-only diagnostic sinks.

use rustc_hash::FxHashSet;

use super::{Diagnostic, RuleId};

/// Receives findings in the order checks discover them.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Ordered in-memory collection of findings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiagnosticLog {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Serialize all findings as a JSON array, preserving order.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.diagnostics)
    }
}

impl DiagnosticSink for DiagnosticLog {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

impl<'a> IntoIterator for &'a DiagnosticLog {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

/// Forwards findings to an inner sink unless their rule id is suppressed.
pub struct SuppressingSink<'a> {
    inner: &'a mut dyn DiagnosticSink,
    suppressed: FxHashSet<RuleId>,
    dropped: usize,
}

impl<'a> SuppressingSink<'a> {
    pub fn new(
        inner: &'a mut dyn DiagnosticSink,
        suppressed: impl IntoIterator<Item = RuleId>,
    ) -> Self {
        Self {
            inner,
            suppressed: suppressed.into_iter().collect(),
            dropped: 0,
        }
    }

    /// Number of findings swallowed so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl DiagnosticSink for SuppressingSink<'_> {
    fn report(&mut self, diagnostic: Diagnostic) {
        if self.suppressed.contains(&diagnostic.rule_id) {
            tracing::trace!(rule = %diagnostic.rule_id, "finding suppressed");
            self.dropped += 1;
            return;
        }
        self.inner.report(diagnostic);
    }
}
