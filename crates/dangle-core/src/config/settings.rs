//! Resolved settings handed to checks.

use rustc_hash::FxHashSet;

use crate::diagnostics::RuleId;

/// Immutable view of the configuration a check run needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckSettings {
    /// Gate for inconclusive-confidence rules. When false those rules are
    /// not evaluated at all.
    pub inconclusive: bool,
    pub suppressed: FxHashSet<RuleId>,
}

impl CheckSettings {
    pub fn new(inconclusive: bool) -> Self {
        Self {
            inconclusive,
            suppressed: FxHashSet::default(),
        }
    }

    pub fn with_suppressed(mut self, rules: impl IntoIterator<Item = RuleId>) -> Self {
        self.suppressed.extend(rules);
        self
    }

    pub fn is_suppressed(&self, rule: RuleId) -> bool {
        self.suppressed.contains(&rule)
    }
}
