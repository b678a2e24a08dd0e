//! The fixed set of rule ids reported by the auto-variable check.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Rule id carried by every diagnostic.
///
/// The serialized form is the camelCase id (`autoVariables`,
/// `returnTempPointer`, ...), which is also what `Display` prints and what
/// configuration suppressions refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleId {
    AutoVariables,
    ReturnAddressOfAutoVariable,
    ReturnAddressOfFunctionParameter,
    AutovarInvalidDeallocation,
    ReturnLocalVariable,
    ReturnReference,
    ReturnTempReference,
    ReturnTempPointer,
}

impl RuleId {
    pub fn all() -> &'static [RuleId] {
        &[
            Self::AutoVariables,
            Self::ReturnAddressOfAutoVariable,
            Self::ReturnAddressOfFunctionParameter,
            Self::AutovarInvalidDeallocation,
            Self::ReturnLocalVariable,
            Self::ReturnReference,
            Self::ReturnTempReference,
            Self::ReturnTempPointer,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoVariables => "autoVariables",
            Self::ReturnAddressOfAutoVariable => "returnAddressOfAutoVariable",
            Self::ReturnAddressOfFunctionParameter => "returnAddressOfFunctionParameter",
            Self::AutovarInvalidDeallocation => "autovarInvalidDeallocation",
            Self::ReturnLocalVariable => "returnLocalVariable",
            Self::ReturnReference => "returnReference",
            Self::ReturnTempReference => "returnTempReference",
            Self::ReturnTempPointer => "returnTempPointer",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rule id '{0}'")]
pub struct UnknownRuleId(pub String);

impl FromStr for RuleId {
    type Err = UnknownRuleId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|rule| rule.as_str() == s)
            .ok_or_else(|| UnknownRuleId(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_rule_from_its_display_form() {
        for rule in RuleId::all() {
            assert_eq!(rule.to_string().parse::<RuleId>().unwrap(), *rule);
        }
    }

    #[test]
    fn serde_uses_camel_case_ids() {
        let json = serde_json::to_string(&RuleId::AutovarInvalidDeallocation).unwrap();
        assert_eq!(json, "\"autovarInvalidDeallocation\"");
    }

    #[test]
    fn rejects_unknown_ids() {
        assert!("returnSomething".parse::<RuleId>().is_err());
    }
}
