//! Stable diagnostic codes and severity levels for the PEG grammar compiler.
//!
//! This crate provides the canonical definitions of diagnostic codes raised
//! by the check and transform stages. Codes are stable and may be referenced
//! in documentation and downstream tooling (e.g. an IDE mapping codes to
//! quick-fixes).
//!
//! # Code ranges
//!
//! | Range       | Category                         |
//! |-------------|-----------------------------------|
//! | PG001-PG099 | Check stage (semantic validation) |
//! | PG100-PG199 | Transform stage                   |
//! | PG900-PG999 | Internal invariant failures        |

use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum Severity {
    /// Stops compilation at the end of the current stage.
    Error = 1,
    /// Does not stop compilation.
    Warning = 2,
    /// Purely informational (e.g. a proxy-rule rewrite note).
    Info = 3,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Stable diagnostic codes for the grammar compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DiagnosticCode {
    /// `rule_ref` targets a rule that is not defined anywhere in the grammar.
    UndefinedRule,
    /// Two rules in the same grammar share a name.
    DuplicateRule,
    /// Two labels in the same scope share a name.
    DuplicateLabel,
    /// A `zero_or_more`/`one_or_more` operand may succeed without consuming.
    InfiniteRepetition,
    /// A rule is reachable from itself without consuming input.
    InfiniteLeftRecursion,
    /// A pluck (`@`) label appears lexically inside an action block.
    PluckInsideAction,
    /// A proxy rule (body is a single rule reference) was rewritten away.
    ProxyRuleRemoved,
}

impl DiagnosticCode {
    /// Stable string form, e.g. `"PG001"`.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::UndefinedRule => "PG001",
            DiagnosticCode::DuplicateRule => "PG002",
            DiagnosticCode::DuplicateLabel => "PG003",
            DiagnosticCode::InfiniteRepetition => "PG004",
            DiagnosticCode::InfiniteLeftRecursion => "PG005",
            DiagnosticCode::PluckInsideAction => "PG006",
            DiagnosticCode::ProxyRuleRemoved => "PG100",
        }
    }

    /// Default severity for this code.
    pub fn default_severity(self) -> Severity {
        match self {
            DiagnosticCode::ProxyRuleRemoved => Severity::Info,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_rule_is_an_error() {
        assert_eq!(DiagnosticCode::UndefinedRule.default_severity(), Severity::Error);
        assert_eq!(DiagnosticCode::UndefinedRule.as_str(), "PG001");
    }

    #[test]
    fn proxy_rule_removed_is_info() {
        assert_eq!(DiagnosticCode::ProxyRuleRemoved.default_severity(), Severity::Info);
    }
}
