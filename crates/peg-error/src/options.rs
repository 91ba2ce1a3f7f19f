//! Compile options and the pass function signature shared by every stage.

use crate::{GrammarError, Session};
use peg_ast::Grammar;
use std::sync::Arc;

/// Which rules may be used as parse entry points (`allowedStartRules`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedStartRules {
    /// The `"*"` sentinel: every rule in the grammar is a valid start rule.
    All,
    /// An explicit set of rule names.
    Named(Vec<String>),
}

impl AllowedStartRules {
    /// Whether `name` is an allowed start rule, given the grammar (needed
    /// to expand `All`).
    pub fn contains(&self, grammar: &Grammar, name: &str) -> bool {
        match self {
            AllowedStartRules::All => grammar.rules.iter().any(|r| r.name == name),
            AllowedStartRules::Named(names) => names.iter().any(|n| n == name),
        }
    }

    /// Expands to the concrete list of rule names this resolves to.
    pub fn resolve(&self, grammar: &Grammar) -> Vec<String> {
        match self {
            AllowedStartRules::All => grammar.rules.iter().map(|r| r.name.clone()).collect(),
            AllowedStartRules::Named(names) => names.clone(),
        }
    }
}

/// Options recognized by the check/transform/generate stages.
/// Driver-only concerns (`plugins`, `output`, `format`, the diagnostic
/// callbacks that build a [`Session`]) live on `peg-compiler`'s
/// `DriverOptions`, which wraps one of these.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Which rules may be used as parse entry points.
    pub allowed_start_rules: AllowedStartRules,
    /// Opaque identifier attached to every location, for error formatting.
    pub grammar_source: Option<Arc<str>>,
    /// Passed through to the (out-of-scope) emitter; no effect on analysis.
    pub cache: bool,
    /// Passed through to the (out-of-scope) emitter; no effect on analysis.
    pub trace: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            allowed_start_rules: AllowedStartRules::Named(Vec::new()),
            grammar_source: None,
            cache: false,
            trace: false,
        }
    }
}

/// The uniform shape of every check/transform/generate pass: it receives
/// the AST, the compile options, and the shared session, may mutate the AST
/// or report diagnostics, and fails only on an internal invariant violation
/// (semantic problems go through `session.error` instead of `Err`).
pub type Pass = fn(&mut Grammar, &CompileOptions, &mut Session) -> Result<(), GrammarError>;

#[cfg(test)]
mod tests {
    use super::*;
    use peg_ast::builder;

    #[test]
    fn all_resolves_to_every_rule_name() {
        let grammar = builder::grammar(vec![
            builder::rule("a", builder::any()),
            builder::rule("b", builder::any()),
        ]);
        let resolved = AllowedStartRules::All.resolve(&grammar);
        assert_eq!(resolved, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn named_contains_only_listed_rules() {
        let grammar = builder::grammar(vec![builder::rule("a", builder::any())]);
        let rules = AllowedStartRules::Named(vec!["a".to_string()]);
        assert!(rules.contains(&grammar, "a"));
        assert!(!rules.contains(&grammar, "b"));
    }
}
