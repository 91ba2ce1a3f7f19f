//! Eliminates proxy rules: a rule whose entire body is a bare reference to
//! another rule (`A = B`) is redundant indirection. Every reference to a
//! proxy is rewritten to point at its target directly, and the proxy
//! itself is dropped unless it is a start rule.
//!
//! Proxies found in declaration order are processed in that same order, so
//! a chain (`A = B`, `B = C`) resolves correctly without a separate
//! fixed-point scan: by the time `B` is processed, every reference that
//! used to point at `A` already points at `B`, so rewriting `B -> C` picks
//! those up too.

use peg_ast::{Expression, Grammar, SourceLocation};
use peg_error::{CompileOptions, DiagnosticCode, GrammarError, Note, Session};

use crate::helpers::find_rule;

struct ProxyInfo {
    index: usize,
    name: String,
    target: String,
    target_name_location: SourceLocation,
}

/// Rewrites away every proxy rule and, unless it is an allowed start rule,
/// removes it from the grammar.
pub fn remove_proxy_rules(
    grammar: &mut Grammar,
    options: &CompileOptions,
    session: &mut Session,
) -> Result<(), GrammarError> {
    let proxies: Vec<ProxyInfo> = grammar
        .rules
        .iter()
        .enumerate()
        .filter_map(|(index, rule)| match &rule.expression {
            Expression::RuleReference(target_ref) => {
                let target_name_location = find_rule(grammar, &target_ref.name)
                    .map(|target| target.name_location.clone())
                    .unwrap_or_else(|| target_ref.location.clone());
                Some(ProxyInfo {
                    index,
                    name: rule.name.clone(),
                    target: target_ref.name.clone(),
                    target_name_location,
                })
            }
            _ => None,
        })
        .collect();

    let mut indices_to_remove = Vec::new();
    for proxy in &proxies {
        for rule in grammar.rules.iter_mut() {
            rewrite_rule_refs(
                &mut rule.expression,
                &proxy.name,
                &proxy.target,
                session,
                &proxy.target_name_location,
            );
        }
        if !options.allowed_start_rules.contains(grammar, &proxy.name) {
            indices_to_remove.push(proxy.index);
        }
    }

    for index in indices_to_remove.into_iter().rev() {
        grammar.rules.remove(index);
    }
    Ok(())
}

fn rewrite_rule_refs(
    expr: &mut Expression,
    from: &str,
    to: &str,
    session: &mut Session,
    target_name_location: &SourceLocation,
) {
    match expr {
        Expression::RuleReference(r) => {
            if r.name == from {
                session.info(
                    DiagnosticCode::ProxyRuleRemoved,
                    format!("Rule \"{from}\" was replaced by \"{to}\""),
                    Some(r.location.clone()),
                    vec![Note::new("target rule defined here", Some(target_name_location.clone()))],
                );
                r.name = to.to_string();
            }
        }
        Expression::Choice(c) => {
            for alt in c.alternatives.iter_mut() {
                rewrite_rule_refs(alt, from, to, session, target_name_location);
            }
        }
        Expression::Sequence(s) => {
            for el in s.elements.iter_mut() {
                rewrite_rule_refs(el, from, to, session, target_name_location);
            }
        }
        _ => {
            if let Some(child) = expr.single_child_mut() {
                rewrite_rule_refs(child, from, to, session, target_name_location);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peg_error::{AllowedStartRules, CompileStage};
    use peg_tdd_support::grammars;

    fn options_without_start_rules() -> CompileOptions {
        CompileOptions {
            allowed_start_rules: AllowedStartRules::Named(vec!["B".to_string()]),
            ..CompileOptions::default()
        }
    }

    #[test]
    fn proxy_is_removed_and_its_references_rewritten() {
        let mut grammar = grammars::proxy_rule();
        let mut session = Session::default();
        session.set_stage(CompileStage::Transform);
        remove_proxy_rules(&mut grammar, &options_without_start_rules(), &mut session).unwrap();

        assert_eq!(grammar.rules.len(), 1);
        assert_eq!(grammar.rules[0].name, "B");
        assert_eq!(session.error_count(), 0);
    }

    #[test]
    fn proxy_kept_when_it_is_an_allowed_start_rule() {
        use peg_ast::builder::*;
        let mut grammar = grammar(vec![rule("A", rule_ref("B")), rule("B", lit("x"))]);
        let options = CompileOptions {
            allowed_start_rules: AllowedStartRules::Named(vec!["A".to_string(), "B".to_string()]),
            ..CompileOptions::default()
        };
        let mut session = Session::default();
        session.set_stage(CompileStage::Transform);
        remove_proxy_rules(&mut grammar, &options, &mut session).unwrap();
        assert_eq!(grammar.rules.len(), 2);
        assert!(matches!(grammar.rules[0].expression, Expression::RuleReference(ref r) if r.name == "B"));
    }

    #[test]
    fn proxy_chain_collapses_to_the_final_target() {
        use peg_ast::builder::*;
        let mut grammar = grammar(vec![
            rule("A", rule_ref("B")),
            rule("B", rule_ref("C")),
            rule("C", lit("x")),
            rule("start", sequence(vec![rule_ref("A"), rule_ref("B")])),
        ]);
        let options = CompileOptions {
            allowed_start_rules: AllowedStartRules::Named(vec!["start".to_string()]),
            ..CompileOptions::default()
        };
        let mut session = Session::default();
        session.set_stage(CompileStage::Transform);
        remove_proxy_rules(&mut grammar, &options, &mut session).unwrap();

        assert_eq!(grammar.rules.len(), 2);
        assert_eq!(grammar.rules[0].name, "C");
        assert_eq!(grammar.rules[1].name, "start");
        let Expression::Sequence(seq) = &grammar.rules[1].expression else {
            panic!("expected sequence");
        };
        for el in &seq.elements {
            assert!(matches!(el, Expression::RuleReference(r) if r.name == "C"));
        }
    }
}
