//! Infers the three-valued match result (`Always`/`Sometimes`/`Never`) of
//! every expression node, bottom-up, and annotates each node in place.
//!
//! A rule's result can depend on another rule's (through `RuleReference`),
//! including cyclically through mutual, non-left recursion (already ruled
//! out for left recursion by the check stage, but two rules can still
//! reference each other inside a `Choice` or past a consuming prefix).
//! Each rule is inferred to a fixed point (its result stops changing
//! between iterations, capped at 6 — the lattice has only 3 values and at
//! most that many transitions are ever needed to settle). A rule currently
//! being inferred that is re-entered through a cycle contributes its
//! latest provisional estimate rather than recursing again.

use rustc_hash::{FxHashMap, FxHashSet};

use peg_ast::{Expression, Grammar, MatchResult, PrefixedOperator, SuffixedOperator};
use peg_error::{CompileOptions, GrammarError, Session};

use crate::helpers::index_of_rule;

const MAX_ITERATIONS: u32 = 6;

/// Runs match-result inference over every rule in the grammar.
pub fn infer_match_results(
    grammar: &mut Grammar,
    _options: &CompileOptions,
    _session: &mut Session,
) -> Result<(), GrammarError> {
    let mut current = FxHashMap::default();
    let mut in_progress = FxHashSet::default();
    let mut finalized = FxHashSet::default();

    for i in 0..grammar.rules.len() {
        let name = grammar.rules[i].name.clone();
        if !finalized.contains(&name) {
            infer_rule(grammar, &name, &mut current, &mut in_progress, &mut finalized)?;
        }
    }
    Ok(())
}

fn infer_rule(
    grammar: &mut Grammar,
    name: &str,
    current: &mut FxHashMap<String, MatchResult>,
    in_progress: &mut FxHashSet<String>,
    finalized: &mut FxHashSet<String>,
) -> Result<MatchResult, GrammarError> {
    if finalized.contains(name) || in_progress.contains(name) {
        return Ok(current.get(name).copied().unwrap_or(MatchResult::Sometimes));
    }
    let Some(index) = index_of_rule(grammar, name) else {
        return Ok(MatchResult::Sometimes);
    };

    in_progress.insert(name.to_string());
    current.insert(name.to_string(), MatchResult::Sometimes);

    let mut result = MatchResult::Sometimes;
    let mut converged = false;
    for _ in 0..MAX_ITERATIONS {
        let mut body = std::mem::replace(&mut grammar.rules[index].expression, placeholder());
        let new_result = infer_expr(grammar, &mut body, current, in_progress, finalized)?;
        grammar.rules[index].expression = body;

        let changed = new_result != result;
        result = new_result;
        current.insert(name.to_string(), result);
        if !changed {
            converged = true;
            break;
        }
    }

    in_progress.remove(name);
    if !converged {
        return Err(GrammarError::Internal(format!(
            "match-result inference for rule \"{name}\" did not converge within {MAX_ITERATIONS} iterations"
        )));
    }
    finalized.insert(name.to_string());
    Ok(result)
}

fn infer_expr(
    grammar: &mut Grammar,
    expr: &mut Expression,
    current: &mut FxHashMap<String, MatchResult>,
    in_progress: &mut FxHashSet<String>,
    finalized: &mut FxHashSet<String>,
) -> Result<MatchResult, GrammarError> {
    let result = match expr {
        Expression::Any(_) | Expression::SemanticPredicate(_) => MatchResult::Sometimes,
        Expression::Literal(l) => {
            if l.value.is_empty() {
                MatchResult::Always
            } else {
                MatchResult::Sometimes
            }
        }
        Expression::CharacterClass(c) => {
            if c.parts.is_empty() {
                MatchResult::Never
            } else {
                MatchResult::Sometimes
            }
        }
        Expression::Suffixed(s) => match s.operator {
            SuffixedOperator::Optional | SuffixedOperator::ZeroOrMore => {
                infer_expr(grammar, &mut s.expression, current, in_progress, finalized)?;
                MatchResult::Always
            }
            SuffixedOperator::OneOrMore => {
                infer_expr(grammar, &mut s.expression, current, in_progress, finalized)?
            }
        },
        Expression::Prefixed(p) => match p.operator {
            PrefixedOperator::SimpleNot => {
                infer_expr(grammar, &mut p.expression, current, in_progress, finalized)?.negate()
            }
            PrefixedOperator::Text | PrefixedOperator::SimpleAnd => {
                infer_expr(grammar, &mut p.expression, current, in_progress, finalized)?
            }
        },
        Expression::Named(n) => infer_expr(grammar, &mut n.expression, current, in_progress, finalized)?,
        Expression::Action(a) => infer_expr(grammar, &mut a.expression, current, in_progress, finalized)?,
        Expression::Labeled(l) => infer_expr(grammar, &mut l.expression, current, in_progress, finalized)?,
        Expression::Group(g) => infer_expr(grammar, &mut g.expression, current, in_progress, finalized)?,
        Expression::Choice(c) => {
            let mut results = Vec::with_capacity(c.alternatives.len());
            for alt in c.alternatives.iter_mut() {
                results.push(infer_expr(grammar, alt, current, in_progress, finalized)?);
            }
            if results.iter().all(|r| *r == MatchResult::Always) {
                MatchResult::Always
            } else if results.iter().all(|r| *r == MatchResult::Never) {
                MatchResult::Never
            } else {
                MatchResult::Sometimes
            }
        }
        Expression::Sequence(s) => {
            let mut results = Vec::with_capacity(s.elements.len());
            for el in s.elements.iter_mut() {
                results.push(infer_expr(grammar, el, current, in_progress, finalized)?);
            }
            if results.iter().any(|r| *r == MatchResult::Never) {
                MatchResult::Never
            } else if results.iter().all(|r| *r == MatchResult::Always) {
                MatchResult::Always
            } else {
                MatchResult::Sometimes
            }
        }
        Expression::RuleReference(r) => {
            let name = r.name.clone();
            infer_rule(grammar, &name, current, in_progress, finalized)?
        }
    };
    expr.set_match_result(result);
    Ok(result)
}

fn placeholder() -> Expression {
    Expression::Any(peg_ast::Any { location: peg_position::SourceLocation::synthetic(), match_result: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use peg_error::CompileStage;
    use peg_tdd_support::grammars;

    #[test]
    fn optional_then_literal_matches_every_inference_rule_once() {
        let mut grammar = grammars::optional_then_literal();
        let mut session = Session::default();
        session.set_stage(CompileStage::Transform);
        infer_match_results(&mut grammar, &CompileOptions::default(), &mut session).unwrap();

        let Expression::Sequence(seq) = &grammar.rules[0].expression else {
            panic!("expected sequence body");
        };
        assert_eq!(seq.elements[0].match_result(), Some(MatchResult::Always));
        assert_eq!(seq.elements[1].match_result(), Some(MatchResult::Sometimes));
        assert_eq!(seq.match_result(), Some(MatchResult::Sometimes));
    }

    #[test]
    fn cyclic_rule_references_converge_without_error() {
        let mut grammar = grammars::three_rule_cycle_free_chain();
        let mut session = Session::default();
        session.set_stage(CompileStage::Transform);
        let result = infer_match_results(&mut grammar, &CompileOptions::default(), &mut session);
        assert!(result.is_ok());
        for rule in &grammar.rules {
            assert!(rule.expression.match_result().is_some());
        }
    }

    #[test]
    fn simple_not_negates_the_operand_result() {
        use peg_ast::builder::*;
        let mut grammar = grammar(vec![rule("start", simple_not(lit("")))]);
        let mut session = Session::default();
        session.set_stage(CompileStage::Transform);
        infer_match_results(&mut grammar, &CompileOptions::default(), &mut session).unwrap();
        assert_eq!(grammar.rules[0].expression.match_result(), Some(MatchResult::Never));
    }
}
