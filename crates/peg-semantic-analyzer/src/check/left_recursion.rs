//! Flags left recursion: a rule that can call itself again before
//! consuming any input, directly or through a chain of other rules.
//!
//! Unlike the other checks this one is not expressed through the generic
//! visitor — the traversal rule is specific enough ("only the leftmost
//! position of a sequence, stop at the first element guaranteed to
//! consume") that a dedicated recursive walk reads more plainly than a
//! general-purpose dispatch would.

use peg_ast::{Expression, Grammar, PrefixedOperator, SourceLocation, SuffixedOperator};
use peg_error::{CompileOptions, DiagnosticCode, GrammarError, Note, Session};

use crate::helpers::{always_consumes_on_success, find_rule};

/// Reports every rule reachable from its own leftmost position without
/// first consuming input.
pub fn check_left_recursion(
    grammar: &mut Grammar,
    _options: &CompileOptions,
    session: &mut Session,
) -> Result<(), GrammarError> {
    for rule in &grammar.rules {
        let mut stack = vec![(rule.name.clone(), rule.name_location.clone())];
        walk(grammar, &rule.expression, &mut stack, session);
    }
    Ok(())
}

fn walk(
    grammar: &Grammar,
    expr: &Expression,
    stack: &mut Vec<(String, SourceLocation)>,
    session: &mut Session,
) {
    match expr {
        Expression::RuleReference(r) => {
            if let Some(pos) = stack.iter().position(|(name, _)| name == &r.name) {
                let cycle = &stack[pos..];
                let target_location = find_rule(grammar, &cycle[0].0)
                    .map(|target| target.name_location.clone())
                    .unwrap_or_else(|| cycle[0].1.clone());

                let mut notes: Vec<Note> = cycle
                    .iter()
                    .enumerate()
                    .map(|(i, (name, loc))| {
                        let location = if i == 0 { target_location.clone() } else { loc.clone() };
                        Note::new(
                            format!(
                                "Step {}: call of the rule \"{name}\" without input consumption",
                                i + 1
                            ),
                            Some(location),
                        )
                    })
                    .collect();
                notes.push(Note::new(
                    "call itself without input consumption - left recursion",
                    Some(r.location.clone()),
                ));

                let mut chain: Vec<&str> = cycle.iter().map(|(name, _)| name.as_str()).collect();
                chain.push(cycle[0].0.as_str());
                let message = format!(
                    "Possible infinite loop when parsing (left recursion: {})",
                    chain.join(" -> ")
                );

                session.error(
                    DiagnosticCode::InfiniteLeftRecursion,
                    message,
                    Some(target_location),
                    notes,
                );
                return;
            }
            let Some(target) = find_rule(grammar, &r.name) else { return };
            stack.push((r.name.clone(), r.location.clone()));
            walk(grammar, &target.expression, stack, session);
            stack.pop();
        }
        Expression::Choice(c) => {
            for alt in &c.alternatives {
                walk(grammar, alt, stack, session);
            }
        }
        Expression::Sequence(s) => {
            for el in &s.elements {
                walk(grammar, el, stack, session);
                if always_consumes_on_success(grammar, el) {
                    break;
                }
            }
        }
        Expression::Named(n) => walk(grammar, &n.expression, stack, session),
        Expression::Action(a) => walk(grammar, &a.expression, stack, session),
        Expression::Labeled(l) => walk(grammar, &l.expression, stack, session),
        Expression::Group(g) => walk(grammar, &g.expression, stack, session),
        Expression::Prefixed(p) => match p.operator {
            PrefixedOperator::Text | PrefixedOperator::SimpleAnd | PrefixedOperator::SimpleNot => {
                walk(grammar, &p.expression, stack, session);
            }
        },
        Expression::Suffixed(s) => match s.operator {
            SuffixedOperator::Optional | SuffixedOperator::ZeroOrMore | SuffixedOperator::OneOrMore => {
                walk(grammar, &s.expression, stack, session);
            }
        },
        Expression::Literal(_)
        | Expression::CharacterClass(_)
        | Expression::Any(_)
        | Expression::SemanticPredicate(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peg_error::CompileStage;
    use peg_tdd_support::grammars;

    #[test]
    fn reports_self_reference_through_an_optional_prefix() {
        let (mut grammar, _name_location) = grammars::left_recursion();
        let mut session = Session::default();
        session.set_stage(CompileStage::Check);
        check_left_recursion(&mut grammar, &CompileOptions::default(), &mut session).unwrap();
        assert_eq!(session.error_count(), 1);
    }

    #[test]
    fn reports_the_exact_message_location_and_notes_from_the_spec() {
        use peg_ast::builder::span;

        let (mut grammar, name_location) = grammars::left_recursion();
        let self_ref_location = span(10, 15);
        let mut session = Session::default();
        session.set_stage(CompileStage::Check);
        check_left_recursion(&mut grammar, &CompileOptions::default(), &mut session).unwrap();

        let problem = &session.problems()[0];
        assert_eq!(
            problem.message,
            "Possible infinite loop when parsing (left recursion: start -> start)"
        );
        assert_eq!(problem.location.as_ref().unwrap(), &name_location);

        assert_eq!(problem.notes.len(), 2);
        assert_eq!(
            problem.notes[0].message,
            "Step 1: call of the rule \"start\" without input consumption"
        );
        assert_eq!(problem.notes[0].location.as_ref().unwrap(), &name_location);
        assert_eq!(
            problem.notes[1].message,
            "call itself without input consumption - left recursion"
        );
        assert_eq!(problem.notes[1].location.as_ref().unwrap(), &self_ref_location);
    }

    #[test]
    fn reference_after_a_consuming_literal_is_fine() {
        use peg_ast::builder::*;
        let mut grammar =
            grammar(vec![rule("start", sequence(vec![lit("a"), rule_ref("start")]))]);
        let mut session = Session::default();
        session.set_stage(CompileStage::Check);
        check_left_recursion(&mut grammar, &CompileOptions::default(), &mut session).unwrap();
        assert_eq!(session.error_count(), 0);
    }

    #[test]
    fn indirect_cycle_through_another_rule_is_reported() {
        use peg_ast::builder::*;
        let mut grammar = grammar(vec![
            rule("A", rule_ref("B")),
            rule("B", rule_ref("A")),
        ]);
        let mut session = Session::default();
        session.set_stage(CompileStage::Check);
        check_left_recursion(&mut grammar, &CompileOptions::default(), &mut session).unwrap();
        assert_eq!(session.error_count(), 2);
    }
}
