//! Flags a label reused within the same scope.
//!
//! Scopes nest the way the grammar's own block structure does: a rule
//! starts a fresh scope; `Choice` gives each alternative its own cloned
//! snapshot so siblings can't see each other's labels; `Action`,
//! `Prefixed`, `Suffixed`, and `Group` run their operand in a clone so
//! bindings introduced inside don't leak outward; `Sequence` elements
//! share one scope, augmented left-to-right as each `Labeled` is visited.
//!
//! The scope is modeled as a plain owned map rather than a reference-
//! counted one precisely so that `Clone` gives real copy-on-boundary
//! semantics instead of aliasing the same table.

use rustc_hash::FxHashMap;

use peg_ast::{
    Action, Any, CharacterClass, Choice, Grammar, Group, Initializer, Labeled, Literal, Prefixed,
    RuleReference, Sequence, SemanticPredicate, Suffixed, SourceLocation,
};
use peg_error::{CompileOptions, DiagnosticCode, GrammarError, Note, Session};
use peg_visitor::{ExpressionVisitor, GrammarVisitor};

type Scope = FxHashMap<String, SourceLocation>;

struct DuplicateLabelCheck<'s> {
    session: &'s mut Session,
}

impl ExpressionVisitor<Scope> for DuplicateLabelCheck<'_> {
    type Output = Scope;

    fn visit_choice(&mut self, node: &Choice, ctx: Scope) -> Scope {
        for alt in &node.alternatives {
            self.visit_expression(alt, ctx.clone());
        }
        ctx
    }

    fn visit_sequence(&mut self, node: &Sequence, ctx: Scope) -> Scope {
        let mut scope = ctx;
        for el in &node.elements {
            scope = self.visit_expression(el, scope);
        }
        scope
    }

    fn visit_labeled(&mut self, node: &Labeled, ctx: Scope) -> Scope {
        if let Some(label) = &node.label {
            if let Some(existing) = ctx.get(label) {
                self.session.error(
                    DiagnosticCode::DuplicateLabel,
                    format!("Label \"{label}\" is already defined"),
                    Some(node.label_location.clone()),
                    vec![Note::new("original definition", Some(existing.clone()))],
                );
            }
        }
        let mut scope = self.visit_expression(&node.expression, ctx);
        if let Some(label) = &node.label {
            scope.insert(label.clone(), node.label_location.clone());
        }
        scope
    }

    fn visit_action(&mut self, node: &Action, ctx: Scope) -> Scope {
        self.visit_expression(&node.expression, ctx.clone());
        ctx
    }

    fn visit_prefixed(&mut self, node: &Prefixed, ctx: Scope) -> Scope {
        self.visit_expression(&node.expression, ctx.clone());
        ctx
    }

    fn visit_suffixed(&mut self, node: &Suffixed, ctx: Scope) -> Scope {
        self.visit_expression(&node.expression, ctx.clone());
        ctx
    }

    fn visit_group(&mut self, node: &Group, ctx: Scope) -> Scope {
        self.visit_expression(&node.expression, ctx.clone());
        ctx
    }

    fn visit_literal(&mut self, _node: &Literal, ctx: Scope) -> Scope {
        ctx
    }

    fn visit_character_class(&mut self, _node: &CharacterClass, ctx: Scope) -> Scope {
        ctx
    }

    fn visit_any(&mut self, _node: &Any, ctx: Scope) -> Scope {
        ctx
    }

    fn visit_rule_reference(&mut self, _node: &RuleReference, ctx: Scope) -> Scope {
        ctx
    }

    fn visit_semantic_predicate(&mut self, _node: &SemanticPredicate, ctx: Scope) -> Scope {
        ctx
    }
}

impl GrammarVisitor<Scope> for DuplicateLabelCheck<'_> {
    fn visit_initializer(&mut self, _node: &Initializer, ctx: Scope) -> Scope {
        ctx
    }
}

/// Reports every label that collides with another label already bound in
/// the same scope.
pub fn check_duplicate_labels(
    grammar: &mut Grammar,
    _options: &CompileOptions,
    session: &mut Session,
) -> Result<(), GrammarError> {
    let mut checker = DuplicateLabelCheck { session };
    for rule in &grammar.rules {
        checker.visit_rule(rule, Scope::default());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use peg_error::CompileStage;
    use peg_tdd_support::grammars;

    #[test]
    fn reports_second_label_with_a_note_at_the_first() {
        let (mut grammar, first_label_loc, second_label_loc) = grammars::duplicate_labels();
        let mut session = Session::default();
        session.set_stage(CompileStage::Check);
        check_duplicate_labels(&mut grammar, &CompileOptions::default(), &mut session).unwrap();

        assert_eq!(session.error_count(), 1);
        let problem = &session.problems()[0];
        assert_eq!(problem.location.as_ref(), Some(&second_label_loc));
        assert_eq!(problem.notes[0].location.as_ref(), Some(&first_label_loc));
    }

    #[test]
    fn sibling_choice_alternatives_do_not_collide() {
        use peg_ast::builder::*;
        let body = choice(vec![
            labeled(Some("x"), false, lit("a")),
            labeled(Some("x"), false, lit("b")),
        ]);
        let mut grammar = grammar(vec![rule("start", body)]);
        let mut session = Session::default();
        session.set_stage(CompileStage::Check);
        check_duplicate_labels(&mut grammar, &CompileOptions::default(), &mut session).unwrap();
        assert_eq!(session.error_count(), 0);
    }

    #[test]
    fn label_inside_a_group_does_not_leak_to_the_enclosing_sequence() {
        use peg_ast::builder::*;
        let body = sequence(vec![
            group(labeled(Some("x"), false, lit("a"))),
            labeled(Some("x"), false, lit("b")),
        ]);
        let mut grammar = grammar(vec![rule("start", body)]);
        let mut session = Session::default();
        session.set_stage(CompileStage::Check);
        check_duplicate_labels(&mut grammar, &CompileOptions::default(), &mut session).unwrap();
        assert_eq!(session.error_count(), 0);
    }
}
