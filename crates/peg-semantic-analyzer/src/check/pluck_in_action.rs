//! Flags an unlabeled pick (`@expr`, a "pluck") nested inside an action
//! block. A pluck only makes sense when the surrounding sequence result is
//! auto-assembled; once wrapped in a user action, the action's return value
//! replaces that auto-assembly, so the pluck can never be observed.

use peg_ast::{
    Action, Any, CharacterClass, Choice, Grammar, Group, Initializer, Labeled, Literal, Prefixed,
    RuleReference, Sequence, SemanticPredicate, Suffixed, SourceLocation,
};
use peg_error::{CompileOptions, DiagnosticCode, GrammarError, Session};
use peg_visitor::{ExpressionVisitor, GrammarVisitor};

/// Location of the nearest enclosing action's code block, if any.
type Ctx = Option<SourceLocation>;

struct PluckInActionCheck<'s> {
    session: &'s mut Session,
}

impl ExpressionVisitor<Ctx> for PluckInActionCheck<'_> {
    type Output = ();

    fn visit_choice(&mut self, node: &Choice, ctx: Ctx) {
        for alt in &node.alternatives {
            self.visit_expression(alt, ctx.clone());
        }
    }

    fn visit_sequence(&mut self, node: &Sequence, ctx: Ctx) {
        for el in &node.elements {
            self.visit_expression(el, ctx.clone());
        }
    }

    fn visit_action(&mut self, node: &Action, _ctx: Ctx) {
        self.visit_expression(&node.expression, Some(node.code_location.clone()));
    }

    fn visit_labeled(&mut self, node: &Labeled, ctx: Ctx) {
        if node.pick {
            if let Some(action_location) = &ctx {
                self.session.error(
                    DiagnosticCode::PluckInsideAction,
                    "\"@\" cannot be used with an action block",
                    Some(node.location.clone()),
                    vec![peg_error::Note::new(
                        "enclosing action defined here",
                        Some(action_location.clone()),
                    )],
                );
            }
        }
        self.visit_expression(&node.expression, None);
    }

    fn visit_prefixed(&mut self, node: &Prefixed, ctx: Ctx) {
        self.visit_expression(&node.expression, ctx);
    }

    fn visit_suffixed(&mut self, node: &Suffixed, ctx: Ctx) {
        self.visit_expression(&node.expression, ctx);
    }

    fn visit_group(&mut self, node: &Group, ctx: Ctx) {
        self.visit_expression(&node.expression, ctx);
    }

    fn visit_literal(&mut self, _node: &Literal, _ctx: Ctx) {}
    fn visit_character_class(&mut self, _node: &CharacterClass, _ctx: Ctx) {}
    fn visit_any(&mut self, _node: &Any, _ctx: Ctx) {}
    fn visit_rule_reference(&mut self, _node: &RuleReference, _ctx: Ctx) {}
    fn visit_semantic_predicate(&mut self, _node: &SemanticPredicate, _ctx: Ctx) {}
}

impl GrammarVisitor<Ctx> for PluckInActionCheck<'_> {
    fn visit_initializer(&mut self, _node: &Initializer, _ctx: Ctx) {}
}

/// Reports every pluck nested inside an action block.
pub fn check_pluck_in_action(
    grammar: &mut Grammar,
    _options: &CompileOptions,
    session: &mut Session,
) -> Result<(), GrammarError> {
    let mut checker = PluckInActionCheck { session };
    for rule in &grammar.rules {
        checker.visit_rule(rule, None);
    }
    Ok(())
}
