//! Flags every `RuleReference` whose target rule does not exist anywhere
//! in the grammar.

use peg_ast::{Any, CharacterClass, Choice, Grammar, Initializer, Literal, RuleReference, Sequence, SemanticPredicate};
use peg_error::{CompileOptions, DiagnosticCode, GrammarError, Session};
use peg_visitor::{ExpressionVisitor, GrammarVisitor};

use crate::helpers::find_rule;

struct UndefinedRuleCheck<'g, 's> {
    grammar: &'g Grammar,
    session: &'s mut Session,
}

impl ExpressionVisitor<()> for UndefinedRuleCheck<'_, '_> {
    type Output = ();

    fn visit_choice(&mut self, node: &Choice, _ctx: ()) {
        for alt in &node.alternatives {
            self.visit_expression(alt, ());
        }
    }

    fn visit_sequence(&mut self, node: &Sequence, _ctx: ()) {
        for el in &node.elements {
            self.visit_expression(el, ());
        }
    }

    fn visit_literal(&mut self, _node: &Literal, _ctx: ()) {}
    fn visit_character_class(&mut self, _node: &CharacterClass, _ctx: ()) {}
    fn visit_any(&mut self, _node: &Any, _ctx: ()) {}
    fn visit_semantic_predicate(&mut self, _node: &SemanticPredicate, _ctx: ()) {}

    fn visit_rule_reference(&mut self, node: &RuleReference, _ctx: ()) {
        if find_rule(self.grammar, &node.name).is_none() {
            self.session.error(
                DiagnosticCode::UndefinedRule,
                format!("Rule \"{}\" is not defined", node.name),
                Some(node.location.clone()),
                vec![],
            );
        }
    }
}

impl GrammarVisitor<()> for UndefinedRuleCheck<'_, '_> {
    fn visit_initializer(&mut self, _node: &Initializer, _ctx: ()) {}
}

/// Reports every reference to a rule that is not defined in the grammar.
pub fn check_undefined_rules(
    grammar: &mut Grammar,
    _options: &CompileOptions,
    session: &mut Session,
) -> Result<(), GrammarError> {
    let grammar_ref: &Grammar = grammar;
    let mut checker = UndefinedRuleCheck { grammar: grammar_ref, session };
    checker.visit_grammar(grammar_ref, ());
    Ok(())
}
