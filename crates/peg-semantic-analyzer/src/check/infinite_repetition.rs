//! Flags `expr*`/`expr+` where `expr` can succeed without consuming any
//! input: such a loop never terminates at parse time.

use peg_ast::{
    Any, CharacterClass, Choice, Grammar, Literal, RuleReference, Sequence, SemanticPredicate,
    Suffixed, SuffixedOperator,
};
use peg_error::{CompileOptions, DiagnosticCode, GrammarError, Session};
use peg_visitor::{ExpressionVisitor, GrammarVisitor};

use crate::helpers::always_consumes_on_success;

struct InfiniteRepetitionCheck<'g, 's> {
    grammar: &'g Grammar,
    session: &'s mut Session,
}

impl ExpressionVisitor<()> for InfiniteRepetitionCheck<'_, '_> {
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

    fn visit_suffixed(&mut self, node: &Suffixed, _ctx: ()) {
        if matches!(node.operator, SuffixedOperator::ZeroOrMore | SuffixedOperator::OneOrMore)
            && !always_consumes_on_success(self.grammar, &node.expression)
        {
            self.session.error(
                DiagnosticCode::InfiniteRepetition,
                "Possible infinite loop when parsing (repetition used with an expression that may not consume any input)",
                Some(node.location.clone()),
                vec![],
            );
        }
        self.visit_expression(&node.expression, ());
    }

    fn visit_literal(&mut self, _node: &Literal, _ctx: ()) {}
    fn visit_character_class(&mut self, _node: &CharacterClass, _ctx: ()) {}
    fn visit_any(&mut self, _node: &Any, _ctx: ()) {}
    fn visit_rule_reference(&mut self, _node: &RuleReference, _ctx: ()) {}
    fn visit_semantic_predicate(&mut self, _node: &SemanticPredicate, _ctx: ()) {}
}

impl GrammarVisitor<()> for InfiniteRepetitionCheck<'_, '_> {
    fn visit_initializer(&mut self, _node: &peg_ast::Initializer, _ctx: ()) {}
}

/// Reports every `*`/`+` repetition whose operand can succeed without
/// consuming input.
pub fn check_infinite_repetition(
    grammar: &mut Grammar,
    _options: &CompileOptions,
    session: &mut Session,
) -> Result<(), GrammarError> {
    let grammar_ref: &Grammar = grammar;
    let mut checker = InfiniteRepetitionCheck { grammar: grammar_ref, session };
    for rule in &grammar_ref.rules {
        checker.visit_rule(rule, ());
    }
    Ok(())
}
