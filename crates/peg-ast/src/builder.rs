//! Hand-construct grammars for tests without a grammar-text parser.
//!
//! This module is test scaffolding, not a stand-in for the out-of-scope
//! PEG-meta-grammar parser: every constructor here produces the same
//! [`Expression`]/[`Rule`]/[`Grammar`] values a real parser would, tagged
//! with synthetic locations so tests can still assert on spans when they
//! matter.

use crate::ast::{
    Action, Any, Choice, CharacterClass, Group, Labeled, Literal, Named, PredicatePolarity,
    Prefixed, PrefixedOperator, RuleReference, Sequence, SemanticPredicate, Suffixed,
    SuffixedOperator,
};
use crate::ast::{ClassPart, Expression, Grammar, Rule};
use peg_position::{Position, SourceLocation};

/// A synthetic single-line location spanning byte offsets `[start, end)`.
pub fn span(start: usize, end: usize) -> SourceLocation {
    SourceLocation::new(None, Position::new(1, start + 1, start), Position::new(1, end + 1, end))
}

/// A zero-width synthetic location at `offset`.
pub fn at(offset: usize) -> SourceLocation {
    span(offset, offset)
}

/// `.`
pub fn any() -> Expression {
    Expression::Any(Any { location: SourceLocation::synthetic(), match_result: None })
}

/// A case-sensitive literal.
pub fn lit(value: impl Into<String>) -> Expression {
    literal(value, false)
}

/// A case-insensitive literal.
pub fn ilit(value: impl Into<String>) -> Expression {
    literal(value, true)
}

fn literal(value: impl Into<String>, ignore_case: bool) -> Expression {
    Expression::Literal(Literal {
        value: value.into(),
        ignore_case,
        location: SourceLocation::synthetic(),
        match_result: None,
    })
}

/// A character class from explicit parts.
pub fn class(parts: Vec<ClassPart>, inverted: bool, ignore_case: bool) -> Expression {
    Expression::CharacterClass(CharacterClass {
        parts,
        inverted,
        ignore_case,
        location: SourceLocation::synthetic(),
        match_result: None,
    })
}

/// A reference to the rule named `name`.
pub fn rule_ref(name: impl Into<String>) -> Expression {
    rule_ref_at(name, SourceLocation::synthetic())
}

/// A reference to `name` at an explicit location, for tests asserting on
/// diagnostic spans.
pub fn rule_ref_at(name: impl Into<String>, location: SourceLocation) -> Expression {
    Expression::RuleReference(RuleReference { name: name.into(), location, match_result: None })
}

/// `"name" expr`
pub fn named(name: impl Into<String>, expr: Expression) -> Expression {
    Expression::Named(Named {
        name: name.into(),
        expression: Box::new(expr),
        location: SourceLocation::synthetic(),
        match_result: None,
    })
}

/// Ordered-choice of `alternatives`.
pub fn choice(alternatives: Vec<Expression>) -> Expression {
    Expression::Choice(Choice {
        alternatives,
        location: SourceLocation::synthetic(),
        match_result: None,
    })
}

/// A sequence of `elements`.
pub fn sequence(elements: Vec<Expression>) -> Expression {
    Expression::Sequence(Sequence {
        elements,
        location: SourceLocation::synthetic(),
        match_result: None,
    })
}

/// `expr { code }`
pub fn action(expr: Expression, code: impl Into<String>) -> Expression {
    Expression::Action(Action {
        expression: Box::new(expr),
        code: code.into(),
        code_location: SourceLocation::synthetic(),
        location: SourceLocation::synthetic(),
        match_result: None,
    })
}

/// `label:expr`, optionally a pluck (`@`).
pub fn labeled(label: Option<&str>, pick: bool, expr: Expression) -> Expression {
    labeled_at(label, pick, expr, SourceLocation::synthetic())
}

/// `labeled` with an explicit label location, for duplicate-label tests.
pub fn labeled_at(
    label: Option<&str>,
    pick: bool,
    expr: Expression,
    label_location: SourceLocation,
) -> Expression {
    Expression::Labeled(Labeled {
        label: label.map(str::to_string),
        label_location,
        pick,
        expression: Box::new(expr),
        location: SourceLocation::synthetic(),
        match_result: None,
    })
}

/// `$expr`
pub fn text(expr: Expression) -> Expression {
    prefixed(PrefixedOperator::Text, expr)
}

/// `&expr`
pub fn simple_and(expr: Expression) -> Expression {
    prefixed(PrefixedOperator::SimpleAnd, expr)
}

/// `!expr`
pub fn simple_not(expr: Expression) -> Expression {
    prefixed(PrefixedOperator::SimpleNot, expr)
}

fn prefixed(operator: PrefixedOperator, expr: Expression) -> Expression {
    Expression::Prefixed(Prefixed {
        operator,
        expression: Box::new(expr),
        location: SourceLocation::synthetic(),
        match_result: None,
    })
}

/// `expr?`
pub fn optional(expr: Expression) -> Expression {
    suffixed(SuffixedOperator::Optional, expr, SourceLocation::synthetic())
}

/// `expr*`
pub fn zero_or_more(expr: Expression) -> Expression {
    suffixed(SuffixedOperator::ZeroOrMore, expr, SourceLocation::synthetic())
}

/// `expr*` at an explicit location, for infinite-repetition tests.
pub fn zero_or_more_at(expr: Expression, location: SourceLocation) -> Expression {
    suffixed(SuffixedOperator::ZeroOrMore, expr, location)
}

/// `expr+`
pub fn one_or_more(expr: Expression) -> Expression {
    suffixed(SuffixedOperator::OneOrMore, expr, SourceLocation::synthetic())
}

fn suffixed(operator: SuffixedOperator, expr: Expression, location: SourceLocation) -> Expression {
    Expression::Suffixed(Suffixed { operator, expression: Box::new(expr), location, match_result: None })
}

/// `(expr)`
pub fn group(expr: Expression) -> Expression {
    Expression::Group(Group {
        expression: Box::new(expr),
        location: SourceLocation::synthetic(),
        match_result: None,
    })
}

/// `&{ code }`
pub fn semantic_and(code: impl Into<String>) -> Expression {
    semantic_predicate(PredicatePolarity::Positive, code)
}

/// `!{ code }`
pub fn semantic_not(code: impl Into<String>) -> Expression {
    semantic_predicate(PredicatePolarity::Negative, code)
}

fn semantic_predicate(polarity: PredicatePolarity, code: impl Into<String>) -> Expression {
    Expression::SemanticPredicate(SemanticPredicate {
        polarity,
        code: code.into(),
        code_location: SourceLocation::synthetic(),
        location: SourceLocation::synthetic(),
        match_result: None,
    })
}

/// A rule named `name` with body `expr`, using `name` for both the name and
/// name-span source text (tests rarely care about the distinction).
pub fn rule(name: impl Into<String>, expr: Expression) -> Rule {
    rule_at(name, expr, SourceLocation::synthetic())
}

/// `rule` with an explicit name-span, for duplicate-rule and left-recursion
/// tests.
pub fn rule_at(name: impl Into<String>, expr: Expression, name_location: SourceLocation) -> Rule {
    Rule {
        name: name.into(),
        name_location,
        expression: expr,
        location: SourceLocation::synthetic(),
        bytecode: None,
    }
}

/// A grammar with no initializers and the given rules.
pub fn grammar(rules: Vec<Rule>) -> Grammar {
    Grammar { rules, ..Grammar::default() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_computes_single_line_position() {
        let loc = span(3, 7);
        assert_eq!(loc.start.offset, 3);
        assert_eq!(loc.end.offset, 7);
        assert_eq!(loc.start.line, 1);
    }

    #[test]
    fn grammar_defaults_pools_to_empty() {
        let g = grammar(vec![rule("start", any())]);
        assert_eq!(g.rules.len(), 1);
        assert!(g.literals.is_empty());
    }
}
