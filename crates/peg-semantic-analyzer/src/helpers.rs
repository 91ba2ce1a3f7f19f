//! Small AST queries shared by the check and transform passes (and reused
//! by the bytecode generator for rule lookups).

use peg_ast::{Expression, Grammar, PrefixedOperator, Rule, SuffixedOperator};

/// Finds a rule by name.
pub fn find_rule<'g>(grammar: &'g Grammar, name: &str) -> Option<&'g Rule> {
    grammar.rules.iter().find(|r| r.name == name)
}

/// Finds a rule's position in `grammar.rules`, used by the bytecode
/// generator to encode `RULE` operands as small integers instead of names.
pub fn index_of_rule(grammar: &Grammar, name: &str) -> Option<usize> {
    grammar.rules.iter().position(|r| r.name == name)
}

/// Whether `expr` is guaranteed to consume at least one character whenever
/// it succeeds. Used by the infinite-repetition check: `e*`/`e+` where `e`
/// can succeed without consuming would otherwise loop forever at parse
/// time.
///
/// Follows `RuleReference`s, so a cycle here would recurse forever; callers
/// only reach this after the left-recursion check has already rejected
/// cycles among rules that can succeed without consuming.
pub fn always_consumes_on_success(grammar: &Grammar, expr: &Expression) -> bool {
    match expr {
        Expression::Literal(l) => !l.value.is_empty(),
        Expression::CharacterClass(_) | Expression::Any(_) => true,
        Expression::SemanticPredicate(_) => false,
        Expression::Prefixed(p) => match p.operator {
            PrefixedOperator::SimpleAnd | PrefixedOperator::SimpleNot => false,
            PrefixedOperator::Text => always_consumes_on_success(grammar, &p.expression),
        },
        Expression::Suffixed(s) => match s.operator {
            SuffixedOperator::Optional | SuffixedOperator::ZeroOrMore => false,
            SuffixedOperator::OneOrMore => always_consumes_on_success(grammar, &s.expression),
        },
        Expression::Choice(c) => {
            c.alternatives.iter().all(|alt| always_consumes_on_success(grammar, alt))
        }
        Expression::Sequence(s) => {
            s.elements.iter().any(|el| always_consumes_on_success(grammar, el))
        }
        Expression::RuleReference(r) => find_rule(grammar, &r.name)
            .map(|rule| always_consumes_on_success(grammar, &rule.expression))
            .unwrap_or(false),
        Expression::Named(n) => always_consumes_on_success(grammar, &n.expression),
        Expression::Action(a) => always_consumes_on_success(grammar, &a.expression),
        Expression::Labeled(l) => always_consumes_on_success(grammar, &l.expression),
        Expression::Group(g) => always_consumes_on_success(grammar, &g.expression),
    }
}
