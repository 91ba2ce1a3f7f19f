//! Drives bytecode emission across a whole grammar: one fresh
//! [`EmitContext`] per rule, then writes the four interned constant pools
//! back onto the grammar.

use peg_ast::{Expression, Grammar, SourceLocation};
use peg_error::{CompileOptions, GrammarError, Session};

use crate::context::EmitContext;
use crate::emit;
use crate::pools::Pools;

/// Lowers every rule's expression tree into a flat bytecode stream and
/// populates `grammar.{literals,classes,expectations,functions}`.
///
/// Never raises a diagnostic through `session`: by the time this pass
/// runs, undefined-rule checking has already rejected anything that would
/// make emission fail. A [`crate::error::BytecodeError`] surfacing here
/// means a prior pass let something through it shouldn't have.
pub fn generate_bytecode(
    grammar: &mut Grammar,
    _options: &CompileOptions,
    _session: &mut Session,
) -> Result<(), GrammarError> {
    tracing::debug!(rule_count = grammar.rules.len(), "generating bytecode");
    let mut pools = Pools::default();

    for index in 0..grammar.rules.len() {
        let body = std::mem::replace(&mut grammar.rules[index].expression, placeholder());
        let mut cx = EmitContext::for_rule();
        let bytecode = emit::emit(&body, grammar, &mut cx, &mut pools)?;
        grammar.rules[index].expression = body;
        grammar.rules[index].bytecode = Some(bytecode);
    }

    let (literals, classes, expectations, functions) = pools.into_parts();
    grammar.literals = literals;
    grammar.classes = classes;
    grammar.expectations = expectations;
    grammar.functions = functions;
    Ok(())
}

fn placeholder() -> Expression {
    Expression::Any(peg_ast::Any { location: SourceLocation::synthetic(), match_result: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use peg_ast::builder as b;

    #[test]
    fn populates_bytecode_and_pools_for_a_simple_grammar() {
        let mut grammar = b::grammar(vec![b::rule("start", b::lit("foo"))]);
        let mut session = Session::default();
        generate_bytecode(&mut grammar, &CompileOptions::default(), &mut session).unwrap();
        assert!(grammar.rules[0].bytecode.is_some());
        assert_eq!(grammar.literals, vec!["foo".to_string()]);
    }

    #[test]
    fn resolves_rule_references_across_rules() {
        let mut grammar = b::grammar(vec![
            b::rule("start", b::rule_ref("tail")),
            b::rule("tail", b::lit("x")),
        ]);
        let mut session = Session::default();
        generate_bytecode(&mut grammar, &CompileOptions::default(), &mut session).unwrap();
        let start_code = grammar.rules[0].bytecode.as_ref().unwrap();
        assert_eq!(start_code, &vec![crate::opcode::Opcode::Rule.code(), 1]);
    }

    #[test]
    fn lowers_a_full_arithmetic_grammar_after_match_result_inference() {
        let mut grammar = peg_tdd_support::grammars::arithmetic_expression();
        let mut session = Session::default();
        let options = CompileOptions::default();
        peg_semantic_analyzer::infer_match_results(&mut grammar, &options, &mut session).unwrap();
        generate_bytecode(&mut grammar, &options, &mut session).unwrap();

        assert!(grammar.rules.iter().all(|rule| rule.bytecode.is_some()));
        assert!(!grammar.literals.is_empty());
        assert!(!grammar.functions.is_empty());
    }
}
