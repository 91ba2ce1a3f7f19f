//! The recursive emitter: one function per expression kind, following the
//! emission patterns that drive the generator's design. Every function
//! leaves the current rule's simulated stack pointer advanced by exactly
//! one slot relative to its entry value — the dispatcher in [`emit`]
//! enforces that uniformly, so individual emitters are free to grow `sp`
//! however they need internally (a sequence pushes and later collapses
//! several slots) without having to restore it themselves.

mod atoms;
mod combinators;

use peg_ast::{Expression, Grammar, MatchResult};

use crate::context::EmitContext;
use crate::error::BytecodeError;
use crate::opcode::Opcode;
use crate::pools::Pools;

/// Dispatches on expression kind and restores the "exactly one net push"
/// invariant once the per-kind function returns.
pub fn emit(
    expr: &Expression,
    grammar: &Grammar,
    cx: &mut EmitContext,
    pools: &mut Pools,
) -> Result<Vec<u32>, BytecodeError> {
    let before = cx.sp;
    let code = match expr {
        Expression::Literal(n) => atoms::emit_literal(n, pools),
        Expression::CharacterClass(n) => atoms::emit_class(n, pools),
        Expression::Any(n) => atoms::emit_any(n, pools),
        Expression::RuleReference(n) => atoms::emit_rule_reference(n, grammar),
        Expression::SemanticPredicate(n) => atoms::emit_semantic_predicate(n, cx, pools),
        Expression::Named(n) => atoms::emit_named(n, grammar, cx, pools),
        Expression::Prefixed(n) => combinators::emit_prefixed(n, grammar, cx, pools),
        Expression::Suffixed(n) => combinators::emit_suffixed(n, grammar, cx, pools),
        Expression::Group(n) => combinators::emit_group(n, grammar, cx, pools),
        Expression::Labeled(n) => combinators::emit_labeled(n, grammar, cx, pools),
        Expression::Choice(n) => combinators::emit_choice(n, grammar, cx, pools),
        Expression::Sequence(n) => combinators::emit_sequence(n, grammar, cx, pools),
        Expression::Action(n) => combinators::emit_action(n, grammar, cx, pools),
    }?;
    cx.sp = before + 1;
    Ok(code)
}

/// Which side of a runtime `IF`/`IF_ERROR` test corresponds to the node's
/// own success, for nodes whose test examines an already-pushed value (a
/// lookahead's child result, a predicate's call result) rather than
/// attempting a fresh match.
pub(crate) enum CondPolarity {
    /// The condition opcode's "then" branch is taken on success.
    TrueMeansSuccess,
    /// The condition opcode's "then" branch is taken on failure.
    TrueMeansFailure,
}

/// Builds a branch: skips the runtime test entirely when `match_result` is
/// statically known (`Always` takes `success_code` unconditionally, `Never`
/// takes `failure_code`); otherwise emits `cond` followed by the two branch
/// lengths and the two bodies inline, ordered per `polarity`.
pub(crate) fn build_condition(
    match_result: MatchResult,
    cond: Vec<u32>,
    polarity: CondPolarity,
    success_code: Vec<u32>,
    failure_code: Vec<u32>,
) -> Vec<u32> {
    match match_result {
        MatchResult::Always => success_code,
        MatchResult::Never => failure_code,
        MatchResult::Sometimes => {
            let (then_code, else_code) = match polarity {
                CondPolarity::TrueMeansSuccess => (success_code, failure_code),
                CondPolarity::TrueMeansFailure => (failure_code, success_code),
            };
            let mut out = cond;
            out.push(then_code.len() as u32);
            out.push(else_code.len() as u32);
            out.extend(then_code);
            out.extend(else_code);
            out
        }
    }
}

/// Wraps `body` in a `WHILE_NOT_ERROR` loop: the body re-runs, each time
/// testing the value it just pushed, until that value is the `FAILED`
/// sentinel.
pub(crate) fn build_loop(body: Vec<u32>) -> Vec<u32> {
    let mut out = vec![Opcode::WhileNotError.code(), body.len() as u32];
    out.extend(body);
    out
}

fn effective_match_result(expr: &Expression) -> MatchResult {
    expr.match_result().unwrap_or(MatchResult::Sometimes)
}

pub(crate) use effective_match_result as match_result_of;
