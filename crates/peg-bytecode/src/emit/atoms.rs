//! Emission for the leaf and near-leaf expression kinds: literals, classes,
//! `.`, rule references, semantic predicates, and named rules.

use peg_ast::{
    Any, CharClassDescriptor, CharacterClass, ExpectedConst, FunctionDesc, FunctionKind, Grammar,
    Literal, MatchResult, Named, PredicatePolarity, RuleReference, SemanticPredicate,
};

use super::{build_condition, CondPolarity};
use crate::context::EmitContext;
use crate::error::BytecodeError;
use crate::opcode::{op_n, Opcode};
use crate::pools::Pools;

pub(super) fn emit_literal(node: &Literal, pools: &mut Pools) -> Result<Vec<u32>, BytecodeError> {
    let match_result = match_result_of_opt(node.match_result);
    if node.value.is_empty() {
        return Ok(vec![Opcode::PushEmptyString.code()]);
    }

    let need_literal = match_result == MatchResult::Sometimes
        || (match_result == MatchResult::Always && !node.ignore_case);
    let literal_idx = need_literal.then(|| pools.intern_literal(&node.value));

    let expectation_idx = (match_result != MatchResult::Always).then(|| {
        pools.intern_expectation(ExpectedConst::Literal {
            value: node.value.clone(),
            ignore_case: node.ignore_case,
        })
    });

    let match_opcode = if node.ignore_case { Opcode::MatchStringIc } else { Opcode::MatchString };
    let mut cond = vec![match_opcode.code()];
    // literal_idx is always populated here: Sometimes always needs it, and
    // an Always case-sensitive match needs it for ACCEPT_STRING below; only
    // an Always ignore_case match has no use for the interned string, and
    // that path never reaches this branch (it takes the early `Always` arm
    // of `build_condition` via `success_code` below, not `cond`).
    if let Some(idx) = literal_idx {
        cond.push(idx);
    }

    let success_code = if node.ignore_case {
        // MATCH_STRING_IC only tests equality; the matched text is the
        // original input slice, accepted by length.
        vec![Opcode::AcceptN.code(), node.value.chars().count() as u32]
    } else {
        let idx = literal_idx.ok_or_else(|| {
            BytecodeError::Internal(
                "case-sensitive literal match has no interned literal index".to_string(),
            )
        })?;
        vec![Opcode::AcceptString.code(), idx]
    };
    let failure_code = match expectation_idx {
        Some(idx) => vec![Opcode::Fail.code(), idx],
        None => vec![Opcode::Fail.code()],
    };

    Ok(build_condition(
        match_result,
        cond,
        CondPolarity::TrueMeansSuccess,
        success_code,
        failure_code,
    ))
}

pub(super) fn emit_class(
    node: &CharacterClass,
    pools: &mut Pools,
) -> Result<Vec<u32>, BytecodeError> {
    let match_result = match_result_of_opt(node.match_result);
    let class_idx = pools.intern_class(CharClassDescriptor {
        parts: node.parts.clone(),
        inverted: node.inverted,
        ignore_case: node.ignore_case,
    });
    let expectation_idx = (match_result != MatchResult::Always).then(|| {
        pools.intern_expectation(ExpectedConst::Class {
            parts: node.parts.clone(),
            inverted: node.inverted,
            ignore_case: node.ignore_case,
        })
    });

    let cond = vec![Opcode::MatchCharClass.code(), class_idx];
    let success_code = vec![Opcode::AcceptN.code(), 1];
    let failure_code = match expectation_idx {
        Some(idx) => vec![Opcode::Fail.code(), idx],
        None => vec![Opcode::Fail.code()],
    };
    Ok(build_condition(
        match_result,
        cond,
        CondPolarity::TrueMeansSuccess,
        success_code,
        failure_code,
    ))
}

pub(super) fn emit_any(node: &Any, pools: &mut Pools) -> Result<Vec<u32>, BytecodeError> {
    let match_result = match_result_of_opt(node.match_result);
    let expectation_idx =
        (match_result != MatchResult::Always).then(|| pools.intern_expectation(ExpectedConst::Any));

    let cond = vec![Opcode::MatchAny.code()];
    let success_code = vec![Opcode::AcceptN.code(), 1];
    let failure_code = match expectation_idx {
        Some(idx) => vec![Opcode::Fail.code(), idx],
        None => vec![Opcode::Fail.code()],
    };
    Ok(build_condition(
        match_result,
        cond,
        CondPolarity::TrueMeansSuccess,
        success_code,
        failure_code,
    ))
}

pub(super) fn emit_rule_reference(
    node: &RuleReference,
    grammar: &Grammar,
) -> Result<Vec<u32>, BytecodeError> {
    let idx = grammar
        .rules
        .iter()
        .position(|rule| rule.name == node.name)
        .ok_or_else(|| BytecodeError::UnknownRule(node.name.clone()))?;
    Ok(vec![Opcode::Rule.code(), idx as u32])
}

pub(super) fn emit_semantic_predicate(
    node: &SemanticPredicate,
    cx: &mut EmitContext,
    pools: &mut Pools,
) -> Result<Vec<u32>, BytecodeError> {
    let fn_idx = pools.intern_function(FunctionDesc {
        kind: FunctionKind::Predicate,
        params: cx.call_params(),
        body: node.code.clone(),
        location: node.code_location.clone(),
    });

    let mut out = vec![Opcode::UpdateSavedPos.code()];
    let offsets = cx.call_offsets();
    op_n(&mut out, Opcode::Call, &[fn_idx, 0, offsets.len() as u32]);
    out.extend(offsets.into_iter().map(|o| o as u32));

    // CALL leaves the predicate's raw truthy/falsy result on the stack; a
    // predicate's own match result is always Sometimes (the inference pass
    // never narrows it), so the branch is always emitted.
    let (success_code, failure_code) = (
        vec![Opcode::PushUndefined.code()],
        vec![Opcode::PushFailed.code()],
    );
    let polarity = match node.polarity {
        PredicatePolarity::Positive => CondPolarity::TrueMeansSuccess,
        PredicatePolarity::Negative => CondPolarity::TrueMeansFailure,
    };
    out.extend(build_condition(
        MatchResult::Sometimes,
        vec![Opcode::If.code()],
        polarity,
        success_code,
        failure_code,
    ));
    Ok(out)
}

pub(super) fn emit_named(
    node: &Named,
    grammar: &Grammar,
    cx: &mut EmitContext,
    pools: &mut Pools,
) -> Result<Vec<u32>, BytecodeError> {
    let match_result = match_result_of_opt(node.match_result);
    if match_result == MatchResult::Always {
        return super::emit(&node.expression, grammar, cx, pools);
    }

    let mut out = vec![Opcode::SilentFailsOn.code()];
    out.extend(super::emit(&node.expression, grammar, cx, pools)?);
    out.push(Opcode::SilentFailsOff.code());

    let expectation_idx = pools.intern_expectation(ExpectedConst::Rule { name: node.name.clone() });
    out.extend(build_condition(
        match_result,
        vec![Opcode::IfError.code()],
        CondPolarity::TrueMeansFailure,
        Vec::new(),
        vec![Opcode::Pop.code(), Opcode::Fail.code(), expectation_idx],
    ));
    Ok(out)
}

fn match_result_of_opt(result: Option<MatchResult>) -> MatchResult {
    result.unwrap_or(MatchResult::Sometimes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use peg_ast::builder as b;

    fn literal_node(value: &str, ignore_case: bool, match_result: MatchResult) -> Literal {
        let mut expr = if ignore_case { b::ilit(value) } else { b::lit(value) };
        expr.set_match_result(match_result);
        match expr {
            peg_ast::Expression::Literal(l) => l,
            _ => unreachable!(),
        }
    }

    #[test]
    fn empty_literal_short_circuits() {
        let mut pools = Pools::default();
        let node = literal_node("", false, MatchResult::Always);
        let code = emit_literal(&node, &mut pools).unwrap();
        assert_eq!(code, vec![Opcode::PushEmptyString.code()]);
    }

    #[test]
    fn always_matching_case_sensitive_literal_has_no_branch() {
        let mut pools = Pools::default();
        let node = literal_node("foo", false, MatchResult::Always);
        let code = emit_literal(&node, &mut pools).unwrap();
        assert_eq!(code, vec![Opcode::AcceptString.code(), 0]);
    }

    #[test]
    fn sometimes_literal_emits_match_and_branch() {
        let mut pools = Pools::default();
        let node = literal_node("foo", false, MatchResult::Sometimes);
        let code = emit_literal(&node, &mut pools).unwrap();
        assert_eq!(code[0], Opcode::MatchString.code());
        assert_eq!(code[1], 0); // literal index
    }

    #[test]
    fn any_node_skips_expectation_when_always() {
        let mut pools = Pools::default();
        let node = Any { location: peg_position::SourceLocation::synthetic(), match_result: Some(MatchResult::Always) };
        let code = emit_any(&node, &mut pools).unwrap();
        assert_eq!(code, vec![Opcode::AcceptN.code(), 1]);
    }
}
