//! Emission for the structural expression kinds: the four prefix/suffix
//! wrappers, `group`, `labeled`, `choice`, `sequence`, and `action`.

use peg_ast::{
    Action, Choice, Expression, Grammar, Group, Labeled, MatchResult, Prefixed, PrefixedOperator,
    Sequence, Suffixed, SuffixedOperator,
};

use super::{build_condition, build_loop, match_result_of, CondPolarity};
use crate::context::{EmitContext, EnclosingAction};
use crate::error::BytecodeError;
use crate::opcode::Opcode;
use crate::pools::Pools;

pub(super) fn emit_prefixed(
    node: &Prefixed,
    grammar: &Grammar,
    cx: &mut EmitContext,
    pools: &mut Pools,
) -> Result<Vec<u32>, BytecodeError> {
    match node.operator {
        PrefixedOperator::Text => emit_text(node, grammar, cx, pools),
        PrefixedOperator::SimpleAnd => emit_lookahead(node, grammar, cx, pools, false),
        PrefixedOperator::SimpleNot => emit_lookahead(node, grammar, cx, pools, true),
    }
}

fn emit_text(
    node: &Prefixed,
    grammar: &Grammar,
    cx: &mut EmitContext,
    pools: &mut Pools,
) -> Result<Vec<u32>, BytecodeError> {
    let child_match_result = match_result_of(&node.expression);
    let mut out = vec![Opcode::PushCurrPos.code()];
    out.extend(super::emit(&node.expression, grammar, cx, pools)?);
    out.extend(build_condition(
        child_match_result,
        vec![Opcode::IfError.code()],
        CondPolarity::TrueMeansFailure,
        vec![Opcode::Text.code()],
        vec![Opcode::Nip.code()],
    ));
    Ok(out)
}

fn emit_lookahead(
    node: &Prefixed,
    grammar: &Grammar,
    cx: &mut EmitContext,
    pools: &mut Pools,
    negative: bool,
) -> Result<Vec<u32>, BytecodeError> {
    // The node's own match result already folds in the negation for
    // `simple_not`, so it alone decides whether the runtime test is needed.
    let own_match_result = node.match_result.unwrap_or(MatchResult::Sometimes);

    let mut out = vec![Opcode::PushCurrPos.code(), Opcode::SilentFailsOn.code()];
    out.extend(super::emit(&node.expression, grammar, cx, pools)?);
    out.push(Opcode::SilentFailsOff.code());

    // Restore position and drop the child's pushed value either way, then
    // push the sentinel appropriate to whichever branch the lookahead's own
    // success corresponds to.
    let rollback = vec![Opcode::Pop.code(), Opcode::PopCurrPos.code()];
    let (and_success, and_failure) =
        (Opcode::PushUndefined.code(), Opcode::PushFailed.code());
    let (lookahead_success_push, lookahead_failure_push) =
        if negative { (and_failure, and_success) } else { (and_success, and_failure) };

    let mut success_code = rollback.clone();
    success_code.push(lookahead_success_push);
    let mut failure_code = rollback;
    failure_code.push(lookahead_failure_push);

    // `IF_ERROR`'s true branch means the child failed; for `simple_and` a
    // child failure is the lookahead's own failure (TrueMeansFailure), for
    // `simple_not` a child failure is the lookahead's own success
    // (TrueMeansSuccess).
    let polarity =
        if negative { CondPolarity::TrueMeansSuccess } else { CondPolarity::TrueMeansFailure };
    out.extend(build_condition(
        own_match_result,
        vec![Opcode::IfError.code()],
        polarity,
        success_code,
        failure_code,
    ));
    Ok(out)
}

pub(super) fn emit_suffixed(
    node: &Suffixed,
    grammar: &Grammar,
    cx: &mut EmitContext,
    pools: &mut Pools,
) -> Result<Vec<u32>, BytecodeError> {
    match node.operator {
        SuffixedOperator::Optional => emit_optional(node, grammar, cx, pools),
        SuffixedOperator::ZeroOrMore => emit_zero_or_more(node, grammar, cx, pools),
        SuffixedOperator::OneOrMore => emit_one_or_more(node, grammar, cx, pools),
    }
}

fn emit_optional(
    node: &Suffixed,
    grammar: &Grammar,
    cx: &mut EmitContext,
    pools: &mut Pools,
) -> Result<Vec<u32>, BytecodeError> {
    let child_match_result = match_result_of(&node.expression);
    let mut out = super::emit(&node.expression, grammar, cx, pools)?;
    if child_match_result != MatchResult::Always {
        out.extend(build_condition(
            MatchResult::Sometimes,
            vec![Opcode::IfError.code()],
            CondPolarity::TrueMeansFailure,
            Vec::new(),
            vec![Opcode::Pop.code(), Opcode::PushNull.code()],
        ));
    }
    Ok(out)
}

fn emit_zero_or_more(
    node: &Suffixed,
    grammar: &Grammar,
    cx: &mut EmitContext,
    pools: &mut Pools,
) -> Result<Vec<u32>, BytecodeError> {
    let mut out = vec![Opcode::PushEmptyArray.code()];
    let first_attempt = super::emit(&node.expression, grammar, cx, pools)?;
    out.extend(first_attempt.clone());
    let mut loop_body = vec![Opcode::Append.code()];
    loop_body.extend(first_attempt);
    out.extend(build_loop(loop_body));
    out.push(Opcode::Pop.code());
    Ok(out)
}

fn emit_one_or_more(
    node: &Suffixed,
    grammar: &Grammar,
    cx: &mut EmitContext,
    pools: &mut Pools,
) -> Result<Vec<u32>, BytecodeError> {
    let child_match_result = match_result_of(&node.expression);
    let mut out = vec![Opcode::PushEmptyArray.code()];
    let first_attempt = super::emit(&node.expression, grammar, cx, pools)?;
    out.extend(first_attempt.clone());

    // The loop's own `WHILE_NOT_ERROR` condition tests the first attempt's
    // result before running its body, so no extra `APPEND` is needed ahead
    // of it — this is the identical continuation `zero_or_more` uses once
    // it knows the first attempt succeeded.
    let mut loop_body = vec![Opcode::Append.code()];
    loop_body.extend(first_attempt);
    let mut success_code = build_loop(loop_body);
    success_code.push(Opcode::Pop.code());
    let failure_code = vec![Opcode::Pop.code(), Opcode::Pop.code(), Opcode::PushFailed.code()];

    out.extend(build_condition(
        child_match_result,
        vec![Opcode::IfError.code()],
        CondPolarity::TrueMeansFailure,
        success_code,
        failure_code,
    ));
    Ok(out)
}

pub(super) fn emit_group(
    node: &Group,
    grammar: &Grammar,
    cx: &mut EmitContext,
    pools: &mut Pools,
) -> Result<Vec<u32>, BytecodeError> {
    let mut inner = cx.nested_scope();
    super::emit(&node.expression, grammar, &mut inner, pools)
}

pub(super) fn emit_labeled(
    node: &Labeled,
    grammar: &Grammar,
    cx: &mut EmitContext,
    pools: &mut Pools,
) -> Result<Vec<u32>, BytecodeError> {
    let saved_action = cx.action.take();
    let code = super::emit(&node.expression, grammar, cx, pools)?;
    cx.action = saved_action;
    if let Some(label) = &node.label {
        cx.bind(label, cx.sp);
    }
    Ok(code)
}

pub(super) fn emit_choice(
    node: &Choice,
    grammar: &Grammar,
    cx: &mut EmitContext,
    pools: &mut Pools,
) -> Result<Vec<u32>, BytecodeError> {
    // If the first alternative always matches, every later one is
    // unreachable.
    if node.alternatives[0].match_result() == Some(MatchResult::Always) {
        let mut inner = cx.nested_scope();
        return super::emit(&node.alternatives[0], grammar, &mut inner, pools);
    }

    let last_idx = node.alternatives.len() - 1;
    let mut last_scope = cx.nested_scope();
    let mut acc = super::emit(&node.alternatives[last_idx], grammar, &mut last_scope, pools)?;
    for alt in node.alternatives[..last_idx].iter().rev() {
        let mut inner = cx.nested_scope();
        let alt_code = super::emit(alt, grammar, &mut inner, pools)?;
        let mut then_code = vec![Opcode::Pop.code()];
        then_code.extend(acc);
        let mut wrapped = alt_code;
        wrapped.push(Opcode::IfError.code());
        wrapped.push(then_code.len() as u32);
        wrapped.push(0);
        wrapped.extend(then_code);
        acc = wrapped;
    }
    Ok(acc)
}

pub(super) fn emit_sequence(
    node: &Sequence,
    grammar: &Grammar,
    cx: &mut EmitContext,
    pools: &mut Pools,
) -> Result<Vec<u32>, BytecodeError> {
    let mut out = vec![Opcode::PushCurrPos.code()];
    cx.sp += 1;

    let mut pluck_offsets: Vec<i32> = Vec::new();
    out.extend(emit_sequence_elements(node, 0, 0, grammar, cx, pools, &mut pluck_offsets)?);
    Ok(out)
}

fn emit_sequence_elements(
    node: &Sequence,
    idx: usize,
    processed: i32,
    grammar: &Grammar,
    cx: &mut EmitContext,
    pools: &mut Pools,
    pluck_offsets: &mut Vec<i32>,
) -> Result<Vec<u32>, BytecodeError> {
    if idx == node.elements.len() {
        return Ok(sequence_tail(processed, cx, pools, pluck_offsets));
    }

    let element = &node.elements[idx];
    let element_code = super::emit(element, grammar, cx, pools)?;
    if let Expression::Labeled(labeled) = element {
        if labeled.pick {
            pluck_offsets.push(cx.sp);
        }
    }
    let match_result = element.match_result().unwrap_or(MatchResult::Sometimes);

    let rest =
        emit_sequence_elements(node, idx + 1, processed + 1, grammar, cx, pools, pluck_offsets)?;
    let to_discard = processed + 1;
    let rollback = {
        let mut r = if to_discard == 1 {
            vec![Opcode::Pop.code()]
        } else {
            vec![Opcode::PopN.code(), to_discard as u32]
        };
        r.push(Opcode::PopCurrPos.code());
        r.push(Opcode::PushFailed.code());
        r
    };

    let mut frag = element_code;
    frag.extend(build_condition(
        match_result,
        vec![Opcode::IfError.code()],
        CondPolarity::TrueMeansFailure,
        rest,
        rollback,
    ));
    Ok(frag)
}

fn sequence_tail(
    element_count: i32,
    cx: &EmitContext,
    pools: &mut Pools,
    pluck_offsets: &[i32],
) -> Vec<u32> {
    if !pluck_offsets.is_empty() {
        let total = element_count as u32 + 1;
        let mut out = vec![Opcode::Pluck.code(), total, pluck_offsets.len() as u32];
        out.extend(pluck_offsets.iter().map(|&sp| (cx.sp - sp) as u32));
        return out;
    }

    if let Some(action) = &cx.action {
        let func = pools.intern_function(peg_ast::FunctionDesc {
            kind: peg_ast::FunctionKind::Action,
            params: cx.call_params(),
            body: action.code.clone(),
            location: action.code_location.clone(),
        });
        let mut out = vec![Opcode::LoadSavedPos.code(), element_count as u32];
        out.push(Opcode::Call.code());
        out.push(func);
        // delta covers every element plus the saved position: the call's
        // single result replaces the whole sequence frame.
        out.push(element_count as u32 + 1);
        let offsets = cx.call_offsets();
        out.push(offsets.len() as u32);
        out.extend(offsets.into_iter().map(|o| o as u32));
        return out;
    }

    let mut out = vec![Opcode::Wrap.code(), element_count as u32];
    out.push(Opcode::Nip.code());
    out
}

pub(super) fn emit_action(
    node: &Action,
    grammar: &Grammar,
    cx: &mut EmitContext,
    pools: &mut Pools,
) -> Result<Vec<u32>, BytecodeError> {
    if let Expression::Sequence(seq) = node.expression.as_ref() {
        if !seq.elements.is_empty() {
            let saved_action = cx.action.replace(EnclosingAction {
                code: node.code.clone(),
                code_location: node.code_location.clone(),
            });
            let code = emit_sequence(seq, grammar, cx, pools)?;
            cx.action = saved_action;
            return Ok(code);
        }
    }

    // A bare (or empty-sequence) body: the action gets its own frame
    // instead of fusing into a sequence tail.
    let match_result = match_result_of(&node.expression);
    let mut out = vec![Opcode::PushCurrPos.code()];
    cx.sp += 1;
    let saved_pos_sp = cx.sp;

    let saved_action = cx.action.take();
    let child_code = super::emit(&node.expression, grammar, cx, pools)?;
    cx.action = saved_action;

    let offset = (cx.sp - saved_pos_sp) as u32;
    let func = pools.intern_function(peg_ast::FunctionDesc {
        kind: peg_ast::FunctionKind::Action,
        params: cx.call_params(),
        body: node.code.clone(),
        location: node.code_location.clone(),
    });
    let offsets = cx.call_offsets();
    let success_code = {
        let mut s = vec![Opcode::LoadSavedPos.code(), offset];
        s.push(Opcode::Call.code());
        s.push(func);
        s.push(offset); // delta: pop just the child's value
        s.push(offsets.len() as u32);
        s.extend(offsets.iter().map(|&o| o as u32));
        s.push(Opcode::Nip.code());
        s
    };
    let failure_code = vec![Opcode::Nip.code()];

    out.extend(child_code);
    out.extend(build_condition(
        match_result,
        vec![Opcode::IfError.code()],
        CondPolarity::TrueMeansFailure,
        success_code,
        failure_code,
    ));
    Ok(out)
}
