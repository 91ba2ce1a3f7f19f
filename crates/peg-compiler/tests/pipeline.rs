//! End-to-end pipeline tests: the eight concrete scenarios and the
//! universal invariants, driven entirely through [`peg_compiler::generate`]
//! / [`peg_compiler::compile`] rather than any single crate in isolation.

use peg_ast::builder as b;
use peg_ast::{Expression, MatchResult};
use peg_bytecode::Opcode;
use peg_error::{AllowedStartRules, CompileOptions, CompileStage, GrammarError, Session};
use peg_compiler::{generate, DriverOptions, GenerateOutput, OutputMode, PipelineConfig};

fn ast_options(allowed: AllowedStartRules) -> DriverOptions {
    let mut options = DriverOptions::default();
    options.output = OutputMode::Ast;
    options.compile.allowed_start_rules = allowed;
    options
}

fn compiled_ast(
    grammar: peg_ast::Grammar,
    allowed: AllowedStartRules,
) -> Result<peg_ast::Grammar, GrammarError> {
    match generate(grammar, ast_options(allowed))? {
        GenerateOutput::Ast(g) => Ok(g),
    }
}

// --- Scenario 1: undefined rule -------------------------------------------

#[test]
fn scenario_undefined_rule_fails_at_the_check_stage() {
    let (grammar, x_ref_location) = peg_tdd_support::grammars::undefined_rule();
    let err = compiled_ast(grammar, AllowedStartRules::Named(Vec::new())).unwrap_err();
    match err {
        GrammarError::Semantic { stage, message, problems, .. } => {
            assert_eq!(stage, CompileStage::Check);
            assert!(message.contains("Rule \"X\" is not defined"));
            let hit = problems
                .iter()
                .find(|p| p.message.contains("is not defined"))
                .expect("undefined-rule problem present");
            assert_eq!(hit.location.as_ref().unwrap(), &x_ref_location);
        }
        other => panic!("expected a semantic error, got {other:?}"),
    }
}

// --- Scenario 2: duplicate labels ------------------------------------------

#[test]
fn scenario_duplicate_labels_reports_one_error_with_a_note_at_the_first() {
    let (grammar, first_label_loc, second_label_loc) =
        peg_tdd_support::grammars::duplicate_labels();
    let err = compiled_ast(grammar, AllowedStartRules::Named(Vec::new())).unwrap_err();
    match err {
        GrammarError::Semantic { problems, .. } => {
            let dup = problems
                .iter()
                .find(|p| p.message.contains("already defined") && p.message.contains("head"))
                .expect("duplicate-label problem present");
            assert_eq!(dup.location.as_ref().unwrap(), &second_label_loc);
            assert_eq!(dup.notes[0].location.as_ref().unwrap(), &first_label_loc);
        }
        other => panic!("expected a semantic error, got {other:?}"),
    }
}

// --- Scenario 3: left recursion --------------------------------------------

#[test]
fn scenario_left_recursion_fails_at_the_check_stage() {
    let (grammar, name_location) = peg_tdd_support::grammars::left_recursion();
    let err = compiled_ast(grammar, AllowedStartRules::Named(Vec::new())).unwrap_err();
    match err {
        GrammarError::Semantic { stage, problems, .. } => {
            assert_eq!(stage, CompileStage::Check);
            let hit = problems
                .iter()
                .find(|p| {
                    p.message == "Possible infinite loop when parsing (left recursion: start -> start)"
                })
                .expect("left-recursion problem present");
            assert_eq!(hit.location.as_ref().unwrap(), &name_location);
        }
        other => panic!("expected a semantic error, got {other:?}"),
    }
}

// --- Scenario 4: infinite repetition ---------------------------------------

#[test]
fn scenario_infinite_repetition_fails_at_the_check_stage() {
    let (grammar, star_location) = peg_tdd_support::grammars::infinite_repetition();
    let err = compiled_ast(grammar, AllowedStartRules::Named(Vec::new())).unwrap_err();
    match err {
        GrammarError::Semantic { stage, problems, .. } => {
            assert_eq!(stage, CompileStage::Check);
            let hit = problems
                .iter()
                .find(|p| p.message.contains("infinite loop"))
                .expect("infinite-repetition problem present");
            assert_eq!(hit.location.as_ref().unwrap(), &star_location);
        }
        other => panic!("expected a semantic error, got {other:?}"),
    }
}

// --- Scenario 5: pluck inside action ----------------------------------------

#[test]
fn scenario_pluck_inside_action_fails_at_the_check_stage() {
    let (grammar, pluck_location) = peg_tdd_support::grammars::pluck_inside_action();
    let err = compiled_ast(grammar, AllowedStartRules::Named(Vec::new())).unwrap_err();
    match err {
        GrammarError::Semantic { stage, problems, .. } => {
            assert_eq!(stage, CompileStage::Check);
            let hit = problems
                .iter()
                .find(|p| p.message == "\"@\" cannot be used with an action block")
                .expect("pluck-inside-action problem present");
            assert_eq!(hit.location.as_ref().unwrap(), &pluck_location);
        }
        other => panic!("expected a semantic error, got {other:?}"),
    }
}

// --- Scenario 6: proxy-rule removal -----------------------------------------

#[test]
fn scenario_proxy_rule_survives_when_it_is_an_allowed_start_rule() {
    let grammar = peg_tdd_support::grammars::proxy_rule();
    let result =
        compiled_ast(grammar, AllowedStartRules::Named(vec!["A".to_string()])).unwrap();
    assert!(result.rules.iter().any(|r| r.name == "A"));
}

#[test]
fn scenario_proxy_rule_is_removed_when_only_its_target_is_a_start_rule() {
    let grammar = peg_tdd_support::grammars::proxy_rule();
    let result =
        compiled_ast(grammar, AllowedStartRules::Named(vec!["B".to_string()])).unwrap();
    assert!(!result.rules.iter().any(|r| r.name == "A"));
    assert!(result.rules.iter().any(|r| r.name == "B"));
    // No rule_ref anywhere in the surviving grammar still points at the
    // removed proxy.
    for rule in &result.rules {
        assert_no_dangling_reference(&rule.expression, "A");
    }
}

fn assert_no_dangling_reference(expr: &Expression, removed_name: &str) {
    if let Expression::RuleReference(r) = expr {
        assert_ne!(r.name, removed_name);
    }
    if let Some(child) = expr.single_child() {
        assert_no_dangling_reference(child, removed_name);
    }
    match expr {
        Expression::Choice(c) => {
            for alt in &c.alternatives {
                assert_no_dangling_reference(alt, removed_name);
            }
        }
        Expression::Sequence(s) => {
            for el in &s.elements {
                assert_no_dangling_reference(el, removed_name);
            }
        }
        _ => {}
    }
}

// --- Scenario 7: match inference --------------------------------------------

#[test]
fn scenario_match_inference_over_an_optional_then_a_literal() {
    let grammar = peg_tdd_support::grammars::optional_then_literal();
    let result = compiled_ast(grammar, AllowedStartRules::Named(vec!["A".to_string()])).unwrap();
    let rule = &result.rules[0];
    match &rule.expression {
        Expression::Sequence(seq) => {
            assert_eq!(seq.match_result, Some(MatchResult::Sometimes));
            assert_eq!(seq.elements[0].match_result(), Some(MatchResult::Always));
            assert_eq!(seq.elements[1].match_result(), Some(MatchResult::Sometimes));
        }
        other => panic!("expected the rule body to still be a sequence, got {other:?}"),
    }
}

// --- Scenario 8: bytecode for a single-char literal -------------------------

#[test]
fn scenario_bytecode_for_a_single_char_literal() {
    let grammar = peg_tdd_support::grammars::single_char_literal();
    let result = compiled_ast(grammar, AllowedStartRules::Named(vec!["start".to_string()]))
        .unwrap();

    assert_eq!(result.literals, vec!["a".to_string()]);
    assert_eq!(
        result.expectations,
        vec![peg_ast::ExpectedConst::Literal { value: "a".to_string(), ignore_case: false }]
    );

    let code = result.rules[0].bytecode.as_ref().unwrap();
    assert_eq!(code[0], Opcode::MatchString.code());
    assert_eq!(code[1], 0); // literal index

    let then_len = code[2] as usize;
    let else_len = code[3] as usize;
    let then_body = &code[4..4 + then_len];
    let else_body = &code[4 + then_len..4 + then_len + else_len];
    assert_eq!(then_body, &[Opcode::AcceptString.code(), 0]);
    assert_eq!(else_body, &[Opcode::Fail.code(), 0]);
    assert_eq!(code.len(), 4 + then_len + else_len);
}

// --- Universal invariants ----------------------------------------------------

#[test]
fn invariant_check_passes_are_idempotent() {
    let (grammar, _) = peg_tdd_support::grammars::undefined_rule();
    let mut first = grammar.clone();
    let mut second = grammar;
    let options = CompileOptions::default();

    let mut session_a = Session::default();
    session_a.set_stage(CompileStage::Check);
    for pass in peg_semantic_analyzer::default_check_passes() {
        let _ = pass(&mut first, &options, &mut session_a);
    }

    let mut session_b = Session::default();
    session_b.set_stage(CompileStage::Check);
    for pass in peg_semantic_analyzer::default_check_passes() {
        let _ = pass(&mut second, &options, &mut session_b);
    }

    let messages_a: Vec<&str> = session_a.problems().iter().map(|p| p.message.as_str()).collect();
    let messages_b: Vec<&str> = session_b.problems().iter().map(|p| p.message.as_str()).collect();
    assert_eq!(messages_a, messages_b);
}

#[test]
fn invariant_match_inference_is_total_after_generate() {
    let grammar = peg_tdd_support::grammars::arithmetic_expression();
    let result = compiled_ast(grammar, AllowedStartRules::Named(vec!["start".to_string()]))
        .unwrap();
    for rule in &result.rules {
        assert_every_node_has_a_match_result(&rule.expression);
    }
}

fn assert_every_node_has_a_match_result(expr: &Expression) {
    assert!(expr.match_result().is_some(), "node {expr:?} has no match result");
    if let Some(child) = expr.single_child() {
        assert_every_node_has_a_match_result(child);
    }
    match expr {
        Expression::Choice(c) => {
            for alt in &c.alternatives {
                assert_every_node_has_a_match_result(alt);
            }
        }
        Expression::Sequence(s) => {
            for el in &s.elements {
                assert_every_node_has_a_match_result(el);
            }
        }
        _ => {}
    }
}

#[test]
fn invariant_generating_bytecode_twice_yields_identical_pools() {
    let grammar = peg_tdd_support::grammars::arithmetic_expression();
    let allowed = AllowedStartRules::Named(vec!["start".to_string()]);
    let first = compiled_ast(grammar.clone(), allowed.clone()).unwrap();
    let second = compiled_ast(grammar, allowed).unwrap();

    assert_eq!(first.literals, second.literals);
    assert_eq!(first.expectations, second.expectations);
    for (a, b) in first.rules.iter().zip(second.rules.iter()) {
        assert_eq!(a.bytecode, b.bytecode);
    }
}

#[test]
fn invariant_rule_removal_never_drops_an_allowed_start_rule() {
    let grammar = peg_tdd_support::grammars::proxy_rule();
    let result =
        compiled_ast(grammar, AllowedStartRules::Named(vec!["A".to_string()])).unwrap();
    assert!(result.rules.iter().any(|r| r.name == "A"));
}

#[test]
fn invariant_no_grammar_in_this_suite_needs_more_than_six_inference_iterations() {
    let grammar = peg_tdd_support::grammars::three_rule_cycle_free_chain();
    // Would return Err(GrammarError::Internal(..)) if the fixed point failed
    // to converge within the documented iteration cap.
    let result = compiled_ast(
        grammar,
        AllowedStartRules::Named(vec!["A".to_string(), "B".to_string(), "C".to_string()]),
    );
    assert!(result.is_ok());
}

// --- Driver-level plumbing ----------------------------------------------------

#[test]
fn stage_tracing_spans_do_not_panic_with_a_subscriber_installed() {
    let _ = tracing_subscriber::fmt::try_init();
    let grammar = peg_tdd_support::grammars::single_char_literal();
    compiled_ast(grammar, AllowedStartRules::Named(vec!["start".to_string()])).unwrap();
}

#[test]
fn pipeline_config_defaults_run_every_default_pass() {
    let config = PipelineConfig::defaults();
    assert_eq!(config.check_passes.len(), 6);
    assert_eq!(config.transform_passes.len(), 2);
    assert_eq!(config.generate_passes.len(), 1);
}

#[test]
fn star_start_rules_resolve_against_the_real_grammar() {
    let grammar = peg_tdd_support::grammars::proxy_rule();
    let result = compiled_ast(grammar, AllowedStartRules::All).unwrap();
    // Every rule is an allowed start rule under `*`, so the proxy survives.
    assert!(result.rules.iter().any(|r| r.name == "A"));
}
