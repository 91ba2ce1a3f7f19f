//! Stage sequencing: resolves start rules, runs plugin hooks, then drives
//! check → transform → generate with fail-fast between stages.

use peg_ast::Grammar;
use peg_error::{AllowedStartRules, CompileOptions, CompileStage, GrammarError, Session};

use crate::options::{DriverOptions, OutputMode};
use crate::plugin::PipelineConfig;

/// What `generate` produced.
#[derive(Debug)]
pub enum GenerateOutput {
    /// The fully-annotated AST: every rule carries bytecode, and the
    /// grammar carries its four populated constant pools.
    Ast(Grammar),
}

/// Runs the whole pipeline on an already-parsed grammar: resolves
/// `allowedStartRules`, applies every plugin, then compiles.
///
/// The PEG-meta-grammar parser is out of scope, so this takes a `Grammar`
/// rather than grammar source text — callers are expected to have already
/// parsed (or, in this core's test suites, hand-built) the AST.
pub fn generate(
    mut grammar: Grammar,
    mut options: DriverOptions,
) -> Result<GenerateOutput, GrammarError> {
    let mut config = PipelineConfig::defaults();
    for plugin in &options.plugins {
        plugin.use_plugin(&mut config, &options);
    }

    let resolved = resolve_allowed_start_rules(&grammar, &options.compile.allowed_start_rules)?;
    let mut effective_options = options.compile.clone();
    effective_options.allowed_start_rules = resolved;

    let mut session =
        Session::new(options.on_error.take(), options.on_warning.take(), options.on_info.take());
    compile(&mut grammar, &config, &effective_options, &mut session)?;

    match options.output {
        OutputMode::Ast => Ok(GenerateOutput::Ast(grammar)),
        other => Err(GrammarError::Usage(format!(
            "{other:?} output requires the out-of-scope code emitter"
        ))),
    }
}

/// Runs every stage's passes in registration order, checking for errors
/// after each stage completes.
pub fn compile(
    grammar: &mut Grammar,
    config: &PipelineConfig,
    options: &CompileOptions,
    session: &mut Session,
) -> Result<(), GrammarError> {
    run_stage(CompileStage::Check, &config.check_passes, grammar, options, session)?;
    run_stage(CompileStage::Transform, &config.transform_passes, grammar, options, session)?;
    run_stage(CompileStage::Generate, &config.generate_passes, grammar, options, session)?;
    Ok(())
}

fn run_stage(
    stage: CompileStage,
    passes: &[peg_error::Pass],
    grammar: &mut Grammar,
    options: &CompileOptions,
    session: &mut Session,
) -> Result<(), GrammarError> {
    tracing::debug!(?stage, pass_count = passes.len(), "running stage");
    session.set_stage(stage);
    for pass in passes {
        pass(grammar, options, session)?;
    }
    session.check_errors()
}

/// Expands `allowedStartRules`: an empty explicit list defaults to the
/// grammar's first rule, `*` is left for `AllowedStartRules::resolve` to
/// expand later, and every named rule must actually exist.
fn resolve_allowed_start_rules(
    grammar: &Grammar,
    requested: &AllowedStartRules,
) -> Result<AllowedStartRules, GrammarError> {
    match requested {
        AllowedStartRules::All => Ok(AllowedStartRules::All),
        AllowedStartRules::Named(names) if names.is_empty() => {
            let first = grammar.rules.first().map(|rule| rule.name.clone()).ok_or_else(|| {
                GrammarError::Usage("grammar has no rules to default a start rule from".into())
            })?;
            Ok(AllowedStartRules::Named(vec![first]))
        }
        AllowedStartRules::Named(names) => {
            for name in names {
                if !grammar.rules.iter().any(|rule| &rule.name == name) {
                    return Err(GrammarError::Usage(format!("unknown start rule \"{name}\"")));
                }
            }
            Ok(AllowedStartRules::Named(names.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peg_ast::builder as b;

    #[test]
    fn empty_allowed_start_rules_defaults_to_the_first_rule() {
        let grammar = b::grammar(vec![b::rule("start", b::lit("a")), b::rule("tail", b::any())]);
        let resolved =
            resolve_allowed_start_rules(&grammar, &AllowedStartRules::Named(Vec::new())).unwrap();
        assert_eq!(resolved, AllowedStartRules::Named(vec!["start".to_string()]));
    }

    #[test]
    fn unknown_named_start_rule_is_a_usage_error() {
        let grammar = b::grammar(vec![b::rule("start", b::lit("a"))]);
        let err = resolve_allowed_start_rules(
            &grammar,
            &AllowedStartRules::Named(vec!["missing".to_string()]),
        )
        .unwrap_err();
        assert!(matches!(err, GrammarError::Usage(_)));
    }

    #[test]
    fn star_sentinel_passes_through_unexpanded() {
        let grammar = b::grammar(vec![b::rule("start", b::lit("a"))]);
        let resolved = resolve_allowed_start_rules(&grammar, &AllowedStartRules::All).unwrap();
        assert_eq!(resolved, AllowedStartRules::All);
    }

    #[test]
    fn empty_grammar_with_defaulted_start_rules_is_a_usage_error() {
        let grammar = b::grammar(Vec::new());
        let err = resolve_allowed_start_rules(&grammar, &AllowedStartRules::Named(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, GrammarError::Usage(_)));
    }

    #[test]
    fn generate_with_default_output_mode_is_a_usage_error() {
        let grammar = b::grammar(vec![b::rule("start", b::lit("a"))]);
        let err = generate(grammar, DriverOptions::default()).unwrap_err();
        assert!(matches!(err, GrammarError::Usage(_)));
    }

    #[test]
    fn generate_with_ast_output_returns_a_fully_lowered_grammar() {
        let grammar = b::grammar(vec![b::rule("start", b::lit("a"))]);
        let mut options = DriverOptions::default();
        options.output = OutputMode::Ast;
        let GenerateOutput::Ast(grammar) = generate(grammar, options).unwrap();
        assert!(grammar.rules[0].bytecode.is_some());
        assert_eq!(grammar.literals, vec!["a".to_string()]);
    }

    #[test]
    fn generate_rejects_a_grammar_that_fails_the_check_stage() {
        let (grammar, _) = peg_tdd_support::grammars::undefined_rule();
        let mut options = DriverOptions::default();
        options.output = OutputMode::Ast;
        let err = generate(grammar, options).unwrap_err();
        match err {
            GrammarError::Semantic { stage, .. } => assert_eq!(stage, CompileStage::Check),
            other => panic!("expected a semantic error, got {other:?}"),
        }
    }
}
