//! Flags rules that redefine a name already used earlier in the grammar.

use rustc_hash::FxHashMap;

use peg_ast::Grammar;
use peg_error::{CompileOptions, DiagnosticCode, GrammarError, Note, Session};

/// Reports every rule whose name collides with an earlier rule, pointing
/// back at the original definition.
pub fn check_duplicate_rules(
    grammar: &mut Grammar,
    _options: &CompileOptions,
    session: &mut Session,
) -> Result<(), GrammarError> {
    let mut seen: FxHashMap<String, peg_ast::SourceLocation> = FxHashMap::default();
    for rule in &grammar.rules {
        if let Some(first_location) = seen.get(&rule.name) {
            session.error(
                DiagnosticCode::DuplicateRule,
                format!("Rule \"{}\" is already defined", rule.name),
                Some(rule.name_location.clone()),
                vec![Note::new("original definition", Some(first_location.clone()))],
            );
        } else {
            seen.insert(rule.name.clone(), rule.name_location.clone());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use peg_ast::builder;
    use peg_error::CompileStage;

    #[test]
    fn reports_second_definition_with_a_note_at_the_first() {
        let first_location = builder::span(0, 5);
        let second_location = builder::span(20, 25);
        let a = builder::rule_at("A", builder::any(), first_location.clone());
        let b = builder::rule_at("A", builder::any(), second_location.clone());
        let mut grammar = builder::grammar(vec![a, b]);

        let mut session = Session::default();
        session.set_stage(CompileStage::Check);
        check_duplicate_rules(&mut grammar, &CompileOptions::default(), &mut session).unwrap();

        assert_eq!(session.error_count(), 1);
        let problem = &session.problems()[0];
        assert_eq!(problem.location.as_ref(), Some(&second_location));
        assert_eq!(problem.notes.len(), 1);
        assert_eq!(problem.notes[0].location.as_ref(), Some(&first_location));
    }

    #[test]
    fn distinct_names_produce_no_error() {
        let mut grammar =
            builder::grammar(vec![builder::rule("A", builder::any()), builder::rule("B", builder::any())]);
        let mut session = Session::default();
        session.set_stage(CompileStage::Check);
        check_duplicate_rules(&mut grammar, &CompileOptions::default(), &mut session).unwrap();
        assert_eq!(session.error_count(), 0);
    }
}
