//! Caret-underlined diagnostic formatting, kept separate from
//! [`crate::Session`] because formatting is a post-hoc, external concern:
//! any list of `(source-id, text)` pairs can be supplied, not just the ones
//! the session happened to see.

use crate::{Problem, Severity};

/// Renders a list of problems into a caret-underlined diagnostic block,
/// given the `(source-id, text)` pairs needed to locate each problem's
/// source line. Info-severity problems are omitted from both the rendered
/// blocks and the trailing summary counts.
pub fn format_problems(problems: &[Problem], sources: &[(String, String)]) -> String {
    let mut out = String::new();
    let mut errors = 0usize;
    let mut warnings = 0usize;

    for problem in problems {
        match problem.severity {
            Severity::Info => continue,
            Severity::Error => errors += 1,
            Severity::Warning => warnings += 1,
        }
        out.push_str(&render_problem(problem, sources));
        out.push('\n');
    }

    out.push_str(&format!("{errors} error(s), {warnings} warning(s)\n"));
    out
}

fn render_problem(problem: &Problem, sources: &[(String, String)]) -> String {
    let mut rendered = format!("{} [{}]: {}\n", problem.severity, problem.code, problem.message);
    if let Some(location) = &problem.location {
        if let Some(text) = find_source(sources, location.source.as_deref()) {
            rendered.push_str(&caret_block(text, location.start.line, location.start.column));
        }
    }
    for note in &problem.notes {
        rendered.push_str(&format!("  note: {}\n", note.message));
    }
    rendered
}

fn find_source<'a>(sources: &'a [(String, String)], source_id: Option<&str>) -> Option<&'a str> {
    let id = source_id?;
    sources.iter().find(|(sid, _)| sid == id).map(|(_, text)| text.as_str())
}

fn caret_block(text: &str, line: usize, column: usize) -> String {
    let source_line = text.lines().nth(line.saturating_sub(1)).unwrap_or("");
    let indent = " ".repeat(column.saturating_sub(1));
    format!("{source_line}\n{indent}^\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompileStage, DiagnosticCode, Note, Session};

    #[test]
    fn summary_excludes_info_counts() {
        let mut session = Session::default();
        session.set_stage(CompileStage::Check);
        session.info(DiagnosticCode::ProxyRuleRemoved, "just fyi", None, vec![]);
        session.warning(DiagnosticCode::InfiniteRepetition, "careful", None, vec![]);
        session.error(
            DiagnosticCode::UndefinedRule,
            "nope",
            None,
            vec![Note::new("see here", None)],
        );
        let text = format_problems(session.problems(), &[]);
        assert!(text.contains("1 error(s), 1 warning(s)"));
        assert!(!text.contains("just fyi"));
    }
}
