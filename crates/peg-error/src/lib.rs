//! Diagnostics session and error types for the PEG grammar compiler.
//!
//! Passes never unwind for semantic issues: they call [`Session::error`],
//! [`Session::warning`], or [`Session::info`] and keep traversing with local
//! control flow. The pipeline driver calls [`Session::check_errors`] at the
//! end of each stage; if any error was reported during that stage,
//! compilation halts there.

mod formatter;
mod options;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use peg_diagnostics_codes::{DiagnosticCode, Severity};
use peg_position::SourceLocation;

pub use formatter::format_problems;
pub use options::{AllowedStartRules, CompileOptions, Pass};

/// One of the three pipeline stages; a session is tagged with its current
/// stage before each stage's passes run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompileStage {
    /// Semantic validation passes.
    Check,
    /// Proxy-rule elision and match-result inference.
    Transform,
    /// Bytecode generation.
    Generate,
}

impl fmt::Display for CompileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileStage::Check => write!(f, "check"),
            CompileStage::Transform => write!(f, "transform"),
            CompileStage::Generate => write!(f, "generate"),
        }
    }
}

/// A note attached to a [`Problem`], pointing at a related location (e.g.
/// the original definition of a duplicate rule).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Note text.
    pub message: String,
    /// Location the note points at.
    pub location: Option<SourceLocation>,
}

impl Note {
    /// Creates a new note.
    pub fn new(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self { message: message.into(), location }
    }
}

/// A single diagnostic: `(code, severity, message, location?, notes?)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    /// Stable diagnostic code.
    pub code: DiagnosticCode,
    /// Error, warning, or info.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Primary location, if any.
    pub location: Option<SourceLocation>,
    /// Related locations.
    pub notes: Vec<Note>,
}

/// Errors the grammar compiler can raise.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GrammarError {
    /// A stage reported one or more errors; `problems` carries every
    /// diagnostic (of any severity) accumulated by the session so far.
    #[error("{message}")]
    Semantic {
        /// Stage that failed.
        stage: CompileStage,
        /// Display message for the first error reported in this stage.
        message: String,
        /// Location of the first error, if any.
        location: Option<SourceLocation>,
        /// Every diagnostic accumulated by the session up to this point.
        problems: Vec<Problem>,
    },
    /// An internal invariant was violated (a compiler bug, not a grammar
    /// problem): a rule vanished mid-pipeline, or match-result inference
    /// failed to reach a fixed point within 6 iterations.
    #[error("internal invariant violated: {0}")]
    Internal(String),
    /// A usage error from the driver: an unknown or missing start rule, or
    /// conflicting options.
    #[error("usage error: {0}")]
    Usage(String),
}

/// Per-compilation diagnostics collector.
///
/// Constructed fresh for every `generate(...)` call; never shared across
/// threads while passes are running.
pub struct Session {
    stage: Option<CompileStage>,
    problems: Vec<Problem>,
    error_count: usize,
    first_error: Option<(String, Option<SourceLocation>)>,
    on_error: Box<dyn FnMut(&Problem)>,
    on_warning: Box<dyn FnMut(&Problem)>,
    on_info: Box<dyn FnMut(&Problem)>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

impl Session {
    /// Creates a session with optional per-severity callbacks, defaulted to
    /// no-ops.
    pub fn new(
        on_error: Option<Box<dyn FnMut(&Problem)>>,
        on_warning: Option<Box<dyn FnMut(&Problem)>>,
        on_info: Option<Box<dyn FnMut(&Problem)>>,
    ) -> Self {
        Self {
            stage: None,
            problems: Vec::new(),
            error_count: 0,
            first_error: None,
            on_error: on_error.unwrap_or_else(|| Box::new(|_| {})),
            on_warning: on_warning.unwrap_or_else(|| Box::new(|_| {})),
            on_info: on_info.unwrap_or_else(|| Box::new(|_| {})),
        }
    }

    /// Sets the stage the driver is about to run. Must be called before any
    /// pass in that stage reports a diagnostic.
    pub fn set_stage(&mut self, stage: CompileStage) {
        self.stage = Some(stage);
    }

    /// Current stage, if set.
    pub fn stage(&self) -> Option<CompileStage> {
        self.stage
    }

    /// Number of errors reported so far.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Every diagnostic accumulated so far, in report order.
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// Records an error. Increments the error count and, on the first error
    /// of the session, remembers its message/location for
    /// [`Session::check_errors`]. Does not unwind; the caller must stop its
    /// own traversal if a cycle or other runaway condition is detected.
    pub fn error(
        &mut self,
        code: DiagnosticCode,
        message: impl Into<String>,
        location: Option<SourceLocation>,
        notes: Vec<Note>,
    ) {
        let message = message.into();
        assert!(
            self.stage.is_some(),
            "Session::error called with no stage set (programmer error)"
        );
        if self.first_error.is_none() {
            self.first_error = Some((message.clone(), location.clone()));
        }
        self.error_count += 1;
        self.record(code, Severity::Error, message, location, notes);
    }

    /// Records a warning. Does not affect the error count.
    pub fn warning(
        &mut self,
        code: DiagnosticCode,
        message: impl Into<String>,
        location: Option<SourceLocation>,
        notes: Vec<Note>,
    ) {
        assert!(
            self.stage.is_some(),
            "Session::warning called with no stage set (programmer error)"
        );
        self.record(code, Severity::Warning, message.into(), location, notes);
    }

    /// Records an info-level note. Does not affect the error count.
    pub fn info(
        &mut self,
        code: DiagnosticCode,
        message: impl Into<String>,
        location: Option<SourceLocation>,
        notes: Vec<Note>,
    ) {
        assert!(
            self.stage.is_some(),
            "Session::info called with no stage set (programmer error)"
        );
        self.record(code, Severity::Info, message.into(), location, notes);
    }

    fn record(
        &mut self,
        code: DiagnosticCode,
        severity: Severity,
        message: String,
        location: Option<SourceLocation>,
        notes: Vec<Note>,
    ) {
        let problem = Problem { code, severity, message, location, notes };
        match severity {
            Severity::Error => (self.on_error)(&problem),
            Severity::Warning => (self.on_warning)(&problem),
            Severity::Info => (self.on_info)(&problem),
        }
        self.problems.push(problem);
    }

    /// Raises the retained first error if any error was reported since the
    /// session was created, carrying every accumulated diagnostic. Called at
    /// the end of each stage by the pipeline driver.
    pub fn check_errors(&self) -> Result<(), GrammarError> {
        if self.error_count == 0 {
            return Ok(());
        }
        let stage = self.stage.unwrap_or(CompileStage::Check);
        let (first_message, first_location) =
            self.first_error.clone().unwrap_or_else(|| ("unknown error".to_string(), None));
        let message = match &first_location {
            Some(loc) => format!("{loc}: {first_message}"),
            None => first_message,
        };
        Err(GrammarError::Semantic {
            stage,
            message,
            location: first_location,
            problems: self.problems.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_errors_is_ok_with_no_errors() {
        let mut session = Session::default();
        session.set_stage(CompileStage::Check);
        session.warning(DiagnosticCode::UndefinedRule, "just a warning", None, vec![]);
        assert!(session.check_errors().is_ok());
    }

    #[test]
    fn check_errors_raises_first_error_with_all_problems_attached() {
        let mut session = Session::default();
        session.set_stage(CompileStage::Check);
        session.info(DiagnosticCode::ProxyRuleRemoved, "first info", None, vec![]);
        session.error(DiagnosticCode::UndefinedRule, "boom", None, vec![]);
        session.error(DiagnosticCode::DuplicateRule, "second boom", None, vec![]);
        let err = session.check_errors().unwrap_err();
        match err {
            GrammarError::Semantic { stage, message, problems, .. } => {
                assert_eq!(stage, CompileStage::Check);
                assert_eq!(message, "boom");
                assert_eq!(problems.len(), 3);
            }
            other => panic!("expected Semantic error, got {other:?}"),
        }
    }

    #[test]
    #[should_panic(expected = "programmer error")]
    fn error_without_stage_panics() {
        let mut session = Session::default();
        session.error(DiagnosticCode::UndefinedRule, "oops", None, vec![]);
    }
}
