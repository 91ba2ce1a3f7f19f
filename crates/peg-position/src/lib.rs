//! Source location types shared by every stage of the grammar compiler.
//!
//! A [`SourceLocation`] pins a span of grammar source text to a
//! `grammarSource` identifier (opaque, supplied by the caller) plus
//! line/column/offset pairs for the start and end of the span. Locations are
//! produced by the (out-of-scope) grammar parser and carried unchanged
//! through the check/transform/generate pipeline for diagnostics.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A single point in grammar source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    /// 0-based byte offset from the start of the source.
    pub offset: usize,
}

impl Position {
    /// Creates a new position.
    pub const fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of grammar source text, with an opaque `grammarSource` tag.
///
/// The `source` field mirrors the `grammarSource` compile option: an
/// identifier the caller supplies (e.g. a file path) that is attached to
/// every location so an external formatter can recover the original text
/// for caret-underlined diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Identifier of the source this span belongs to; `None` when the
    /// caller did not supply a `grammarSource`.
    pub source: Option<Arc<str>>,
    /// Start of the span, inclusive.
    pub start: Position,
    /// End of the span, exclusive.
    pub end: Position,
}

impl SourceLocation {
    /// Creates a new location.
    pub fn new(source: Option<Arc<str>>, start: Position, end: Position) -> Self {
        Self { source, start, end }
    }

    /// Creates a synthetic zero-width location at the origin, for AST nodes
    /// built by tooling rather than parsed from text (see `peg-ast`'s
    /// builder module).
    pub fn synthetic() -> Self {
        Self { source: None, start: Position::default(), end: Position::default() }
    }

    /// Returns a location spanning from the start of `self` to the end of
    /// `other`.
    pub fn merge(&self, other: &SourceLocation) -> SourceLocation {
        SourceLocation { source: self.source.clone(), start: self.start, end: other.end }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{src}:{}", self.start),
            None => write!(f, "{}", self.start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_source_and_spans_start_to_end() {
        let a = SourceLocation::new(
            Some(Arc::from("g.peg")),
            Position::new(1, 1, 0),
            Position::new(1, 5, 4),
        );
        let b = SourceLocation::new(
            Some(Arc::from("g.peg")),
            Position::new(2, 1, 10),
            Position::new(2, 3, 12),
        );
        let merged = a.merge(&b);
        assert_eq!(merged.start, a.start);
        assert_eq!(merged.end, b.end);
    }

    #[test]
    fn display_without_source_omits_prefix() {
        let loc = SourceLocation::new(None, Position::new(3, 4, 9), Position::new(3, 5, 10));
        assert_eq!(loc.to_string(), "3:4");
    }
}
