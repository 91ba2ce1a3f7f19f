use serde::{Deserialize, Serialize};

use crate::ast::ClassPart;
use peg_position::SourceLocation;

/// Descriptor for one entry in the `classes` constant pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharClassDescriptor {
    /// Characters and ranges in the class.
    pub parts: Vec<ClassPart>,
    /// Whether the class is negated.
    pub inverted: bool,
    /// Whether the class matches case-insensitively.
    pub ignore_case: bool,
}

/// Descriptor for one entry in the `expectations` constant pool: a
/// structured description of what input was expected at a failure
/// position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpectedConst {
    /// A named rule was expected (used when a `named` node fails).
    Rule {
        /// Human-facing rule name.
        name: String,
    },
    /// A literal string was expected.
    Literal {
        /// The literal text.
        value: String,
        /// Whether the match was case-insensitive.
        ignore_case: bool,
    },
    /// A character class was expected.
    Class {
        /// Characters and ranges in the class.
        parts: Vec<ClassPart>,
        /// Whether the class was negated.
        inverted: bool,
        /// Whether the match was case-insensitive.
        ignore_case: bool,
    },
    /// Any single input unit was expected.
    Any,
}

/// Whether a [`FunctionDesc`] is a user action or a semantic predicate, and
/// if a predicate, its polarity. Carried separately from the bytecode's own
/// `CALL` polarity handling because the emitted code branches on the
/// caller's use of the result, not on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionKind {
    /// An action block (`{ ... }` following a sequence or sole expression).
    Action,
    /// A semantic predicate (`&{ ... }` / `!{ ... }`).
    Predicate,
}

/// Descriptor for one entry in the `functions` constant pool: a user-code
/// body plus the parameter names it closes over (the labels visible at its
/// call site).
///
/// Two descriptors with identical `kind`, `params`, and `body` are
/// deduplicated into the same pool entry even if they came from different
/// label environments in the source grammar; only `params` (not the
/// environment's `sp` bookkeeping) is part of the descriptor, so this
/// aliasing is accepted, documented behavior rather than a bug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionDesc {
    /// Action or predicate.
    pub kind: FunctionKind,
    /// Label names visible at the call site, in call order.
    pub params: Vec<String>,
    /// Raw user code.
    pub body: String,
    /// Span of the code block, for error messages raised from inside it.
    pub location: SourceLocation,
}

impl CharClassDescriptor {
    /// Structural dedup key, independent of pool order.
    pub fn dedup_key(&self) -> (Vec<ClassPart>, bool, bool) {
        (self.parts.clone(), self.inverted, self.ignore_case)
    }
}

impl FunctionDesc {
    /// Structural dedup key. Deliberately excludes `location`: two
    /// occurrences of the same code in different places of the grammar with
    /// the same parameter list intern to one pool entry.
    pub fn dedup_key(&self) -> (FunctionKind, Vec<String>, String) {
        (self.kind, self.params.clone(), self.body.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_desc_dedup_key_ignores_location() {
        let a = FunctionDesc {
            kind: FunctionKind::Action,
            params: vec!["x".to_string()],
            body: "return x;".to_string(),
            location: SourceLocation::synthetic(),
        };
        let mut b = a.clone();
        b.location = SourceLocation::new(
            Some(std::sync::Arc::from("other.peg")),
            peg_position::Position::new(9, 9, 9),
            peg_position::Position::new(9, 10, 10),
        );
        assert_eq!(a.dedup_key(), b.dedup_key());
    }
}
