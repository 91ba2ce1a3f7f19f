//! Internal-invariant errors raised by the generator. These never
//! correspond to a problem with the grammar being compiled — by the time
//! generation runs, the check and transform stages have already rejected
//! anything a well-formed grammar wouldn't do. Seeing one of these means a
//! rule reference survived undefined-rule checking, or a similar bug in the
//! passes upstream of this crate.

/// A violated bytecode-generation invariant.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BytecodeError {
    /// A `rule_ref` node named a rule absent from the grammar's rule list.
    #[error("bytecode generation referenced undefined rule \"{0}\"")]
    UnknownRule(String),
    /// Some other generator invariant was violated.
    #[error("bytecode generation invariant violated: {0}")]
    Internal(String),
}

impl From<BytecodeError> for peg_error::GrammarError {
    fn from(err: BytecodeError) -> Self {
        peg_error::GrammarError::Internal(err.to_string())
    }
}
