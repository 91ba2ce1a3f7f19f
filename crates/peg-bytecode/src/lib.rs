//! Lowers a checked, transformed grammar AST into the stack-machine
//! bytecode consumed by the (out-of-scope) runtime interpreter, and into
//! the four deduplicated constant pools that bytecode indexes into.
//!
//! Generation is the last pipeline stage before code emission: every node
//! it visits is expected to already carry a populated `match_result`
//! annotation (from [`peg_semantic_analyzer::infer_match_results`]) and to
//! reference only rules that [`peg_semantic_analyzer::check_undefined_rules`]
//! has already confirmed exist. Any other shape is an internal-invariant
//! violation, reported as [`error::BytecodeError`] rather than a grammar
//! diagnostic.

mod context;
mod emit;
mod error;
mod generator;
mod opcode;
mod pools;

pub use context::{EmitContext, EnclosingAction};
pub use error::BytecodeError;
pub use generator::generate_bytecode;
pub use opcode::{Opcode, FAILED};
pub use pools::Pools;
