//! AST node definitions for the PEG grammar compiler.
//!
//! This crate defines the tagged AST produced by the (out-of-scope)
//! grammar-text parser and consumed by the check, transform, and generate
//! stages. Every [`Expression`] variant carries an optional [`MatchResult`]
//! annotation populated by the match-result inference pass, and [`Rule`]
//! carries an optional `bytecode` field populated by the bytecode
//! generator. Annotations are modeled as optional fields owned by the node
//! itself rather than side tables, per the design notes: a single `Grammar`
//! owns its whole tree and passes mutate it in place.

mod ast;
pub mod builder;
mod pool;

pub use ast::*;
pub use pool::*;
pub use peg_position::{Position, SourceLocation};
