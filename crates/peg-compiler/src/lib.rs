//! The pipeline driver: wires the semantic-analyzer and bytecode crates
//! together behind a single `generate` entry point, with plugin hooks,
//! start-rule resolution, and a default reserved-word list.
//!
//! The PEG-meta-grammar parser and the target-language code emitter are
//! both out of scope for this workspace; [`generate`] takes an
//! already-parsed [`peg_ast::Grammar`] and, for [`options::OutputMode::Ast`],
//! returns it back fully annotated with bytecode and constant pools. Every
//! other output mode names an emitter artifact this core cannot produce on
//! its own and is rejected as a usage error.

mod driver;
mod options;
mod plugin;
mod reserved_words;

pub use driver::{compile, generate, GenerateOutput};
pub use options::{DriverOptions, OutputMode};
pub use plugin::{PipelineConfig, Plugin};
pub use reserved_words::{default_reserved_words, DEFAULT_RESERVED_WORDS};
