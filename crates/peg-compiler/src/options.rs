//! Driver-level options: the subset of `CompileOptions` used by the check,
//! transform, and generate passes themselves, plus the concerns that only
//! the driver cares about (plugins, diagnostic callbacks, and the output
//! mode that would select an emitter target).

use peg_error::{CompileOptions, Problem};

use crate::plugin::Plugin;

/// Which artifact `generate` should produce. Only [`OutputMode::Ast`] is
/// implementable by this core — the other variants name targets that the
/// out-of-scope code emitter produces from the bytecode and pools this
/// core populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// A ready-to-run parser object (emitter + runtime, out of scope).
    Parser,
    /// Generated source text (emitter, out of scope).
    Source,
    /// Generated source text plus a separate source map (emitter, out of
    /// scope).
    SourceAndMap,
    /// Generated source text with an inline source map (emitter, out of
    /// scope).
    SourceWithInlineMap,
    /// The fully-annotated AST, with bytecode and constant pools populated.
    /// The only mode this core can produce on its own.
    Ast,
}

impl Default for OutputMode {
    /// Matches the upstream default of `"parser"`; callers that only want
    /// this core's output must opt into [`OutputMode::Ast`] explicitly.
    fn default() -> Self {
        OutputMode::Parser
    }
}

/// Options the pipeline driver consumes: the stage-level [`CompileOptions`]
/// plus plugins, output selection, and diagnostic callbacks.
#[derive(Default)]
pub struct DriverOptions {
    /// Options threaded through to every check/transform/generate pass.
    pub compile: CompileOptions,
    /// Configurators run once, in order, before compilation starts.
    pub plugins: Vec<Box<dyn Plugin>>,
    /// Which artifact to produce.
    pub output: OutputMode,
    /// Module format for the (out-of-scope) emitter; passed through
    /// unused by this core.
    pub format: Option<String>,
    /// Called for every error-severity diagnostic, in report order.
    pub on_error: Option<Box<dyn FnMut(&Problem)>>,
    /// Called for every warning-severity diagnostic, in report order.
    pub on_warning: Option<Box<dyn FnMut(&Problem)>>,
    /// Called for every info-severity diagnostic, in report order.
    pub on_info: Option<Box<dyn FnMut(&Problem)>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_mode_is_parser_matching_upstream() {
        assert_eq!(OutputMode::default(), OutputMode::Parser);
    }

    #[test]
    fn default_driver_options_has_no_plugins_or_callbacks() {
        let options = DriverOptions::default();
        assert!(options.plugins.is_empty());
        assert!(options.on_error.is_none());
    }
}
