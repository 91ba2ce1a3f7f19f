//! The plugin hook: an in-process configurator invoked once per compilation
//! before any stage runs. A plugin may register extra passes, replace the
//! reserved-word list, or (in a full implementation) swap the front-end
//! parser — dynamic loading from disk is explicitly out of scope, so a
//! "plugin" here is just a `Box<dyn Plugin>` the caller already constructed.

use peg_error::Pass;

use crate::options::DriverOptions;

/// The mutable pipeline state plugins configure before compilation starts:
/// cloned per-invocation from the defaults so one plugin's changes never
/// leak into another caller's pipeline.
pub struct PipelineConfig {
    /// Check-stage passes, in run order.
    pub check_passes: Vec<Pass>,
    /// Transform-stage passes, in run order.
    pub transform_passes: Vec<Pass>,
    /// Generate-stage passes, in run order.
    pub generate_passes: Vec<Pass>,
    /// Label names the parser rejects as reserved, starting from
    /// [`crate::reserved_words::default_reserved_words`].
    pub reserved_words: Vec<String>,
}

impl PipelineConfig {
    /// The stock pipeline: the semantic-analyzer crate's default check and
    /// transform passes, the bytecode generator as the sole generate pass,
    /// and the default reserved-word list.
    pub fn defaults() -> Self {
        Self {
            check_passes: peg_semantic_analyzer::default_check_passes(),
            transform_passes: peg_semantic_analyzer::default_transform_passes(),
            generate_passes: vec![peg_bytecode::generate_bytecode],
            reserved_words: crate::reserved_words::default_reserved_words(),
        }
    }
}

/// A configurator run once, in registration order, before the grammar is
/// compiled. Implementations may push onto any of `config`'s pass lists or
/// replace `config.reserved_words` wholesale.
pub trait Plugin {
    /// Applies this plugin's configuration to the pipeline.
    fn use_plugin(&self, config: &mut PipelineConfig, options: &DriverOptions);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AddsAWarningPass;

    fn noop_pass(
        _grammar: &mut peg_ast::Grammar,
        _options: &peg_error::CompileOptions,
        _session: &mut peg_error::Session,
    ) -> Result<(), peg_error::GrammarError> {
        Ok(())
    }

    impl Plugin for AddsAWarningPass {
        fn use_plugin(&self, config: &mut PipelineConfig, _options: &DriverOptions) {
            config.check_passes.push(noop_pass);
        }
    }

    #[test]
    fn plugin_can_append_a_check_pass() {
        let mut config = PipelineConfig::defaults();
        let before = config.check_passes.len();
        let options = DriverOptions::default();
        AddsAWarningPass.use_plugin(&mut config, &options);
        assert_eq!(config.check_passes.len(), before + 1);
    }

    #[test]
    fn defaults_seed_the_stock_passes_and_reserved_words() {
        let config = PipelineConfig::defaults();
        assert!(!config.check_passes.is_empty());
        assert!(!config.transform_passes.is_empty());
        assert_eq!(config.generate_passes.len(), 1);
        assert!(config.reserved_words.contains(&"class".to_string()));
    }
}
