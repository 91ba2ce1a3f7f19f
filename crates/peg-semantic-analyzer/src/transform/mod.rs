//! The two AST-rewriting passes that run between the check and generate
//! stages: both may mutate the grammar in place.

mod match_inference;
mod remove_proxy_rules;

pub use match_inference::infer_match_results;
pub use remove_proxy_rules::remove_proxy_rules;

use peg_error::Pass;

/// The transform stage's passes, in the order the driver runs them. Proxy
/// elimination runs first so match-result inference never has to look
/// through a layer of pure indirection.
pub fn default_transform_passes() -> Vec<Pass> {
    vec![remove_proxy_rules, infer_match_results]
}
