//! Semantic validation and AST transform passes for the PEG grammar
//! compiler pipeline: six check passes that only report diagnostics, and
//! two transform passes that additionally rewrite the grammar.

pub mod check;
mod helpers;
pub mod transform;

pub use check::{
    check_duplicate_labels, check_duplicate_rules, check_infinite_repetition,
    check_left_recursion, check_pluck_in_action, check_undefined_rules, default_check_passes,
};
pub use helpers::{always_consumes_on_success, find_rule, index_of_rule};
pub use transform::{default_transform_passes, infer_match_results, remove_proxy_rules};
