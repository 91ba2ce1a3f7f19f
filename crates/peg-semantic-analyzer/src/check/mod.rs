//! The six semantic-validation passes: each receives the whole grammar and
//! reports diagnostics through the session, never mutating the AST.

mod duplicate_labels;
mod duplicate_rules;
mod infinite_repetition;
mod left_recursion;
mod pluck_in_action;
mod undefined_rules;

pub use duplicate_labels::check_duplicate_labels;
pub use duplicate_rules::check_duplicate_rules;
pub use infinite_repetition::check_infinite_repetition;
pub use left_recursion::check_left_recursion;
pub use pluck_in_action::check_pluck_in_action;
pub use undefined_rules::check_undefined_rules;

use peg_error::Pass;

/// The check stage's passes, in the order the driver runs them. Rule
/// existence is checked first since the other passes assume `rule_ref`
/// targets that do exist are the only ones worth following.
pub fn default_check_passes() -> Vec<Pass> {
    vec![
        check_undefined_rules,
        check_duplicate_rules,
        check_duplicate_labels,
        check_infinite_repetition,
        check_left_recursion,
        check_pluck_in_action,
    ]
}
