//! Standard compiler passes
//!
//! Each pass is a [visitor](crate::ast::Visitor) over the syntax tree with its own state.

mod allocate_slots;
mod analysis;
mod compute_params;
mod duplicate_labels;
mod duplicate_rules;
mod infinite_repetition;
mod left_recursion;
mod missing_rules;
mod remove_proxy_rules;
mod report_failures;
mod unused_rules;

pub use allocate_slots::AllocateSlots;
pub use analysis::always_consumes;
pub use compute_params::ComputeParams;
pub use duplicate_labels::DuplicateLabels;
pub use duplicate_rules::DuplicateRules;
pub use infinite_repetition::InfiniteRepetition;
pub use left_recursion::LeftRecursion;
pub use missing_rules::MissingRules;
pub use remove_proxy_rules::RemoveProxyRules;
pub use report_failures::ReportFailures;
pub use unused_rules::UnusedRules;
