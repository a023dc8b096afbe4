//! CCM - Transform
//!
//! Per-point tag mutation driven by configured rules.
//!
//! # Overview
//!
//! Every point that passes through the router is run through one mutation
//! pass:
//!
//! ```text
//! [Point] → [add rules, in order] → [delete rules, in order] → [Point']
//! ```
//!
//! A rule carries a tag key, a value (add rules only) and a condition. The
//! condition is either the `"*"` wildcard or a boolean expression over the
//! point's name, timestamp, tags, meta and fields.
//!
//! # Design Principles
//!
//! - **Fail open**: A broken condition never stops routing; it just doesn't match
//! - **Pluggable**: Conditions go through the [`Evaluator`] trait
//! - **Parse once**: The built-in evaluator caches parsed expressions
//!
//! # Modules
//!
//! - `expr` - Condition expression language and the default evaluator
//! - `rules` - Ordered add/delete tag rules and the mutation pass

mod error;
mod rate_limited_logger;
pub mod expr;
pub mod rules;

pub use error::{EvalError, EvalResult};
pub use expr::{Evaluator, ExprEvaluator, Expression, Value, Variables};
pub use rate_limited_logger::RateLimitedLogger;
pub use rules::{Condition, MutationOutcome, TagRule, TagRules, point_variables};
