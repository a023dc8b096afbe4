//! Tag rules - Conditional tag mutation
//!
//! Adds and removes point tags based on conditions over the point's own
//! attributes.
//!
//! # Order of Application
//!
//! 1. Every add rule, in configured order. A matching rule sets (or
//!    overwrites) its tag.
//! 2. Every delete rule, in configured order. A matching rule removes its
//!    tag if present.
//!
//! Each rule is evaluated against the point as left by the rules before it,
//! so a delete rule can retract a tag that an add rule just set.
//!
//! # Conditions
//!
//! | Condition | Meaning |
//! |-----------|---------|
//! | `"*"` | Always applies, nothing is evaluated |
//! | anything else | Boolean expression over `name`, `timestamp`, tags, meta and fields |
//!
//! A condition that fails to evaluate (bad syntax, unknown variable, type
//! mismatch, non-boolean result) does not match. The failure is logged
//! (rate-limited) and counted; the point continues through the remaining
//! rules.
//!
//! # Example
//!
//! ```
//! use ccm_config::{RouterConfig, TagRuleConfig};
//! use ccm_protocol::Point;
//! use ccm_transform::TagRules;
//! use chrono::Utc;
//!
//! let config = RouterConfig::new()
//!     .with_add_tag(TagRuleConfig::new("hot", "true", "value > 100"));
//! let rules = TagRules::from_config(&config);
//!
//! let mut point = Point::new("ib_recv", Utc::now()).with_field("value", 120.0);
//! rules.apply(&mut point);
//! assert_eq!(point.tag("hot"), Some("true"));
//! ```

mod variables;

pub use variables::{NAME_VARIABLE, TIMESTAMP_VARIABLE, point_variables};

use std::sync::Arc;

use ccm_config::{RouterConfig, TagRuleConfig, WILDCARD_CONDITION};
use ccm_protocol::Point;

use crate::error::EvalResult;
use crate::expr::{Evaluator, ExprEvaluator};
use crate::rate_limited_logger::RateLimitedLogger;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

/// When a rule applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The `"*"` wildcard
    Always,
    /// Boolean expression source
    Expression(String),
}

impl Condition {
    /// Interpret a configured condition string
    pub fn parse(condition: &str) -> Self {
        if condition == WILDCARD_CONDITION {
            Self::Always
        } else {
            Self::Expression(condition.to_string())
        }
    }
}

/// A single tag rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRule {
    /// Tag key
    pub key: String,
    /// Tag value (unused by delete rules)
    pub value: String,
    /// When the rule applies
    pub condition: Condition,
}

impl TagRule {
    pub fn new(key: impl Into<String>, value: impl Into<String>, condition: Condition) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            condition,
        }
    }

    pub fn from_config(config: &TagRuleConfig) -> Self {
        Self::new(
            config.key.clone(),
            config.value.clone(),
            Condition::parse(&config.condition),
        )
    }
}

/// What one mutation pass did to a point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationOutcome {
    /// Add rules that matched (tags set or overwritten)
    pub tags_added: u64,
    /// Delete rules that matched and removed a present tag
    pub tags_removed: u64,
    /// Conditions that failed to evaluate
    pub eval_errors: u64,
}

/// Ordered add and delete rules with the evaluator that decides them
///
/// Immutable after construction.
pub struct TagRules {
    add: Vec<TagRule>,
    delete: Vec<TagRule>,
    evaluator: Arc<dyn Evaluator>,
    error_log: RateLimitedLogger,
}

impl TagRules {
    /// Build rules from configuration using the built-in evaluator
    pub fn from_config(config: &RouterConfig) -> Self {
        Self::with_evaluator(config, Arc::new(ExprEvaluator::new()))
    }

    /// Build rules from configuration with a custom evaluator
    ///
    /// Conditions the evaluator rejects are reported once here; they still
    /// load and simply never match.
    pub fn with_evaluator(config: &RouterConfig, evaluator: Arc<dyn Evaluator>) -> Self {
        let add: Vec<TagRule> = config.add_tags.iter().map(TagRule::from_config).collect();
        let delete: Vec<TagRule> = config.delete_tags.iter().map(TagRule::from_config).collect();

        for (list, rules) in [("add_tags", &add), ("delete_tags", &delete)] {
            for (index, rule) in rules.iter().enumerate() {
                if let Condition::Expression(expr) = &rule.condition
                    && let Err(e) = evaluator.validate(expr)
                {
                    tracing::warn!(
                        list,
                        index,
                        key = %rule.key,
                        condition = %expr,
                        error = %e,
                        "rule condition is invalid and will never match"
                    );
                }
            }
        }

        Self {
            add,
            delete,
            evaluator,
            error_log: RateLimitedLogger::default_interval(),
        }
    }

    #[inline]
    pub fn add_rules(&self) -> &[TagRule] {
        &self.add
    }

    #[inline]
    pub fn delete_rules(&self) -> &[TagRule] {
        &self.delete
    }

    /// Evaluate an expression against a point
    ///
    /// Does not handle the wildcard; see [`TagRules::matches`].
    pub fn eval_condition(&self, expression: &str, point: &Point) -> EvalResult<bool> {
        let vars = point_variables(point);
        self.evaluator.evaluate(expression, &vars)
    }

    /// Decide whether a rule applies to a point
    ///
    /// Evaluation failures count as "no match", are logged (rate-limited)
    /// and recorded in `outcome`.
    pub fn matches(&self, rule: &TagRule, point: &Point, outcome: &mut MutationOutcome) -> bool {
        match &rule.condition {
            Condition::Always => true,
            Condition::Expression(expr) => match self.eval_condition(expr, point) {
                Ok(matched) => matched,
                Err(e) => {
                    outcome.eval_errors += 1;
                    self.error_log.warn(expr, &e);
                    false
                }
            },
        }
    }

    /// Run the full mutation pass: all add rules, then all delete rules
    pub fn apply(&self, point: &mut Point) -> MutationOutcome {
        let mut outcome = MutationOutcome::default();

        for rule in &self.add {
            if self.matches(rule, point, &mut outcome) {
                point.add_tag(rule.key.as_str(), rule.value.as_str());
                outcome.tags_added += 1;
            }
        }

        for rule in &self.delete {
            if self.matches(rule, point, &mut outcome) && point.remove_tag(&rule.key).is_some() {
                outcome.tags_removed += 1;
            }
        }

        outcome
    }

    /// Total evaluation failures since construction
    pub fn eval_error_count(&self) -> u64 {
        self.error_log.total()
    }
}

impl std::fmt::Debug for TagRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagRules")
            .field("add", &self.add)
            .field("delete", &self.delete)
            .finish()
    }
}
