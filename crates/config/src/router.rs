//! Router configuration
//!
//! Declares the tag-mutation rules and the interval-stamping flag.
//!
//! # Example
//!
//! ```json
//! {
//!   "add_tags": [
//!     { "key": "cluster", "value": "testcluster", "if": "*" },
//!     { "key": "hot", "value": "true", "if": "value > 100" }
//!   ],
//!   "delete_tags": [
//!     { "key": "unit", "value": "*", "if": "name == 'mem_used'" }
//!   ],
//!   "interval_timestamp": true
//! }
//! ```

use serde::Deserialize;

/// Condition literal meaning "always apply"
pub const WILDCARD_CONDITION: &str = "*";

/// One tag rule as written in the configuration
///
/// For delete rules `value` is not used; it is kept for symmetry and may be
/// omitted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagRuleConfig {
    /// Tag key to add or delete
    pub key: String,

    /// Tag value to set (add rules only)
    #[serde(default)]
    pub value: String,

    /// `"*"` or a boolean expression over the point's attributes
    #[serde(rename = "if")]
    pub condition: String,
}

impl TagRuleConfig {
    /// Create a rule config
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        condition: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            condition: condition.into(),
        }
    }

    /// Check if the condition is the wildcard
    #[inline]
    pub fn is_wildcard(&self) -> bool {
        self.condition == WILDCARD_CONDITION
    }
}

/// Router configuration
///
/// Loaded once at router initialization and immutable afterwards.
/// All sections are optional: missing rule lists mean "no rules of that
/// kind" and `interval_timestamp` defaults to `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Rules adding/overwriting tags, applied in order
    pub add_tags: Vec<TagRuleConfig>,

    /// Rules removing tags, applied in order after all add rules
    pub delete_tags: Vec<TagRuleConfig>,

    /// Rewrite every forwarded point's timestamp to the last ticker tick
    pub interval_timestamp: bool,
}

impl RouterConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an add rule
    pub fn with_add_tag(mut self, rule: TagRuleConfig) -> Self {
        self.add_tags.push(rule);
        self
    }

    /// Append a delete rule
    pub fn with_delete_tag(mut self, rule: TagRuleConfig) -> Self {
        self.delete_tags.push(rule);
        self
    }

    /// Set interval stamping
    pub fn with_interval_timestamp(mut self, enabled: bool) -> Self {
        self.interval_timestamp = enabled;
        self
    }

    /// Total number of tag rules
    pub fn rule_count(&self) -> usize {
        self.add_tags.len() + self.delete_tags.len()
    }
}
