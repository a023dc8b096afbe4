//! Configuration validation
//!
//! Checks rule entries are structurally usable:
//! - Every rule has a non-empty key
//! - Every rule has a non-empty condition
//!
//! Empty keys and conditions are rejected at load time. An empty key would
//! add a tag that line protocol cannot encode, and an empty condition is
//! neither `"*"` nor an expression, so it could never match. Failing `init`
//! surfaces the mistake instead of leaving a rule that silently does nothing.
//!
//! Condition syntax is not checked here. A rule whose expression cannot be
//! parsed loads fine and simply never matches.

use crate::error::{ConfigError, Result};
use crate::router::{RouterConfig, TagRuleConfig};

/// Validate the entire configuration
pub fn validate_config(config: &RouterConfig) -> Result<()> {
    validate_rules("add_tags", &config.add_tags)?;
    validate_rules("delete_tags", &config.delete_tags)?;
    Ok(())
}

fn validate_rules(list: &'static str, rules: &[TagRuleConfig]) -> Result<()> {
    for (i, rule) in rules.iter().enumerate() {
        if rule.key.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                list,
                format!("#{i}"),
                "key",
                "must not be empty",
            ));
        }

        if rule.condition.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                list,
                format!("#{i}"),
                "if",
                "must be \"*\" or an expression",
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = RouterConfig::new()
            .with_add_tag(TagRuleConfig::new("cluster", "c1", "*"))
            .with_delete_tag(TagRuleConfig::new("unit", "", "name == 'x'"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_key_rejected() {
        let config = RouterConfig::new()
            .with_add_tag(TagRuleConfig::new("ok", "v", "*"))
            .with_add_tag(TagRuleConfig::new("  ", "v", "*"));

        let err = validate_config(&config).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("add_tags"));
        assert!(msg.contains("#1"));
        assert!(msg.contains("key"));
    }

    #[test]
    fn test_empty_condition_rejected() {
        let config = RouterConfig::new().with_delete_tag(TagRuleConfig::new("k", "", ""));

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("delete_tags"));
        assert!(err.to_string().contains("if"));
    }

    #[test]
    fn test_malformed_expression_is_not_a_config_error() {
        let config = RouterConfig::new().with_add_tag(TagRuleConfig::new("k", "v", "value >>> 1"));
        assert!(validate_config(&config).is_ok());
    }
}
