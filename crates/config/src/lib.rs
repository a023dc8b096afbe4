//! CCM Configuration
//!
//! Router configuration loading with sensible defaults.
//! An empty document is a valid configuration: no rules, no interval
//! stamping.
//!
//! # Parsing
//!
//! JSON is the native format. Use the `FromStr` trait to parse a string:
//!
//! ```
//! use ccm_config::RouterConfig;
//! use std::str::FromStr;
//!
//! let config = RouterConfig::from_str(r#"{"interval_timestamp": true}"#).unwrap();
//! assert!(config.interval_timestamp);
//! ```
//!
//! Files ending in `.toml` are parsed as TOML with the same schema:
//!
//! ```toml
//! interval_timestamp = true
//!
//! [[add_tags]]
//! key = "cluster"
//! value = "testcluster"
//! if = "*"
//! ```
//!
//! # Validation
//!
//! A rule with an empty `key` or `if` fails loading with
//! [`ConfigError::InvalidValue`]; such a rule could never take effect.
//! Expression syntax is left to the evaluator: an unparsable condition
//! loads and never matches.

mod error;
mod router;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use router::{RouterConfig, TagRuleConfig, WILDCARD_CONDITION};

impl RouterConfig {
    /// Load configuration from a file
    ///
    /// The format is chosen by extension: `.toml` is TOML, anything else is
    /// JSON.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, cannot be parsed, or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).map_err(|e| ConfigError::io(path.display().to_string(), e))?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Self::from_toml_str(&contents)
        } else {
            Self::from_str(&contents)
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: RouterConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse_json(s: &str) -> Result<Self> {
        // An empty file is treated like `{}`
        let config: RouterConfig = if s.trim().is_empty() {
            RouterConfig::default()
        } else {
            serde_json::from_str(s)?
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for RouterConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_json(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::str::FromStr;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RouterConfig::from_str("{}").unwrap();
        assert!(config.add_tags.is_empty());
        assert!(config.delete_tags.is_empty());
        assert!(!config.interval_timestamp);

        let config = RouterConfig::from_str("").unwrap();
        assert_eq!(config, RouterConfig::default());
    }

    #[test]
    fn test_full_config_parse() {
        let json = r#"
{
  "add_tags": [
    { "key": "cluster", "value": "testcluster", "if": "*" },
    { "key": "hot", "value": "true", "if": "value > 100" }
  ],
  "delete_tags": [
    { "key": "unit", "value": "*", "if": "*" }
  ],
  "interval_timestamp": true
}
"#;
        let config = RouterConfig::from_str(json).unwrap();

        assert_eq!(config.add_tags.len(), 2);
        assert_eq!(config.add_tags[0], TagRuleConfig::new("cluster", "testcluster", "*"));
        assert!(config.add_tags[0].is_wildcard());
        assert_eq!(config.add_tags[1].condition, "value > 100");
        assert!(!config.add_tags[1].is_wildcard());
        assert_eq!(config.delete_tags.len(), 1);
        assert_eq!(config.rule_count(), 3);
        assert!(config.interval_timestamp);
    }

    #[test]
    fn test_delete_rule_value_is_optional() {
        let config =
            RouterConfig::from_str(r#"{"delete_tags": [{"key": "unit", "if": "*"}]}"#).unwrap();
        assert_eq!(config.delete_tags[0].value, "");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = RouterConfig::from_str(r#"{"comment": "x", "add_tags": []}"#).unwrap();
        assert!(config.add_tags.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        let result = RouterConfig::from_str("{ invalid json");
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    fn test_wrong_value_type() {
        let result = RouterConfig::from_str(r#"{"interval_timestamp": "yes"}"#);
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));

        let result =
            RouterConfig::from_str(r#"{"add_tags": [{"key": 1, "value": "v", "if": "*"}]}"#);
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    fn test_missing_condition_is_parse_error() {
        let result = RouterConfig::from_str(r#"{"add_tags": [{"key": "k", "value": "v"}]}"#);
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let result =
            RouterConfig::from_str(r#"{"add_tags": [{"key": "", "value": "v", "if": "*"}]}"#);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_from_file_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"add_tags": [{{"key": "k", "value": "v", "if": "*"}}]}}"#
        )
        .unwrap();

        let config = RouterConfig::from_file(file.path()).unwrap();
        assert_eq!(config.add_tags.len(), 1);
    }

    #[test]
    fn test_from_file_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
interval_timestamp = true

[[add_tags]]
key = "cluster"
value = "c1"
if = "*"
"#
        )
        .unwrap();

        let config = RouterConfig::from_file(file.path()).unwrap();
        assert!(config.interval_timestamp);
        assert_eq!(config.add_tags[0].key, "cluster");
    }

    #[test]
    fn test_from_file_missing() {
        let result = RouterConfig::from_file("/nonexistent/router.json");
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }
}
