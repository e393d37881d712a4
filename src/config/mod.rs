use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{LintError, Result};
use crate::rules::policy::Policy;

/// Default config file name, looked up in the project root.
pub const CONFIG_FILE: &str = ".droidlint.toml";

/// Top-level configuration from `.droidlint.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub policy: Policy,
    /// Per-detector settings, keyed by issue id (`[rules.TooDeepLayout]`).
    #[serde(default)]
    pub rules: HashMap<String, toml::Table>,
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Typed settings for one rule; defaults when the table is absent.
    pub fn rule_settings<T>(&self, issue_id: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let table = self
            .rules
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(issue_id))
            .map(|(_, table)| table);
        match table {
            Some(table) => toml::Value::Table(table.clone())
                .try_into::<T>()
                .map_err(|e| LintError::Config(format!("[rules.{issue_id}]: {e}"))),
            None => Ok(T::default()),
        }
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# droidlint configuration

[policy]
# Minimum severity to fail the run (informational, warning, error, fatal).
fail_on = "error"

# Issue ids to turn off. "all" turns off everything not listed in `enable`.
# disable = ["HardcodedText"]

# Issue ids to turn on, including ones that are off by default.
# enable = ["UseSparseArrays"]

# Honour <!--suppress Id --> and //noinspection Id comments.
check_comments = true

# Report warnings as errors.
warnings_as_errors = false

# Per-issue severity overrides.
# [policy.overrides]
# ShowToast = "error"

# Per-issue path globs (relative to the project root) that are not checked.
# [policy.ignore_paths]
# TooDeepLayout = ["res/layout/legacy_*.xml"]

# Per-rule settings.
# [rules.TooDeepLayout]
# max_depth = 10
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Severity;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct DepthSettings {
        max_depth: Option<usize>,
    }

    #[test]
    fn starter_config_parses() {
        let config: Config = toml::from_str(Config::starter_toml()).unwrap();
        assert_eq!(config.policy.fail_on, Severity::Error);
        assert!(config.policy.check_comments);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = Config::load(Path::new("/nonexistent/.droidlint.toml")).unwrap();
        assert_eq!(config.policy.fail_on, Severity::Error);
    }

    #[test]
    fn rule_settings_are_typed() {
        let config: Config = toml::from_str(
            r#"
[rules.TooDeepLayout]
max_depth = 7
"#,
        )
        .unwrap();
        let settings: DepthSettings = config.rule_settings("TooDeepLayout").unwrap();
        assert_eq!(settings.max_depth, Some(7));
        let any_case: DepthSettings = config.rule_settings("toodeeplayout").unwrap();
        assert_eq!(any_case.max_depth, Some(7));
        let absent: DepthSettings = config.rule_settings("Other").unwrap();
        assert_eq!(absent, DepthSettings::default());
    }

    #[test]
    fn malformed_rule_settings_rejected() {
        let config: Config = toml::from_str(
            r#"
[rules.TooDeepLayout]
max_depth = "deep"
"#,
        )
        .unwrap();
        let result: Result<DepthSettings> = config.rule_settings("TooDeepLayout");
        assert!(matches!(result, Err(LintError::Config(_))));
    }
}
