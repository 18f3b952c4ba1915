//! YAML-overlay loading for the pattern tables.
//!
//! Mirrors a familiar `RulesConfig::load_or_default` shape (a config
//! struct with `rules`/`disabled_rules`/`use_default_rules`, loaded from a
//! well-known file or defaulted): here a single file carries overlays for
//! all three tables the command/injection classifiers consume, since they
//! ship together as one deployment's policy.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{default_dangerous_rules, default_forbidden_rules, default_injection_rules, PatternRule};

fn default_true() -> bool {
    true
}

/// Overlay for the forbidden/dangerous/injection pattern tables. Extra rules
/// are appended after the compiled-in defaults (so their order is evaluated
/// last); `use_default_rules: false` drops the compiled-in set entirely and
/// relies solely on the file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PatternConfig {
    #[serde(default)]
    pub forbidden: Vec<PatternRule>,
    #[serde(default)]
    pub dangerous: Vec<PatternRule>,
    #[serde(default)]
    pub injection: Vec<PatternRule>,
    #[serde(default = "default_true")]
    pub use_default_rules: bool,
}

impl PatternConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read pattern config: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse pattern config: {}", path.display()))
    }

    /// Load from `path` if given and present, else the compiled-in defaults
    /// with no overlay. Never fails — a malformed overlay file is logged and
    /// falls back to defaults rather than taking the process down at
    /// startup, matching the classifier's own "must never raise" contract.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        if let Some(path) = path {
            if path.exists() {
                match Self::load_from_file(path) {
                    Ok(config) => return config,
                    Err(err) => {
                        tracing::warn!(path = %path.display(), error = %err, "ignoring invalid pattern config, using defaults");
                    }
                }
            }
        }
        Self::default()
    }

    pub fn forbidden_rules(&self) -> Vec<PatternRule> {
        self.merged(default_forbidden_rules(), &self.forbidden)
    }

    pub fn dangerous_rules(&self) -> Vec<PatternRule> {
        self.merged(default_dangerous_rules(), &self.dangerous)
    }

    pub fn injection_rules(&self) -> Vec<PatternRule> {
        self.merged(default_injection_rules(), &self.injection)
    }

    fn merged(&self, defaults: Vec<PatternRule>, overlay: &[PatternRule]) -> Vec<PatternRule> {
        if self.use_default_rules {
            let mut rules = defaults;
            rules.extend(overlay.iter().cloned());
            rules
        } else {
            overlay.to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_with_no_file_keep_compiled_in_rules() {
        let config = PatternConfig::load_or_default(None);
        assert_eq!(config.forbidden_rules().len(), default_forbidden_rules().len());
    }

    #[test]
    fn overlay_appends_after_defaults() {
        let config = PatternConfig {
            forbidden: vec![PatternRule::new("custom", r"\bmy-secret-tool\b", "Custom forbidden tool")],
            ..Default::default()
        };
        let rules = config.forbidden_rules();
        assert_eq!(rules.len(), default_forbidden_rules().len() + 1);
        assert_eq!(rules.last().unwrap().id, "custom");
    }

    #[test]
    fn use_default_rules_false_drops_compiled_in_set() {
        let config = PatternConfig {
            dangerous: vec![PatternRule::new("only", r"\bonly-this\b", "Only this")],
            use_default_rules: false,
            ..Default::default()
        };
        assert_eq!(config.dangerous_rules().len(), 1);
    }

    #[test]
    fn missing_file_path_falls_back_to_defaults() {
        let config = PatternConfig::load_or_default(Some(Path::new("/nonexistent/patterns.yaml")));
        assert_eq!(config.injection_rules().len(), default_injection_rules().len());
    }
}
