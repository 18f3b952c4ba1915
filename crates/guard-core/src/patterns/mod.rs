//! Declarative pattern tables for the command and injection classifiers.
//!
//! Patterns are data, not code: a `PatternRule` pairs a
//! regex with a human-readable reason, and the evaluation order of a table
//! is significant — it decides which reason is reported when a command
//! matches more than one rule. Tables ship with compiled-in defaults and can
//! be overridden wholesale from a YAML file at startup (no hot-reload).

pub mod config;
pub mod dangerous;
pub mod forbidden;
pub mod injection;

pub use config::PatternConfig;
pub use dangerous::default_dangerous_rules;
pub use forbidden::default_forbidden_rules;
pub use injection::default_injection_rules;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One `(regex, reason)` entry in an ordered pattern table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRule {
    pub id: String,
    pub pattern: String,
    pub reason: String,
}

impl PatternRule {
    pub fn new(id: &str, pattern: &str, reason: &str) -> Self {
        Self {
            id: id.to_string(),
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A compiled, orderable list of rules. Built once at startup; read-only
/// after that (matches the "pattern tables are read-only after
/// initialization" resource policy).
pub struct CompiledRules {
    rules: Vec<(Regex, String)>,
}

impl CompiledRules {
    /// Compile a rule table, skipping (and logging) any rule whose regex
    /// fails to compile rather than panicking — a malformed custom rule in a
    /// config file must not take the whole classifier down.
    pub fn compile(rules: &[PatternRule]) -> Self {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            match Regex::new(&rule.pattern) {
                Ok(re) => compiled.push((re, rule.reason.clone())),
                Err(err) => {
                    tracing::warn!(rule_id = %rule.id, error = %err, "skipping rule with invalid regex");
                }
            }
        }
        Self { rules: compiled }
    }

    /// Return the reason of the first rule (in declared order) matching `text`.
    pub fn first_match(&self, text: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(re, _)| re.is_match(text))
            .map(|(_, reason)| reason.as_str())
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.rules.iter().any(|(re, _)| re.is_match(text))
    }
}
