//! Prompt-injection / jailbreak filter.
//!
//! Stateless and pure — a regex sweep over the default rule table from
//! `patterns::injection`, run before a user message reaches the LLM proxy.
//! A hit causes the caller to reject the turn with a deflection and skip the
//! LLM entirely; `check` additionally surfaces which rule matched for audit
//! logging.

use crate::patterns::{default_injection_rules, CompiledRules};

pub struct InjectionFilter {
    rules: CompiledRules,
}

impl InjectionFilter {
    pub fn new() -> Self {
        Self {
            rules: CompiledRules::compile(&default_injection_rules()),
        }
    }

    pub fn with_rules(rules: CompiledRules) -> Self {
        Self { rules }
    }

    pub fn from_rules(rules: Vec<crate::patterns::PatternRule>) -> Self {
        Self::with_rules(CompiledRules::compile(&rules))
    }

    /// True if any jailbreak/injection pattern matches `text`.
    pub fn is_injection(&self, text: &str) -> bool {
        self.rules.is_match(text)
    }

    /// Like `is_injection` but also returns the matched reason, useful for
    /// audit logging of what tripped the filter.
    pub fn check(&self, text: &str) -> Option<&str> {
        self.rules.first_match(text)
    }
}

impl Default for InjectionFilter {
    fn default() -> Self {
        Self::new()
    }
}
