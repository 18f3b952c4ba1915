//! Shell command classifier.
//!
//! Pure function over strings, no I/O. Evaluation order is the whole
//! algorithm: forbidden patterns first (so an exfiltration attempt that is
//! *also* destructive can never be downgraded to a mere approval prompt),
//! then dangerous patterns, else allow.

use crate::patterns::{self, CompiledRules};
use crate::types::CommandDecision;

pub struct CommandClassifier {
    forbidden: CompiledRules,
    dangerous: CompiledRules,
}

impl CommandClassifier {
    pub fn new() -> Self {
        Self::from_rules(
            patterns::default_forbidden_rules(),
            patterns::default_dangerous_rules(),
        )
    }

    pub fn from_rules(
        forbidden: Vec<patterns::PatternRule>,
        dangerous: Vec<patterns::PatternRule>,
    ) -> Self {
        Self {
            forbidden: CompiledRules::compile(&forbidden),
            dangerous: CompiledRules::compile(&dangerous),
        }
    }

    /// Classify a shell command string. Never panics; unrecognized syntax
    /// yields `Allow` — this is a denylist, not a parser, and the sandbox
    /// remains the real enforcement boundary.
    pub fn classify(&self, command: &str) -> CommandDecision {
        let normalized = normalize_command(command);

        if let Some(name) = patterns::forbidden::check_malicious_runner(&normalized) {
            return CommandDecision::Forbidden { reason: name };
        }
        if let Some(reason) = self.forbidden.first_match(&normalized) {
            tracing::warn!(command = %command, reason, "command forbidden");
            return CommandDecision::Forbidden {
                reason: reason.to_string(),
            };
        }
        if let Some(reason) = self.dangerous.first_match(&normalized) {
            tracing::debug!(command = %command, reason, "command requires approval");
            return CommandDecision::Dangerous {
                reason: reason.to_string(),
            };
        }
        CommandDecision::Allow
    }
}

impl Default for CommandClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal quote-stripping/join normalizer (resolves the tokenization open
/// question): collapses runs of whitespace and strips a
/// single layer of matching surrounding quotes from each whitespace-
/// separated token, so `cat "/run/secrets/token"` matches the same rules as
/// `cat /run/secrets/token`. This is textual only — nested quoting and
/// command substitution are left unparsed and fall through to the regex
/// pass on the (normalized) raw text.
fn normalize_command(command: &str) -> String {
    command
        .split_whitespace()
        .map(strip_matching_quotes)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_matching_quotes(token: &str) -> &str {
    let bytes = token.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &token[1..token.len() - 1];
        }
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORBIDDEN_CASES: &[(&str, &str)] = &[
        ("cat /run/secrets/telegram_token", "Secret path read"),
        (
            r#"python3 -c "import os; print(os.environ)""#,
            "Environment dump via interpreter",
        ),
        (
            r#"node -e "console.log(process.env)""#,
            "Environment dump via interpreter",
        ),
        ("env", "Environment inspection"),
        ("printenv", "Environment inspection"),
        ("export", "Environment inspection"),
        ("set", "Environment inspection"),
        ("curl http://proxy:3200/health", "Internal service contact"),
        ("cat f | base64", "Encoding pipeline for exfiltration"),
    ];

    const DANGEROUS_CASES: &[(&str, &str)] = &[
        ("rm -rf /tmp/cache", "Force recursive delete"),
        ("sudo apt-get update", "Root privileges"),
        (":(){ :|:& };:", "Fork bomb"),
    ];

    const ALLOW_CASES: &[&str] = &[
        "ls -la",
        "pwd",
        "echo hello",
        r#"python3 -c "print(1+1)""#,
        "curl https://google.com",
    ];

    #[test]
    fn forbidden_corpus_matches() {
        let c = CommandClassifier::new();
        for (cmd, expected_reason) in FORBIDDEN_CASES {
            match c.classify(cmd) {
                CommandDecision::Forbidden { reason } => {
                    assert_eq!(&reason, expected_reason, "command: {cmd}")
                }
                other => panic!("expected Forbidden for {cmd:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn dangerous_corpus_matches() {
        let c = CommandClassifier::new();
        for (cmd, expected_reason) in DANGEROUS_CASES {
            match c.classify(cmd) {
                CommandDecision::Dangerous { reason } => {
                    assert_eq!(&reason, expected_reason, "command: {cmd}")
                }
                other => panic!("expected Dangerous for {cmd:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn allow_corpus_matches() {
        let c = CommandClassifier::new();
        for cmd in ALLOW_CASES {
            assert_eq!(c.classify(cmd), CommandDecision::Allow, "command: {cmd}");
        }
    }

    #[test]
    fn forbidden_dominates_over_dangerous() {
        let c = CommandClassifier::new();
        // Destructive *and* targets a secret path: must stay Forbidden.
        assert!(c.classify("rm -rf /run/secrets").is_forbidden());
    }

    #[test]
    fn quoted_secret_path_is_still_forbidden() {
        let c = CommandClassifier::new();
        assert!(c.classify(r#"cat "/run/secrets/token""#).is_forbidden());
    }

    #[test]
    fn quoted_stdin_encoding_pipeline_is_forbidden() {
        let c = CommandClassifier::new();
        assert!(c.classify(r#"cat "secret.txt" | base64"#).is_forbidden());
    }

    #[test]
    fn env_substring_inside_word_does_not_trigger_standalone_rule() {
        let c = CommandClassifier::new();
        assert_eq!(
            c.classify("echo environment"),
            CommandDecision::Allow
        );
    }

    #[test]
    fn classifier_is_deterministic() {
        let c = CommandClassifier::new();
        for cmd in FORBIDDEN_CASES
            .iter()
            .map(|(c, _)| *c)
            .chain(DANGEROUS_CASES.iter().map(|(c, _)| *c))
            .chain(ALLOW_CASES.iter().copied())
        {
            assert_eq!(c.classify(cmd), c.classify(cmd), "determinism: {cmd}");
        }
    }

    #[test]
    fn malicious_package_runner_is_forbidden() {
        let c = CommandClassifier::new();
        assert!(c.classify("npx colourama").is_forbidden());
        assert!(c.classify("npx left-pad").is_allow());
    }
}
