//! Forbidden pattern table: secret-exfiltration attack classes.
//!
//! Order matters — the first matching rule's reason is reported, and the
//! forbidden table as a whole is evaluated before the dangerous table so
//! that an attack string which is *also* destructive (`rm -rf /run/secrets`)
//! cannot be downgraded to a mere approval prompt.

use std::sync::OnceLock;

use super::PatternRule;

/// Package names known to be malicious, reachable via an on-demand runner
/// (`npx`, `pnpm dlx`, `bunx`, `uvx`, `pipx run`). Trimmed sample of the
/// documented supply-chain attacks; extend via the YAML overlay for a fuller
/// list rather than growing this compiled-in set indefinitely.
const KNOWN_MALICIOUS_PACKAGES: &[&str] = &[
    "colourama",
    "ctx",
    "dpp",
    "event-stream",
    "flatmap-stream",
    "node-ipc",
    "ua-parser-js",
    "discord-selfbot-v13",
    "discord.js-selfbot-v13",
];

/// Compiled once at startup, not per call — matches the "built once,
/// read-only after that" contract every other pattern table follows.
fn on_demand_runner_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(
            r"(?:^|[;&|]\s*)(?:npx|bunx|uvx|pnpm\s+dlx|pipx\s+run)\s+(?:-y\s+|--yes\s+)?([A-Za-z0-9@._/-]+)",
        )
        .expect("static regex")
    })
}

/// Runner invocations that fetch and execute an arbitrary named package
/// on demand: `npx <pkg>`, `pnpm dlx <pkg>`, `bunx <pkg>`, `uvx <pkg>`,
/// `pipx run <pkg>`.
fn on_demand_runner_package(command: &str) -> Option<String> {
    let caps = on_demand_runner_regex().captures(command)?;
    let name = caps.get(1)?.as_str().to_lowercase();
    KNOWN_MALICIOUS_PACKAGES
        .iter()
        .any(|known| *known == name)
        .then_some(name)
}

/// Check `command` for a known-malicious on-demand package invocation.
/// Kept as a dedicated function (rather than a regex table entry) because
/// the decision depends on a curated name list, not a single pattern.
pub fn check_malicious_runner(command: &str) -> Option<String> {
    on_demand_runner_package(command)
        .map(|name| format!("Known-malicious package invoked via on-demand runner ({name})"))
}

pub fn default_forbidden_rules() -> Vec<PatternRule> {
    vec![
        // Secret path reads / listings.
        PatternRule::new(
            "secret-path-read",
            r"(?:/run/secrets(?:/\S*)?|/proc/(?:self|[0-9]+)/environ|(?:~|/home/[^/\s]+|/root)/\.ssh(?:/\S*)?|\B\.ssh/(?:id_rsa|id_ed25519|authorized_keys|config)\b)",
            "Secret path read",
        ),
        // Interpreter one-liners that dump the environment map.
        PatternRule::new(
            "interpreter-env-dump",
            r#"(?:python3?|node|nodejs|ruby|perl)\s+(?:-c|-e)\s+.*(?:os\.environ|process\.env|ENV\[|\$ENV\{)"#,
            "Environment dump via interpreter",
        ),
        // `env` / `printenv` / `export` / `set` used as standalone inspection
        // (not as a prefix like `env FOO=bar cmd`, which carries an argument
        // after the word and is left to `Allow`).
        PatternRule::new(
            "env-inspection-standalone",
            r"(?:^|[;&|]\s*)\s*\b(?:env|printenv|export|set)\b\s*(?:$|[;&|])",
            "Environment inspection",
        ),
        // $VARNAME echoes of well-known secret environment variables.
        PatternRule::new(
            "secret-var-echo",
            r"\becho\b[^\n]*\$\{?(?:TELEGRAM_BOT_TOKEN|OPENAI_API_KEY|ANTHROPIC_API_KEY|AWS_SECRET_ACCESS_KEY|DATABASE_URL|API_KEY|SECRET_KEY|PRIVATE_KEY)\b",
            "Secret environment variable echo",
        ),
        // Encoding tools applied to sensitive paths, or used to re-encode a
        // piped/redirected stdin stream (the classic exfil shape).
        PatternRule::new(
            "encoding-exfil-sensitive-path",
            r"\b(?:base64|xxd|hexdump|od|openssl\s+enc)\b[^\n]*(?:/run/secrets|\.ssh|\.env\b)",
            "Encoding pipeline for exfiltration",
        ),
        PatternRule::new(
            "encoding-exfil-stdin",
            r"(?:\|\s*(?:base64|xxd|hexdump|od|openssl\s+enc)\b|\b(?:base64|xxd|hexdump|od)\s*<\s*\S+)",
            "Encoding pipeline for exfiltration",
        ),
        // HTTP fetches targeting internal service hostnames (the LLM proxy
        // and other in-cluster services are never a legitimate agent target).
        PatternRule::new(
            "internal-service-contact",
            r"\b(?:curl|wget|nc|ncat)\b[^\n]*(?:proxy(?::\d+)?|llm-proxy(?::\d+)?|host\.docker\.internal|169\.254\.169\.254)",
            "Internal service contact",
        ),
    ]
}
