//! Configuration layer.
//!
//! Every tunable lives behind one typed `GuardConfig`, constructed once at
//! process start and threaded into each component's constructor — no
//! component re-reads the environment on every call. Uses an `env_or`/
//! `env_bool` alias-chain convention so a deployment can override a single
//! knob without a code change.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Read `primary`, falling back through `aliases` in order, else `default`.
fn env_or<F: FnOnce() -> String>(primary: &str, aliases: &[&str], default: F) -> String {
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default)
}

fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    match env_optional(primary, aliases) {
        Some(s) => !matches!(s.to_lowercase().as_str(), "0" | "false" | "no" | "off"),
        None => default,
    }
}

fn env_u64(primary: &str, aliases: &[&str], default: u64) -> u64 {
    env_optional(primary, aliases)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_usize(primary: &str, aliases: &[&str], default: usize) -> usize {
    env_optional(primary, aliases)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_u32(primary: &str, aliases: &[&str], default: u32) -> u32 {
    env_optional(primary, aliases)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Every knob in the configuration surface, aggregated so constructors
/// take a config snapshot instead of reading the environment themselves.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub global_min_interval: Duration,
    pub group_min_interval: Duration,
    pub max_retries: u32,
    pub retry_buffer: Duration,
    pub max_concurrent_users: usize,
    pub approval_ttl: Duration,
    pub llm_deadline: Duration,
    pub sandbox_deadline: Duration,
    pub sandbox_max_output_bytes: u64,
    pub message_max_chars: usize,
    pub pattern_file: Option<PathBuf>,
    pub listen_addr: String,
}

impl GuardConfig {
    /// Infallible: every field has a compiled-in default, so a deployment
    /// with no environment at all still runs with sane production settings.
    pub fn from_env() -> Self {
        Self {
            global_min_interval: Duration::from_millis(env_u64(
                "GUARD_GLOBAL_MIN_INTERVAL_MS",
                &[],
                200,
            )),
            group_min_interval: Duration::from_millis(env_u64(
                "GUARD_GROUP_MIN_INTERVAL_MS",
                &[],
                5_000,
            )),
            max_retries: env_u32("GUARD_MAX_RETRIES", &[], 3),
            retry_buffer: Duration::from_secs(env_u64("GUARD_RETRY_BUFFER_S", &[], 5)),
            max_concurrent_users: env_usize("GUARD_MAX_CONCURRENT_USERS", &[], 10),
            approval_ttl: Duration::from_secs(env_u64("GUARD_APPROVAL_TTL_S", &[], 300)),
            llm_deadline: Duration::from_secs(env_u64("GUARD_LLM_DEADLINE_S", &[], 120)),
            sandbox_deadline: Duration::from_secs(env_u64("GUARD_SANDBOX_DEADLINE_S", &[], 180)),
            sandbox_max_output_bytes: env_u64(
                "GUARD_SANDBOX_MAX_OUTPUT_BYTES",
                &[],
                10 * 1024 * 1024,
            ),
            message_max_chars: env_usize("GUARD_MESSAGE_MAX_CHARS", &[], 4_000),
            pattern_file: env_optional("GUARD_PATTERN_FILE", &[]).map(PathBuf::from),
            listen_addr: env_or("GUARD_LISTEN_ADDR", &[], || "0.0.0.0:8080".to_string()),
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Tracing env-filter directive and structured-JSON toggle.
pub struct LogConfig {
    pub filter: String,
    pub json: bool,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self {
            filter: env_or("RUST_LOG", &["GUARD_LOG_LEVEL"], || "guardbot=info,guard_core=info".to_string()),
            json: env_bool("GUARD_LOG_JSON", &[], false),
        }
    }
}
