//! Structured logging.
//!
//! One `tracing` subscriber initialized at startup, env-filter driven, with
//! an optional JSON layer for log-aggregator ingestion — mirrors the
//! teacher's `init_tracing` shape (quiet toggle, `RUST_LOG`-first filter
//! resolution, JSON switch) without the audit/security-events side files,
//! which this project doesn't need.

use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::LogConfig;

pub fn init_tracing(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter.clone()));

    let result = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };

    if let Err(err) = result {
        eprintln!("tracing subscriber already initialized: {err}");
    }
}
