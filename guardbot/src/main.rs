//! guardbot: HTTP front door over the Command Guard and Approval Core.
//!
//! Wires the six guard-core components behind three HTTP
//! operations (`/api/chat`, `/api/clear_session`, `/healthz`) on one `axum`
//! router, run on a `tokio` multi-thread runtime.
//! The Telegram messaging front-end and the real LLM proxy are out-of-scope
//! external collaborators; this binary ships a stub turn handler so the
//! service is runnable and its wiring testable end to end on its own.

mod api;
mod config;
mod error;
mod observability;
mod state;
mod turn;

use std::sync::Arc;

use guard_core::{ApprovalStore, CommandClassifier, InjectionFilter, PathClassifier, RateLimiter, UserSerializer};
use guard_core::patterns::PatternConfig;

use config::{GuardConfig, LogConfig};
use state::AppState;
use turn::{StubTurnHandler, TurnHandler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_config = LogConfig::from_env();
    observability::init_tracing(&log_config);

    let config = Arc::new(GuardConfig::from_env());
    tracing::info!(listen_addr = %config.listen_addr, "starting guardbot");

    let patterns = PatternConfig::load_or_default(config.pattern_file.as_deref());
    let command_classifier = Arc::new(CommandClassifier::from_rules(
        patterns.forbidden_rules(),
        patterns.dangerous_rules(),
    ));
    let injection_filter = Arc::new(InjectionFilter::from_rules(patterns.injection_rules()));
    let path_classifier = Arc::new(PathClassifier::new());
    let approvals = Arc::new(ApprovalStore::with_ttl(config.approval_ttl.as_secs()));
    let users = Arc::new(UserSerializer::new(config.max_concurrent_users));
    let rate_limiter = Arc::new(RateLimiter::new(
        config.global_min_interval,
        config.group_min_interval,
        config.retry_buffer,
    ));
    let turn_handler: Arc<dyn TurnHandler> =
        Arc::new(StubTurnHandler::new(command_classifier.clone(), approvals.clone()));

    let state = AppState {
        config: config.clone(),
        command_classifier,
        path_classifier,
        approvals,
        users,
        rate_limiter,
        injection_filter,
        turn_handler,
    };

    let app = api::router(state).layer(tower_http::trace::TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.listen_addr.as_str()).await?;
    tracing::info!(addr = %config.listen_addr, "guardbot listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received, draining in-flight turns");
}
