//! The "LLM loop" hook that a real deployment plugs in.
//!
//! The LLM proxy and model invocation are an out-of-scope external
//! collaborator: this binary only owns the guard core. `TurnHandler` is a
//! typed callback-injection interface — the messaging/LLM layer implements
//! it, the core depends only on the trait. `StubTurnHandler` is the
//! compiled-in default: it exercises the classifier/approval wiring end-to-end against
//! a minimal `!run <command>` convention so the service is runnable and
//! testable standalone, without pretending to be a real model.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use guard_core::{ApprovalStore, CommandClassifier, CommandDecision};

use crate::api::ChatTurnRequest;

pub type TurnFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;

pub trait TurnHandler: Send + Sync {
    fn handle_turn<'a>(&'a self, request: &'a ChatTurnRequest) -> TurnFuture<'a>;
}

pub struct StubTurnHandler {
    classifier: Arc<CommandClassifier>,
    approvals: Arc<ApprovalStore>,
}

impl StubTurnHandler {
    pub fn new(classifier: Arc<CommandClassifier>, approvals: Arc<ApprovalStore>) -> Self {
        Self { classifier, approvals }
    }
}

impl TurnHandler for StubTurnHandler {
    fn handle_turn<'a>(&'a self, request: &'a ChatTurnRequest) -> TurnFuture<'a> {
        Box::pin(async move {
            let Some(command) = request.message.strip_prefix("!run ") else {
                return Ok(format!(
                    "(no LLM configured) echoing: {}",
                    request.message
                ));
            };

            match self.classifier.classify(command) {
                CommandDecision::Forbidden { reason } => {
                    tracing::warn!(user_id = request.user_id, command, reason, "forbidden command rejected");
                    Ok(format!("I can't do that: {reason}"))
                }
                CommandDecision::Dangerous { reason } => {
                    let id = self.approvals.store(
                        request.user_id.to_string(),
                        request.chat_id,
                        command,
                        "/workspace",
                        reason.clone(),
                    );
                    Ok(format!(
                        "This needs your approval — {reason}. Reply /approve {id} or /deny {id}."
                    ))
                }
                CommandDecision::Allow => {
                    Ok(format!("(sandbox hand-off stubbed) would run: {command}"))
                }
            }
        })
    }
}
