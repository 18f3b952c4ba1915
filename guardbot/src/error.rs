//! Maps `guard_core::GuardError` onto HTTP status codes.
//!
//! `GuardError` lives in `guard-core`, which has no `axum` dependency of its
//! own (it stays a plain library so the classifiers can be embedded without
//! pulling in a web stack). `ApiError` is the newtype this binary needs to
//! implement `axum::response::IntoResponse` for a foreign type, translating
//! each of the five propagation classes into a status code and a
//! single-sentence user-visible message — no stack traces cross the
//! boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use guard_core::GuardError;
use serde_json::json;

pub struct ApiError(pub GuardError);

impl From<GuardError> for ApiError {
    fn from(err: GuardError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            // The turn completed, just not as the LLM hoped: a policy
            // rejection or a pending approval are both 200s, not errors.
            GuardError::PolicyRejected(reason) => (StatusCode::OK, reason.clone()),
            GuardError::ApprovalRequired(pending) => (
                StatusCode::OK,
                format!("Approval required: {} (id={})", pending.reason, pending.id),
            ),
            GuardError::Transient(reason) => {
                tracing::warn!(reason = %reason, "transient provider error");
                (StatusCode::SERVICE_UNAVAILABLE, "temporarily unavailable, please retry".to_string())
            }
            GuardError::CapacityExceeded => (
                StatusCode::TOO_MANY_REQUESTS,
                "server busy, try again shortly".to_string(),
            ),
            GuardError::Internal(err) => {
                tracing::error!(error = %err, "internal fault handling turn");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(json!({ "response": message }))).into_response()
    }
}
