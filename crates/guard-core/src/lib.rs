//! Command Guard and Approval Core.
//!
//! Six cooperating components, kept as small pure/async modules so each can
//! be fuzzed and unit-tested in isolation: the command classifier, the
//! path classifier, the approval store, the per-user serializer, the
//! outbound rate limiter, and the prompt-injection filter. Pattern tables
//! are data (see `patterns`), not code, so a deployment extends coverage
//! without touching classifier logic.

pub mod approval_store;
pub mod command_classifier;
pub mod error;
pub mod injection_filter;
pub mod path_classifier;
pub mod patterns;
pub mod rate_limiter;
pub mod types;
pub mod user_lock;

pub use approval_store::ApprovalStore;
pub use command_classifier::CommandClassifier;
pub use error::{GuardError, GuardResult};
pub use injection_filter::InjectionFilter;
pub use path_classifier::PathClassifier;
pub use rate_limiter::RateLimiter;
pub use types::{CommandDecision, PathDecision, PendingCommand};
pub use user_lock::UserSerializer;
