//! Process-wide shared state: one instance per owning component. No
//! module-level mutable statics — every mutation happens behind the
//! component's own lock, reached through this struct.

use std::sync::Arc;

use guard_core::{ApprovalStore, CommandClassifier, InjectionFilter, PathClassifier, RateLimiter, UserSerializer};

use crate::config::GuardConfig;
use crate::turn::TurnHandler;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GuardConfig>,
    pub command_classifier: Arc<CommandClassifier>,
    pub path_classifier: Arc<PathClassifier>,
    pub approvals: Arc<ApprovalStore>,
    pub users: Arc<UserSerializer>,
    pub rate_limiter: Arc<RateLimiter>,
    pub injection_filter: Arc<InjectionFilter>,
    pub turn_handler: Arc<dyn TurnHandler>,
}
