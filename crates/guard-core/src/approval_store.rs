//! In-memory store of dangerous commands awaiting human approval.
//!
//! TTL = 300s. Eviction is lazy — checked under the same lock as every read
//! so a consume and a concurrent sweep can't race on the same id. `consume`
//! is atomic read-and-remove: exactly one of two concurrent callers for the
//! same id gets the record, the other gets `None`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::types::PendingCommand;

const DEFAULT_TTL_SECS: u64 = 300;

pub struct ApprovalStore {
    ttl_secs: u64,
    inner: Mutex<HashMap<String, PendingCommand>>,
}

impl ApprovalStore {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL_SECS)
    }

    pub fn with_ttl(ttl_secs: u64) -> Self {
        Self {
            ttl_secs,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Insert a dangerous command awaiting approval. Returns its opaque id.
    pub fn store(
        &self,
        session_id: impl Into<String>,
        chat_id: i64,
        command: impl Into<String>,
        cwd: impl Into<String>,
        reason: impl Into<String>,
    ) -> String {
        let id = new_id();
        let record = PendingCommand {
            id: id.clone(),
            session_id: session_id.into(),
            chat_id,
            command: command.into(),
            cwd: cwd.into(),
            reason: reason.into(),
            created_at: now(),
        };
        let mut guard = self.inner.lock().expect("approval store poisoned");
        self.sweep_locked(&mut guard);
        guard.insert(id.clone(), record);
        id
    }

    /// Atomic read-and-remove. Returns `None` if the id is missing, already
    /// consumed, or expired — TTL expiry must never execute the command.
    pub fn consume(&self, id: &str) -> Option<PendingCommand> {
        let mut guard = self.inner.lock().expect("approval store poisoned");
        self.sweep_locked(&mut guard);
        guard.remove(id)
    }

    /// Snapshot of pending commands for a session, newest-insertion order
    /// not guaranteed (HashMap iteration order).
    pub fn list_by_session(&self, session_id: &str) -> Vec<PendingCommand> {
        let mut guard = self.inner.lock().expect("approval store poisoned");
        self.sweep_locked(&mut guard);
        guard
            .values()
            .filter(|p| p.session_id == session_id)
            .cloned()
            .collect()
    }

    /// Remove a pending command without returning it (used by "clear
    /// session" and explicit deny actions).
    pub fn cancel(&self, id: &str) -> bool {
        let mut guard = self.inner.lock().expect("approval store poisoned");
        self.sweep_locked(&mut guard);
        guard.remove(id).is_some()
    }

    /// Drop every pending command belonging to a session (clear-session op).
    pub fn cancel_session(&self, session_id: &str) -> usize {
        let mut guard = self.inner.lock().expect("approval store poisoned");
        let before = guard.len();
        guard.retain(|_, p| p.session_id != session_id);
        before - guard.len()
    }

    /// Explicit maintenance sweep for callers that want to bound memory
    /// between accesses (e.g. a periodic tick) rather than relying on the
    /// next read to evict.
    pub fn sweep(&self) -> usize {
        let mut guard = self.inner.lock().expect("approval store poisoned");
        let before = guard.len();
        self.sweep_locked(&mut guard);
        before - guard.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("approval store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sweep_locked(&self, guard: &mut HashMap<String, PendingCommand>) {
        let now = now();
        let ttl = self.ttl_secs;
        guard.retain(|_, p| now.saturating_sub(p.created_at) < ttl);
    }
}

impl Default for ApprovalStore {
    fn default() -> Self {
        Self::new()
    }
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Monotonic timestamp (ms) plus a random UUID suffix — far above the 48
/// bits of entropy the spec recommends, and not guessable across sessions.
fn new_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    format!("{millis:x}-{}", Uuid::new_v4().simple())
}
