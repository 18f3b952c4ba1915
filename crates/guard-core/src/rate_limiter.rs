//! Outbound rate limiter.
//!
//! Serializes every outbound send through one process-wide queue (a
//! `tokio::sync::Mutex` held for the whole sleep-then-invoke critical
//! section), enforcing a global minimum interval and — for group chats,
//! `chat_id < 0` in the Telegram convention — a longer per-group interval.
//! Handles provider-side retry-after backoff with a bounded retry count.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;

/// Implemented by provider error types so the limiter can extract a
/// retry-after hint without depending on any particular HTTP client.
pub trait RetryableError {
    /// `Some(seconds)` if this error is a rate-limit response carrying a
    /// retry-after hint; `None` for any other error (logged once, no retry).
    fn retry_after_secs(&self) -> Option<u64>;
}

struct LimiterState {
    global_last_send: Option<Instant>,
    last_group_send: HashMap<i64, Instant>,
}

pub struct RateLimiter {
    global_min_interval: Duration,
    group_min_interval: Duration,
    retry_buffer: Duration,
    state: AsyncMutex<LimiterState>,
}

impl RateLimiter {
    pub fn new(global_min_interval: Duration, group_min_interval: Duration, retry_buffer: Duration) -> Self {
        Self {
            global_min_interval,
            group_min_interval,
            retry_buffer,
            state: AsyncMutex::new(LimiterState {
                global_last_send: None,
                last_group_send: HashMap::new(),
            }),
        }
    }

    fn is_group_chat(chat_id: i64) -> bool {
        chat_id < 0
    }

    /// Serialize, space, and retry a send. `send_fn` is called with no
    /// arguments and must return a fresh future each time (retries re-call
    /// it). Returns `None` once `max_retries` attempts are exhausted or a
    /// non-retryable error is returned.
    pub async fn send<F, Fut, T, E>(&self, chat_id: i64, max_retries: u32, send_fn: F) -> Option<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryableError + std::fmt::Display,
    {
        let mut attempt = 0u32;
        loop {
            // Hold the queue for the whole sleep-then-invoke critical
            // section: only one send is ever in flight at a time.
            let mut guard = self.state.lock().await;
            self.wait_for_slot(&mut guard, chat_id).await;

            let now = Instant::now();
            guard.global_last_send = Some(now);
            if Self::is_group_chat(chat_id) {
                guard.last_group_send.insert(chat_id, now);
            }

            let outcome = send_fn().await;
            drop(guard);

            match outcome {
                Ok(value) => return Some(value),
                Err(err) => {
                    if let Some(retry_after) = err.retry_after_secs() {
                        attempt += 1;
                        if attempt >= max_retries {
                            tracing::warn!(%chat_id, attempts = attempt, "rate limiter retries exhausted");
                            return None;
                        }
                        tracing::debug!(%chat_id, retry_after, "provider rate-limited, backing off");
                        tokio::time::sleep(Duration::from_secs(retry_after) + self.retry_buffer).await;
                        continue;
                    }
                    tracing::warn!(%chat_id, error = %err, "outbound send failed");
                    return None;
                }
            }
        }
    }

    async fn wait_for_slot(&self, guard: &mut tokio::sync::MutexGuard<'_, LimiterState>, chat_id: i64) {
        loop {
            let now = Instant::now();
            let global_wait = guard
                .global_last_send
                .map(|last| self.global_min_interval.saturating_sub(now.saturating_duration_since(last)))
                .unwrap_or(Duration::ZERO);
            let group_wait = if Self::is_group_chat(chat_id) {
                guard
                    .last_group_send
                    .get(&chat_id)
                    .map(|last| self.group_min_interval.saturating_sub(now.saturating_duration_since(*last)))
                    .unwrap_or(Duration::ZERO)
            } else {
                Duration::ZERO
            };
            let wait = global_wait.max(group_wait);
            if wait.is_zero() {
                return;
            }
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Never429;
    impl std::fmt::Display for Never429 {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "boom")
        }
    }
    impl RetryableError for Never429 {
        fn retry_after_secs(&self) -> Option<u64> {
            None
        }
    }

    #[tokio::test]
    async fn enforces_global_min_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(50), Duration::from_secs(5), Duration::from_secs(1));
        let t0 = Instant::now();
        limiter
            .send(1, 3, || async { Ok::<_, Never429>(()) })
            .await
            .unwrap();
        limiter
            .send(1, 3, || async { Ok::<_, Never429>(()) })
            .await
            .unwrap();
        assert!(t0.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn enforces_group_min_interval_for_negative_chat_ids() {
        let limiter = RateLimiter::new(Duration::from_millis(1), Duration::from_millis(80), Duration::from_secs(1));
        let t0 = Instant::now();
        limiter.send(-500, 3, || async { Ok::<_, Never429>(()) }).await.unwrap();
        limiter.send(-500, 3, || async { Ok::<_, Never429>(()) }).await.unwrap();
        assert!(t0.elapsed() >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn private_chats_are_not_subject_to_group_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(1), Duration::from_secs(5), Duration::from_secs(1));
        let t0 = Instant::now();
        limiter.send(500, 3, || async { Ok::<_, Never429>(()) }).await.unwrap();
        limiter.send(500, 3, || async { Ok::<_, Never429>(()) }).await.unwrap();
        assert!(t0.elapsed() < Duration::from_secs(1));
    }

    #[derive(Debug)]
    struct RateLimited(u64);
    impl std::fmt::Display for RateLimited {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "429, retry after {}s", self.0)
        }
    }
    impl RetryableError for RateLimited {
        fn retry_after_secs(&self) -> Option<u64> {
            Some(self.0)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_after_provider_backoff_then_succeeds() {
        let limiter = RateLimiter::new(Duration::from_millis(1), Duration::from_secs(5), Duration::from_millis(1));
        let attempts = Arc::new(AtomicU32::new(0));
        let a = Arc::clone(&attempts);
        let result = limiter
            .send(1, 3, move || {
                let a = Arc::clone(&a);
                async move {
                    let n = a.fetch_add(1, Ordering::SeqCst);
                    if n == 0 {
                        Err(RateLimited(1))
                    } else {
                        Ok(())
                    }
                }
            })
            .await;
        assert_eq!(result, Some(()));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_retries_and_returns_none() {
        let limiter = RateLimiter::new(Duration::from_millis(1), Duration::from_secs(5), Duration::from_millis(1));
        let result = limiter
            .send(1, 2, || async { Err::<(), _>(RateLimited(1)) })
            .await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn non_retryable_error_returns_none_immediately() {
        let limiter = RateLimiter::new(Duration::from_millis(1), Duration::from_secs(5), Duration::from_secs(1));
        let result = limiter.send(1, 3, || async { Err::<(), _>(Never429) }).await;
        assert_eq!(result, None);
    }
}
