//! Per-user turn serialization and bounded concurrency.
//!
//! `tokio::sync::Mutex` queues its waiters FIFO, which is exactly the
//! ordering guarantee this component needs: turns for one user execute in
//! the order they acquired the lock, turns for distinct users run fully in
//! parallel up to `max_concurrent_users`.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::error::{GuardError, GuardResult};

pub struct UserSerializer {
    max_concurrent: usize,
    locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
    active: Mutex<HashSet<i64>>,
}

impl UserSerializer {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent,
            locks: Mutex::new(HashMap::new()),
            active: Mutex::new(HashSet::new()),
        }
    }

    /// True if the user is already active (re-entrant queueing is fine —
    /// it just waits behind the current turn), or there is spare global
    /// capacity for a brand-new active user.
    pub fn can_accept(&self, user_id: i64) -> bool {
        let active = self.active.lock().expect("active set poisoned");
        active.contains(&user_id) || active.len() < self.max_concurrent
    }

    pub fn mark_active(&self, user_id: i64) {
        self.active.lock().expect("active set poisoned").insert(user_id);
    }

    pub fn mark_inactive(&self, user_id: i64) {
        self.active.lock().expect("active set poisoned").remove(&user_id);
    }

    pub fn active_count(&self) -> usize {
        self.active.lock().expect("active set poisoned").len()
    }

    fn lock_for(&self, user_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().expect("lock map poisoned");
        Arc::clone(
            locks
                .entry(user_id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    /// Run `turn` such that no other turn for `user_id` runs concurrently.
    /// Declines with `CapacityExceeded` up front rather than queuing beyond
    /// the per-user lock when global capacity is exhausted.
    ///
    /// `cancelled` resolves when the upstream front-end withdraws the turn;
    /// the lock is released at that point (or at the turn's own next
    /// suspension point) and `GuardError::Transient` is returned.
    pub async fn with_user_lock<T, TurnFut, CancelFut>(
        &self,
        user_id: i64,
        turn: impl FnOnce() -> TurnFut,
        cancelled: CancelFut,
    ) -> GuardResult<T>
    where
        TurnFut: Future<Output = T>,
        CancelFut: Future<Output = ()>,
    {
        if !self.can_accept(user_id) {
            return Err(GuardError::CapacityExceeded);
        }
        let lock = self.lock_for(user_id);
        let _guard = lock.lock().await;
        self.mark_active(user_id);

        tokio::pin!(cancelled);
        let turn_fut = turn();
        tokio::pin!(turn_fut);

        let result = tokio::select! {
            biased;
            _ = &mut cancelled => Err(GuardError::Transient("turn cancelled".to_string())),
            out = &mut turn_fut => Ok(out),
        };

        self.mark_inactive(user_id);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn turns_for_same_user_run_fifo() {
        let serializer = Arc::new(UserSerializer::new(10));
        let order = Arc::new(Mutex::new(Vec::new()));

        let s1 = Arc::clone(&serializer);
        let o1 = Arc::clone(&order);
        let t1 = tokio::spawn(async move {
            s1.with_user_lock(
                1,
                || async move {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    o1.lock().unwrap().push(1);
                },
                std::future::pending(),
            )
            .await
        });

        tokio::time::sleep(Duration::from_millis(5)).await;

        let s2 = Arc::clone(&serializer);
        let o2 = Arc::clone(&order);
        let t2 = tokio::spawn(async move {
            s2.with_user_lock(1, || async move { o2.lock().unwrap().push(2); }, std::future::pending())
                .await
        });

        t1.await.unwrap().unwrap();
        t2.await.unwrap().unwrap();
        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn distinct_users_run_concurrently() {
        let serializer = Arc::new(UserSerializer::new(10));
        let concurrent = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for user_id in 0..4 {
            let serializer = Arc::clone(&serializer);
            let concurrent = Arc::clone(&concurrent);
            let max_seen = Arc::clone(&max_seen);
            handles.push(tokio::spawn(async move {
                serializer
                    .with_user_lock(
                        user_id,
                        || async move {
                            let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                            max_seen.fetch_max(now, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            concurrent.fetch_sub(1, Ordering::SeqCst);
                        },
                        std::future::pending(),
                    )
                    .await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert!(max_seen.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn capacity_exceeded_declines_new_user() {
        let serializer = UserSerializer::new(1);
        serializer.mark_active(99);
        let result = serializer
            .with_user_lock(1, || async move {}, std::future::pending())
            .await;
        assert!(matches!(result, Err(GuardError::CapacityExceeded)));
    }

    #[tokio::test]
    async fn already_active_user_can_still_queue_another_turn() {
        let serializer = UserSerializer::new(1);
        serializer.mark_active(1);
        assert!(serializer.can_accept(1));
    }

    #[tokio::test]
    async fn cancellation_releases_the_lock() {
        let serializer = Arc::new(UserSerializer::new(10));
        let (tx, rx) = tokio::sync::oneshot::channel();
        let s = Arc::clone(&serializer);
        let handle = tokio::spawn(async move {
            s.with_user_lock(
                1,
                || async move {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                },
                async move {
                    let _ = rx.await;
                },
            )
            .await
        });
        tx.send(()).unwrap();
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(GuardError::Transient(_))));
        assert_eq!(serializer.active_count(), 0);
    }
}
