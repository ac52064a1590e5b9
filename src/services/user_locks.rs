//! Per-user serialization
//!
//! Every event for a user runs while holding that user's async mutex, which
//! stays locked across awaited provider calls. Different users take
//! different mutexes and never wait on each other.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::UserId;

#[derive(Debug, Default)]
pub struct UserLocks {
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

/// Exclusive access to one user's state
///
/// Dropping it releases the mutex and forgets the entry once no other task
/// holds or waits on it, so the map only holds users with events in flight.
pub struct UserGuard<'a> {
    locks: &'a DashMap<UserId, Arc<Mutex<()>>>,
    user_id: UserId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to one user's state
    pub async fn acquire(&self, user_id: UserId) -> UserGuard<'_> {
        let lock = self.locks.entry(user_id).or_default().value().clone();
        UserGuard {
            locks: &self.locks,
            user_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Users with an event in flight or queued
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
