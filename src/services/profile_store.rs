//! Profile store
//!
//! The only owner of mutable tracking state. Entries live in a sharded map so
//! distinct users never contend on one global lock; a mutation holds only its
//! entry's shard for the duration of a synchronous closure.

use dashmap::DashMap;

use crate::error::{AppError, Result};
use crate::models::{UserId, UserRecord};
use crate::services::goals;

/// Profile store trait
pub trait ProfileStore: Send + Sync {
    /// Snapshot of a user's record
    fn get(&self, user_id: UserId) -> Result<UserRecord>;

    /// Insert or fully replace a user's record
    fn put(&self, user_id: UserId, record: UserRecord);

    /// Mutate a record in place
    fn modify(&self, user_id: UserId, f: &mut dyn FnMut(&mut UserRecord)) -> Result<()>;

    fn contains(&self, user_id: UserId) -> bool;

    /// Number of stored profiles
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start a new tracking day
    ///
    /// Clears the ledger and recomputes the water goal from the stored
    /// profile and the current temperature.
    fn reset_day(&self, user_id: UserId, temperature: f64) -> Result<UserRecord> {
        let mut snapshot = None;
        self.modify(user_id, &mut |record| {
            let water_goal = goals::water_goal_for(&record.profile, temperature);
            record.start_new_day(water_goal);
            snapshot = Some(record.clone());
        })?;
        snapshot.ok_or(AppError::ProfileNotFound(user_id))
    }
}

/// In-memory store, process lifetime only
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    records: DashMap<UserId, UserRecord>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn get(&self, user_id: UserId) -> Result<UserRecord> {
        self.records
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .ok_or(AppError::ProfileNotFound(user_id))
    }

    fn put(&self, user_id: UserId, record: UserRecord) {
        self.records.insert(user_id, record);
    }

    fn modify(&self, user_id: UserId, f: &mut dyn FnMut(&mut UserRecord)) -> Result<()> {
        let mut entry = self
            .records
            .get_mut(&user_id)
            .ok_or(AppError::ProfileNotFound(user_id))?;
        f(entry.value_mut());
        Ok(())
    }

    fn contains(&self, user_id: UserId) -> bool {
        self.records.contains_key(&user_id)
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
