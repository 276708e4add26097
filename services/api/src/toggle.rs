//! Presence/absence toggling of uniquely keyed relations
//!
//! Likes and subscriptions are both "flip on absence, flip off on presence"
//! records keyed by a composite of target and actor. Two requests toggling
//! the same key are serialised through a per-key async mutex, and the store
//! additionally enforces uniqueness so concurrent processes cannot create a
//! second record.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Result of a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Added,
    Removed,
}

impl ToggleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleOutcome::Added => "added",
            ToggleOutcome::Removed => "removed",
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, ToggleOutcome::Added)
    }
}

/// A relation whose records are identified by a composite key
pub trait ToggleRelation {
    type Key: Display + Send + Sync;

    /// Delete the record for `key`; true if one existed
    fn remove(&self, key: &Self::Key) -> impl Future<Output = Result<bool>> + Send;

    /// Insert the record for `key`; false if it was already present
    fn insert(&self, key: &Self::Key) -> impl Future<Output = Result<bool>> + Send;
}

/// Serialises toggles per composite key
#[derive(Clone, Default)]
pub struct ToggleResolver {
    slots: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl ToggleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the presence of `key` in `relation`
    pub async fn toggle<R>(&self, relation: &R, key: &R::Key) -> Result<ToggleOutcome>
    where
        R: ToggleRelation + Sync,
    {
        let lock_key = key.to_string();

        let slot = {
            let mut slots = self.slots.lock().await;
            slots.entry(lock_key.clone()).or_default().clone()
        };

        let outcome = {
            let _guard = slot.lock().await;
            Self::flip(relation, key).await
        };

        drop(slot);
        self.release(&lock_key).await;

        let outcome = outcome?;
        info!("Toggle {} -> {}", lock_key, outcome.as_str());
        Ok(outcome)
    }

    async fn flip<R>(relation: &R, key: &R::Key) -> Result<ToggleOutcome>
    where
        R: ToggleRelation + Sync,
    {
        if relation.remove(key).await? {
            return Ok(ToggleOutcome::Removed);
        }

        // a concurrent writer outside this process may have inserted first;
        // either way the record is present afterwards
        relation.insert(key).await?;
        Ok(ToggleOutcome::Added)
    }

    async fn release(&self, lock_key: &str) {
        let mut slots = self.slots.lock().await;
        if slots
            .get(lock_key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(lock_key);
        }
    }

    /// Number of keys with a toggle in flight
    pub async fn in_flight(&self) -> usize {
        self.slots.lock().await.len()
    }
}
