//! In-memory implementation of the ChallengeStore trait.
//!
//! Backed by a sharded concurrent map, so sessions on different shards never
//! contend. All challenges are lost when the store is dropped.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::StoreError;
use crate::store::{Challenge, ChallengeStore};

/// Process-local challenge store.
#[derive(Debug, Default)]
pub struct MemoryChallengeStore {
    challenges: DashMap<String, Challenge>,
}

impl MemoryChallengeStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChallengeStore for MemoryChallengeStore {
    async fn put(&self, challenge: Challenge) -> Result<Option<Challenge>, StoreError> {
        Ok(self
            .challenges
            .insert(challenge.session_key.clone(), challenge))
    }

    async fn get(&self, session_key: &str) -> Result<Option<Challenge>, StoreError> {
        Ok(self.challenges.get(session_key).map(|c| c.clone()))
    }

    async fn remove(&self, session_key: &str) -> Result<Option<Challenge>, StoreError> {
        Ok(self.challenges.remove(session_key).map(|(_, c)| c))
    }

    async fn remove_if_value(&self, session_key: &str, value: &str) -> Result<bool, StoreError> {
        Ok(self
            .challenges
            .remove_if(session_key, |_, c| c.value == value)
            .is_some())
    }

    async fn remove_issued_before(&self, cutoff: u64) -> Result<usize, StoreError> {
        let mut removed = 0;
        self.challenges.retain(|_, c| {
            let keep = c.issued_at >= cutoff;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.challenges.len())
    }
}
