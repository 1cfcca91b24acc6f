use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::BallotStore;
use crate::error::StoreError;
use crate::models::Ballot;

// Process-local ballots. Lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    ballots: RwLock<HashMap<String, Ballot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BallotStore for MemoryStore {
    async fn upsert(&self, voter: &str, scores: &Ballot) -> Result<(), StoreError> {
        self.ballots
            .write()
            .await
            .entry(voter.to_string())
            .or_default()
            .upsert(scores);
        Ok(())
    }

    async fn read(&self, voter: &str) -> Result<Ballot, StoreError> {
        Ok(self
            .ballots
            .read()
            .await
            .get(voter)
            .cloned()
            .unwrap_or_default())
    }
}
