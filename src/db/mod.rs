//! Vote storage.
//!
//! Each voter owns one sparse ballot: a hash of destination id to score. The
//! backends only need three things from the underlying store: merge fields
//! into a voter's hash, read the whole hash back, and (via an empty read)
//! tell whether the voter has stored anything at all.
//!
//! [`VoteStore`] layers catalog validation on top of a [`BallotStore`] so no
//! backend ever sees an unvalidated write.

mod memory_store;
mod redis_store;
mod sqlite_store;

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;
pub use sqlite_store::SqliteStore;

use async_trait::async_trait;
use log::info;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::config::StoreKind;
use crate::error::{AppError, StoreError};
use crate::models::{Ballot, Catalog};

#[async_trait]
pub trait BallotStore: Send + Sync {
    /// Writes every score in `scores` into the voter's hash, keeping other fields.
    async fn upsert(&self, voter: &str, scores: &Ballot) -> Result<(), StoreError>;

    /// Reads the voter's full hash; empty when nothing has been stored.
    async fn read(&self, voter: &str) -> Result<Ballot, StoreError>;
}

pub async fn connect(kind: &StoreKind) -> Result<Arc<dyn BallotStore>, StoreError> {
    let store: Arc<dyn BallotStore> = match kind {
        StoreKind::Memory => Arc::new(MemoryStore::new()),
        StoreKind::Redis(url) => Arc::new(RedisStore::connect(url).await?),
        StoreKind::Sqlite(url) => Arc::new(SqliteStore::connect(url).await?),
    };
    info!("Connected to {} store", kind);
    Ok(store)
}

#[derive(Clone)]
pub struct VoteStore {
    backend: Arc<dyn BallotStore>,
    catalog: Arc<Catalog>,
}

impl VoteStore {
    pub fn new(backend: Arc<dyn BallotStore>, catalog: Arc<Catalog>) -> Self {
        Self { backend, catalog }
    }

    /// Validates the whole submission first; on any rejection nothing is written.
    pub async fn submit(&self, voter: &str, scores: &Map<String, Value>) -> Result<(), AppError> {
        self.catalog.require_voter(voter)?;
        let ballot = self.catalog.validate_scores(scores)?;

        if ballot.is_empty() {
            return Ok(());
        }

        self.backend.upsert(voter, &ballot).await?;
        info!("Stored {} score(s) for {}", ballot.len(), voter);
        Ok(())
    }

    pub async fn fetch_ballot(&self, voter: &str) -> Result<Ballot, StoreError> {
        self.backend.read(voter).await
    }

    /// Every roster member with at least one stored score, in roster order.
    pub async fn fetch_all_ballots(&self) -> Result<Vec<(String, Ballot)>, StoreError> {
        let mut ballots = Vec::new();
        for voter in &self.catalog.voters {
            let ballot = self.backend.read(voter).await?;
            if !ballot.is_empty() {
                ballots.push((voter.clone(), ballot));
            }
        }
        Ok(ballots)
    }
}
