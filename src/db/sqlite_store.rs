use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    Row, Sqlite,
    migrate::MigrateDatabase,
    sqlite::{SqlitePool, SqlitePoolOptions},
};

use super::BallotStore;
use crate::error::StoreError;
use crate::models::{Ballot, Score};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn connect(db_url: &str) -> Result<Self, StoreError> {
        let in_memory = db_url.contains(":memory:");

        // Create database if it doesn't exist
        if !in_memory && !Sqlite::database_exists(db_url).await? {
            Sqlite::create_database(db_url).await?;
        }

        let pool = pool_options(in_memory).connect(db_url).await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ballots (
                voter TEXT NOT NULL,
                destination TEXT NOT NULL,
                score INTEGER NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (voter, destination)
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

// An in-memory database only lives as long as its one connection, so that
// connection must never be reaped.
fn pool_options(in_memory: bool) -> SqlitePoolOptions {
    if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    }
}

#[async_trait]
impl BallotStore for SqliteStore {
    async fn upsert(&self, voter: &str, scores: &Ballot) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        for (destination, score) in scores.iter() {
            sqlx::query(
                r#"
                INSERT INTO ballots (voter, destination, score, updated_at)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(voter, destination)
                DO UPDATE SET score = excluded.score, updated_at = excluded.updated_at
                "#,
            )
            .bind(voter)
            .bind(destination)
            .bind(score.value() as i64)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn read(&self, voter: &str) -> Result<Ballot, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT destination, score
            FROM ballots
            WHERE voter = ?
            "#,
        )
        .bind(voter)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let destination = row.get::<String, _>("destination");
                let raw = row.get::<i64, _>("score");
                match Score::new(raw) {
                    Some(score) => Ok((destination, score)),
                    None => Err(StoreError::Corrupt {
                        voter: voter.to_string(),
                        destination,
                        value: raw.to_string(),
                    }),
                }
            })
            .collect()
    }
}
