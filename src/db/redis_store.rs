//! # Redis
//!
//! One hash per voter at `votes:<voter>`: fields are destination ids, values
//! are decimal scores. `HSET` merges, so a partial submission never clears
//! fields it does not name. A multi-field `HSET` is a single command, but
//! there is no transaction across voters.
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::collections::HashMap;

use super::BallotStore;
use crate::error::StoreError;
use crate::models::{Ballot, Score};

const KEY_PREFIX: &str = "votes";

pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let connection = open_client(redis_url)?.get_connection_manager().await?;
        Ok(Self { connection })
    }
}

// Accepts both `redis://` and TLS `rediss://` URLs. Does not touch the network.
pub(crate) fn open_client(redis_url: &str) -> Result<Client, StoreError> {
    Ok(Client::open(redis_url)?)
}

pub(crate) fn voter_key(voter: &str) -> String {
    format!("{KEY_PREFIX}:{voter}")
}

pub(crate) fn decode_fields(
    voter: &str,
    fields: HashMap<String, String>,
) -> Result<Ballot, StoreError> {
    fields
        .into_iter()
        .map(|(destination, raw)| match Score::parse_stored(&raw) {
            Some(score) => Ok((destination, score)),
            None => Err(StoreError::Corrupt {
                voter: voter.to_string(),
                destination,
                value: raw,
            }),
        })
        .collect()
}

#[async_trait]
impl BallotStore for RedisStore {
    async fn upsert(&self, voter: &str, scores: &Ballot) -> Result<(), StoreError> {
        let fields: Vec<(&str, i64)> = scores
            .iter()
            .map(|(destination, score)| (destination.as_str(), score.value() as i64))
            .collect();

        let mut connection = self.connection.clone();
        let _: () = connection.hset_multiple(voter_key(voter), &fields).await?;
        Ok(())
    }

    async fn read(&self, voter: &str) -> Result<Ballot, StoreError> {
        let mut connection = self.connection.clone();
        let fields: HashMap<String, String> = connection.hgetall(voter_key(voter)).await?;
        decode_fields(voter, fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_per_voter() {
        assert_eq!(voter_key("Szandra"), "votes:Szandra");
    }

    #[test]
    fn opens_plain_and_tls_clients() {
        assert!(open_client("redis://127.0.0.1:6379").is_ok());
        assert!(open_client("rediss://example.invalid:6380").is_ok());
        assert!(open_client("http://example.invalid").is_err());
    }

    #[test]
    fn decodes_hash_fields() {
        let fields = HashMap::from([
            ("crete".to_string(), "8".to_string()),
            ("split".to_string(), "10".to_string()),
        ]);
        let ballot = decode_fields("Tomi", fields).unwrap();
        assert_eq!(ballot.get("crete"), Score::new(8));
        assert_eq!(ballot.get("split"), Score::new(10));
    }

    #[test]
    fn empty_hash_is_an_empty_ballot() {
        assert!(decode_fields("Tomi", HashMap::new()).unwrap().is_empty());
    }

    #[test]
    fn out_of_range_field_is_corrupt() {
        let fields = HashMap::from([("crete".to_string(), "42".to_string())]);
        assert!(matches!(
            decode_fields("Tomi", fields),
            Err(StoreError::Corrupt { ref value, .. }) if value == "42"
        ));
    }
}
