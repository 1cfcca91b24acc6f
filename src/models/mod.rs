use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ValidationError};

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Destination {
    pub id: String,
    pub name: String,
    pub description: String,
    pub highlights: Vec<String>,
    pub pros: Vec<String>,
    pub best_for: String,
    pub programs: Vec<String>,
    pub comparison: String,
    pub travel_time: String,
    pub cost_category: String,
    pub image_urls: Vec<String>,
    pub image_alts: Vec<String>,
    pub fallback_gradient: String,
    pub fallback_emoji: String,
}

/// A single rating in `MIN_SCORE..=MAX_SCORE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub fn new(value: i64) -> Option<Self> {
        if (MIN_SCORE as i64..=MAX_SCORE as i64).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Accepts JSON integers (and integral floats such as `7.0`) in range.
    pub fn from_json(destination: &str, value: &Value) -> Result<Self, ValidationError> {
        let parsed = match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            }),
            _ => None,
        };

        parsed.and_then(Self::new).ok_or_else(|| ValidationError::InvalidScore {
            destination: destination.to_string(),
            value: value.to_string(),
        })
    }

    /// Parses the decimal text a store backend holds for a field.
    pub fn parse_stored(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().and_then(Self::new)
    }
}

/// One voter's scores keyed by destination id. Writes merge per key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ballot(BTreeMap<String, Score>);

impl Ballot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, destination_id: impl Into<String>, score: Score) {
        self.0.insert(destination_id.into(), score);
    }

    /// Overwrites the scores present in `other`, leaving every other key as it was.
    pub fn upsert(&mut self, other: &Ballot) {
        for (destination_id, score) in other.iter() {
            self.0.insert(destination_id.clone(), *score);
        }
    }

    pub fn get(&self, destination_id: &str) -> Option<Score> {
        self.0.get(destination_id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Score)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Score)> for Ballot {
    fn from_iter<I: IntoIterator<Item = (String, Score)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The closed voter roster and destination catalog, fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub voters: Vec<String>,
    pub destinations: Vec<Destination>,
}

impl Catalog {
    pub fn new(voters: Vec<String>, destinations: Vec<Destination>) -> Result<Self, ConfigError> {
        let catalog = Self {
            voters,
            destinations,
        };
        catalog.check()?;
        Ok(catalog)
    }

    pub fn builtin() -> Self {
        BUILTIN_CATALOG.clone()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::CatalogRead {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&raw, &display)
    }

    pub fn from_json(raw: &str, origin: &str) -> Result<Self, ConfigError> {
        let catalog: Catalog =
            serde_json::from_str(raw).map_err(|source| ConfigError::CatalogParse {
                path: origin.to_string(),
                source,
            })?;
        Self::new(catalog.voters, catalog.destinations)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.voters.is_empty() {
            return Err(ConfigError::InvalidCatalog("no voters defined".into()));
        }
        if self.destinations.is_empty() {
            return Err(ConfigError::InvalidCatalog("no destinations defined".into()));
        }

        let mut seen = HashSet::new();
        for voter in &self.voters {
            if voter.trim().is_empty() {
                return Err(ConfigError::InvalidCatalog("empty voter name".into()));
            }
            if !seen.insert(voter.as_str()) {
                return Err(ConfigError::InvalidCatalog(format!("duplicate voter {}", voter)));
            }
        }

        let mut seen = HashSet::new();
        for destination in &self.destinations {
            if destination.id.trim().is_empty() {
                return Err(ConfigError::InvalidCatalog("empty destination id".into()));
            }
            if !seen.insert(destination.id.as_str()) {
                return Err(ConfigError::InvalidCatalog(format!(
                    "duplicate destination {}",
                    destination.id
                )));
            }
        }

        Ok(())
    }

    pub fn is_voter(&self, name: &str) -> bool {
        self.voters.iter().any(|v| v == name)
    }

    pub fn destination(&self, id: &str) -> Option<&Destination> {
        self.destinations.iter().find(|d| d.id == id)
    }

    pub fn require_voter(&self, name: &str) -> Result<(), ValidationError> {
        if self.is_voter(name) {
            Ok(())
        } else {
            Err(ValidationError::UnknownVoter(name.to_string()))
        }
    }

    /// Checks every submitted (destination, score) pair against the catalog.
    pub fn validate_scores(&self, scores: &Map<String, Value>) -> Result<Ballot, ValidationError> {
        let mut ballot = Ballot::new();
        for (destination_id, value) in scores {
            if self.destination(destination_id).is_none() {
                return Err(ValidationError::UnknownDestination(destination_id.clone()));
            }
            ballot.insert(destination_id.clone(), Score::from_json(destination_id, value)?);
        }
        Ok(ballot)
    }
}

fn destination(
    id: &str,
    name: &str,
    description: &str,
    travel_time: &str,
    cost_category: &str,
    highlights: &[&str],
    fallback_emoji: &str,
) -> Destination {
    Destination {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        highlights: highlights.iter().map(|h| h.to_string()).collect(),
        travel_time: travel_time.to_string(),
        cost_category: cost_category.to_string(),
        fallback_gradient: "from-sky-400 to-indigo-500".to_string(),
        fallback_emoji: fallback_emoji.to_string(),
        ..Destination::default()
    }
}

lazy_static! {
    static ref BUILTIN_CATALOG: Catalog = Catalog {
        voters: ["Tomi", "Szandra", "Polli", "Adesz"]
            .iter()
            .map(|v| v.to_string())
            .collect(),
        destinations: vec![
            destination(
                "split",
                "Split, Croatia",
                "Old town inside a Roman palace, island ferries and warm Adriatic water.",
                "1.5h",
                "€€",
                &["Diocletian's Palace", "Hvar day trip", "Krka waterfalls"],
                "🏖️",
            ),
            destination(
                "crete",
                "Crete, Greece",
                "Long sandy beaches, gorges to hike and slow tavern dinners.",
                "2.5h",
                "€€",
                &["Balos lagoon", "Samaria gorge", "Knossos"],
                "🏛️",
            ),
            destination(
                "lake-garda",
                "Lake Garda, Italy",
                "Lakeside towns, cycling paths and a theme park for rainy days.",
                "1h",
                "€€€",
                &["Sirmione", "Gardaland", "Monte Baldo cable car"],
                "⛵",
            ),
            destination(
                "algarve",
                "Algarve, Portugal",
                "Cliffs, sea caves and surf schools on the Atlantic coast.",
                "3.5h",
                "€€€",
                &["Benagil cave", "Lagos old town", "Surf lessons"],
                "🌊",
            ),
        ],
    };
}
