use log::{info, warn};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::models::Catalog;

const DEFAULT_PORT: &str = "3000";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_STORE_URL: &str = "sqlite:family_vote.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Redis(String),
    Sqlite(String),
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(url: &str) -> Result<Self, Self::Err> {
        if url == "memory" || url == "memory://" {
            Ok(StoreKind::Memory)
        } else if url.starts_with("redis://") || url.starts_with("rediss://") {
            Ok(StoreKind::Redis(url.to_string()))
        } else if url.starts_with("sqlite:") {
            Ok(StoreKind::Sqlite(url.to_string()))
        } else {
            Err(ConfigError::UnsupportedStore(url.to_string()))
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Memory => write!(f, "memory"),
            StoreKind::Redis(_) => write!(f, "redis"),
            StoreKind::Sqlite(url) => write!(f, "sqlite ({})", url),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,
    pub store: StoreKind,
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            bind_address: load(&lookup, "BIND_ADDRESS", DEFAULT_BIND_ADDRESS)?,
            port: load(&lookup, "PORT", DEFAULT_PORT)?,
            store: load(&lookup, "STORE_URL", DEFAULT_STORE_URL)?,
            catalog_path: lookup("CATALOG_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn load_catalog(&self) -> Result<Catalog, ConfigError> {
        match &self.catalog_path {
            Some(path) => {
                info!("Loading catalog from {}", path.display());
                Catalog::from_file(path)
            }
            None => {
                info!("CATALOG_PATH not set, using built-in catalog");
                Ok(Catalog::builtin())
            }
        }
    }
}

fn load<T, F>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).unwrap_or_else(|| {
        warn!("{} not set, using default: {}", key, default);
        default.to_string()
    });

    value.parse().map_err(|_| ConfigError::InvalidVar {
        key: key.to_string(),
        value,
    })
}
