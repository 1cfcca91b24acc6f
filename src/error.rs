use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::{error, warn};
use serde_json::json;
use thiserror::Error;

// Rejections of caller input. Nothing is written when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown voter: {0}")]
    UnknownVoter(String),

    #[error("Unknown destination: {0}")]
    UnknownDestination(String),

    #[error("Invalid score for {destination}: {value}")]
    InvalidScore { destination: String, value: String },

    #[error("voter parameter is required")]
    MissingVoter,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Database error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Corrupt score stored for {voter}/{destination}: {value}")]
    Corrupt {
        voter: String,
        destination: String,
        value: String,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}'")]
    InvalidVar { key: String, value: String },

    #[error("Failed to read catalog {path}: {source}")]
    CatalogRead {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse catalog {path}: {source}")]
    CatalogParse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Unsupported store URL: {0}")]
    UnsupportedStore(String),
}

// Anything that stops the server before it starts serving.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to initialize store: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(e) => {
                warn!("Rejected request: {}", e);
                StatusCode::BAD_REQUEST
            }
            AppError::Store(e) => {
                error!("Store failure: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let response = AppError::from(ValidationError::UnknownVoter("Bob".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn corrupt_store_maps_to_server_error() {
        let err = StoreError::Corrupt {
            voter: "Tomi".into(),
            destination: "crete".into(),
            value: "eleven".into(),
        };
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn messages_name_the_offender() {
        let err = ValidationError::InvalidScore {
            destination: "crete".into(),
            value: "11".into(),
        };
        assert_eq!(err.to_string(), "Invalid score for crete: 11");
        assert_eq!(
            ValidationError::UnknownDestination("atlantis".into()).to_string(),
            "Unknown destination: atlantis"
        );
    }
}
