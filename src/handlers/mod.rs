use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    routing::get,
};
use log::info;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;

use crate::db::VoteStore;
use crate::error::{AppError, ValidationError};
use crate::models::Catalog;
use crate::voting::{ResultsReport, average};

pub struct AppState {
    pub store: VoteStore,
    pub catalog: Arc<Catalog>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/votes", get(fetch_votes).post(submit_votes))
        .route("/api/results", get(results))
        .route("/api/destinations", get(destinations))
        .route("/api/voters", get(voters))
        .with_state(state)
}

// Older web clients send `familyMember` and `votes`.
#[derive(Debug, Deserialize)]
pub struct VoteSubmission {
    #[serde(alias = "familyMember")]
    pub voter: String,
    #[serde(alias = "votes")]
    pub scores: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct VoterQuery {
    #[serde(alias = "member")]
    pub voter: Option<String>,
}

pub async fn submit_votes(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VoteSubmission>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(submission) =
        payload.map_err(|e| ValidationError::MalformedPayload(e.body_text()))?;

    info!("Vote submission from {}", submission.voter);
    state.store.submit(&submission.voter, &submission.scores).await?;

    Ok(Json(json!({ "success": true })))
}

pub async fn fetch_votes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VoterQuery>,
) -> Result<Json<Value>, AppError> {
    let voter = query
        .voter
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingVoter)?;
    state.catalog.require_voter(&voter)?;

    let ballot = state.store.fetch_ballot(&voter).await?;
    Ok(Json(json!({ "scores": ballot })))
}

pub async fn results(State(state): State<Arc<AppState>>) -> Result<Json<ResultsReport>, AppError> {
    let ballots = state.store.fetch_all_ballots().await?;
    let report = average::calculate_results(&state.catalog.destinations, &ballots);
    Ok(Json(report))
}

pub async fn destinations(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "destinations": state.catalog.destinations }))
}

pub async fn voters(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "voters": state.catalog.voters }))
}
