pub mod average;

use serde::Serialize;

use crate::models::Destination;

// One voter's contribution to a destination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoterScore {
    pub voter: String,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationResult {
    pub destination: Destination,
    pub average_score: f64,
    pub votes: Vec<VoterScore>,
    pub total_votes: usize,
}

// Ranked report returned by the results endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsReport {
    pub results: Vec<DestinationResult>,
    pub voter_count: usize,
    pub voters: Vec<String>,
}
