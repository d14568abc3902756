use serde::{Deserialize, Serialize};

/// Response for the matching endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingResponse {
    #[serde(rename = "resultId")]
    pub result_id: uuid::Uuid,
    #[serde(rename = "rankedCandidateIds")]
    pub ranked_candidate_ids: Vec<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
