use thiserror::Error;

use crate::core::predictor::PredictorError;

/// Failures of the upstream data loader
#[derive(Debug, Error)]
pub enum DataAccessError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Requester not found: {0}")]
    RequesterNotFound(String),

    #[error("Intent {intent_id} not found for requester {requester_id}")]
    IntentNotFound {
        requester_id: String,
        intent_id: String,
    },

    #[error("Malformed row: {0}")]
    Malformed(String),

    #[error("Data source unavailable: {0}")]
    Unavailable(String),
}

/// Failures of the downstream result sink
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Result sink unavailable: {0}")]
    Unavailable(String),
}

/// Top-level error of one matching request
#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Data access error: {0}")]
    DataAccess(#[from] DataAccessError),

    #[error("Prediction error: {0}")]
    Prediction(PredictorError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl MatchingError {
    /// Stable machine-readable code, persisted with failed results
    pub fn code(&self) -> &'static str {
        match self {
            MatchingError::Configuration(_) => "configuration_error",
            MatchingError::DataAccess(_) => "data_access_error",
            MatchingError::Prediction(_) => "prediction_error",
            MatchingError::Persistence(_) => "persistence_error",
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, MatchingError::Configuration(_))
    }
}

impl From<PredictorError> for MatchingError {
    fn from(e: PredictorError) -> Self {
        if e.is_configuration() {
            MatchingError::Configuration(e.to_string())
        } else {
            MatchingError::Prediction(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(MatchingError::Configuration("x".into()).code(), "configuration_error");
        assert_eq!(
            MatchingError::from(DataAccessError::Unavailable("down".into())).code(),
            "data_access_error"
        );
        assert_eq!(
            MatchingError::from(PersistenceError::Unavailable("down".into())).code(),
            "persistence_error"
        );
    }

    #[test]
    fn test_unloaded_predictor_is_configuration_error() {
        let err = MatchingError::from(PredictorError::NotLoaded("gradient_boosted"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_message_keeps_source_details() {
        let err = MatchingError::from(DataAccessError::RequesterNotFound("u-1".into()));
        assert!(err.to_string().contains("u-1"));
    }
}
