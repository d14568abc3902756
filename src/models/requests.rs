use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to rank candidates for one requester intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingRequest {
    pub requester_id: String,
    pub intent_id: String,
    pub settings_preset: String,
    pub top_n: usize,
}

impl MatchingRequest {
    pub fn new(requester_id: &str, intent_id: &str, settings_preset: &str, top_n: usize) -> Self {
        Self {
            requester_id: requester_id.to_string(),
            intent_id: intent_id.to_string(),
            settings_preset: settings_preset.to_string(),
            top_n,
        }
    }
}

/// HTTP body of a matching request; unset fields take the configured defaults
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchingRequestBody {
    #[validate(length(min = 1))]
    #[serde(alias = "requester_id", rename = "requesterId")]
    pub requester_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "intent_id", rename = "intentId")]
    pub intent_id: String,
    #[validate(length(min = 1))]
    #[serde(default, alias = "settings_preset", rename = "settingsPreset")]
    pub settings_preset: Option<String>,
    #[validate(range(min = 1, max = 500))]
    #[serde(default, alias = "top_n", rename = "topN")]
    pub top_n: Option<usize>,
}

impl MatchingRequestBody {
    pub fn into_request(self, default_preset: &str, default_top_n: usize) -> MatchingRequest {
        MatchingRequest {
            requester_id: self.requester_id,
            intent_id: self.intent_id,
            settings_preset: self.settings_preset.unwrap_or_else(|| default_preset.to_string()),
            top_n: self.top_n.unwrap_or(default_top_n),
        }
    }
}
