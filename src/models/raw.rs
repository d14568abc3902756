use serde::{Deserialize, Serialize};
use serde_json::Value;

/// User row as delivered by a data loader, before normalization
///
/// Attribute fields keep whatever shape the source stored: a bare string,
/// a list, an enum object (`{"value": ..}`) or a labeled object
/// (`{"label": ..}` / `{"name": ..}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawUser {
    #[serde(alias = "userId")]
    pub id: String,
    pub grade: Value,
    pub location: Value,
    pub company: Value,
    #[serde(alias = "expertiseAreas", alias = "expertise_area")]
    pub expertise_areas: Value,
    pub skills: Value,
    pub languages: Value,
    pub industries: Value,
    pub availability: Value,
    #[serde(alias = "meetingFormats")]
    pub meeting_formats: Value,
    #[serde(alias = "communicationStyle", alias = "communication_style")]
    pub communication_styles: Value,
}

/// Requester row: the user plus the intent being matched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRequester {
    pub user: RawUser,
    #[serde(alias = "intentId")]
    pub intent_id: String,
    #[serde(alias = "intentType")]
    pub intent_type: Value,
    pub content: serde_json::Map<String, Value>,
}

/// Scraped external profile in its stored shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawExternalProfile {
    #[serde(alias = "followers", alias = "followerCount")]
    pub follower_count: Value,
    pub headline: Value,
    #[serde(alias = "about")]
    pub summary: Value,
    pub skills: Value,
    pub location: Value,
    #[serde(alias = "experience", alias = "workHistory")]
    pub work_history: Vec<Value>,
    pub education: Vec<Value>,
}
