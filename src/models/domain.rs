use serde::{Deserialize, Serialize};
use std::fmt;

/// Seniority ladder, ordered from least to most senior
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Intern,
    Junior,
    Middle,
    Senior,
    Lead,
}

impl Grade {
    pub const ALL: [Grade; 5] = [
        Grade::Intern,
        Grade::Junior,
        Grade::Middle,
        Grade::Senior,
        Grade::Lead,
    ];

    /// Parse a grade label, accepting the common synonyms found in profiles
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "intern" | "trainee" | "student" => Some(Grade::Intern),
            "junior" | "jun" | "junior+" => Some(Grade::Junior),
            "middle" | "mid" | "middle+" | "intermediate" => Some(Grade::Middle),
            "senior" | "sen" | "senior+" => Some(Grade::Senior),
            "lead" | "teamlead" | "team lead" | "principal" | "staff" | "head" => Some(Grade::Lead),
            _ => None,
        }
    }

    /// Position on the ladder, used to index the grade matrix
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Intern => "intern",
            Grade::Junior => "junior",
            Grade::Middle => "middle",
            Grade::Senior => "senior",
            Grade::Lead => "lead",
        }
    }

    pub fn is_senior_or_above(self) -> bool {
        self >= Grade::Senior
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of connection the requester is looking for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentType {
    MockInterview,
    /// Requester looks for a mentor
    MentoringMentor,
    /// Requester looks for mentees
    MentoringMentee,
    ProjectContributor,
    FindCofounder,
    PetProject,
    Referral,
    ProfessionalNetworking,
    SocialExpansion,
    /// Anything the engine has no composite rule for
    #[default]
    #[serde(other)]
    Unknown,
}

impl IntentType {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "mock_interview" => IntentType::MockInterview,
            "mentoring_mentor" => IntentType::MentoringMentor,
            "mentoring_mentee" => IntentType::MentoringMentee,
            "project_contributor" | "projects" => IntentType::ProjectContributor,
            "find_cofounder" | "cofounder" => IntentType::FindCofounder,
            "pet_project" => IntentType::PetProject,
            "referral" | "referrals" => IntentType::Referral,
            "professional_networking" => IntentType::ProfessionalNetworking,
            "social_expansion" => IntentType::SocialExpansion,
            _ => IntentType::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IntentType::MockInterview => "mock_interview",
            IntentType::MentoringMentor => "mentoring_mentor",
            IntentType::MentoringMentee => "mentoring_mentee",
            IntentType::ProjectContributor => "project_contributor",
            IntentType::FindCofounder => "find_cofounder",
            IntentType::PetProject => "pet_project",
            IntentType::Referral => "referral",
            IntentType::ProfessionalNetworking => "professional_networking",
            IntentType::SocialExpansion => "social_expansion",
            IntentType::Unknown => "unknown",
        }
    }
}

/// Tiered location: city, then country, then region
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
}

impl Location {
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.country.is_none() && self.region.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub title: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub location: Option<Location>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub is_current: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub end_year: Option<i32>,
}

/// Externally scraped profile attached to a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalProfile {
    pub follower_count: u64,
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub skills: Vec<String>,
    pub location: Option<Location>,
    pub work_history: Vec<WorkExperience>,
    pub education: Vec<Education>,
}

impl ExternalProfile {
    /// Title of the current job, falling back to the headline
    pub fn current_title(&self) -> Option<&str> {
        self.work_history
            .iter()
            .find(|w| w.is_current)
            .or_else(|| self.work_history.first())
            .and_then(|w| w.title.as_deref())
            .or(self.headline.as_deref())
    }
}

/// Normalized attributes of one user, built once per request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub user_id: String,
    pub grade: Option<Grade>,
    pub location: Option<Location>,
    pub company: Option<String>,
    pub expertise_areas: Vec<String>,
    pub skills: Vec<String>,
    pub languages: Vec<String>,
    pub industries: Vec<String>,
    pub availability: Vec<String>,
    pub meeting_formats: Vec<String>,
    pub communication_styles: Vec<String>,
    pub external: Option<ExternalProfile>,
}

impl CandidateRecord {
    /// Own skills followed by external-profile skills, deduplicated
    pub fn all_skills(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.skills.len());
        let external = self.external.iter().flat_map(|e| e.skills.iter());
        for skill in self.skills.iter().chain(external) {
            if !out.contains(&skill.as_str()) {
                out.push(skill.as_str());
            }
        }
        out
    }

    /// Every known location signal: own field, external profile, then work history
    pub fn location_signals(&self) -> Vec<&Location> {
        let mut signals: Vec<&Location> = Vec::new();
        signals.extend(self.location.iter());
        if let Some(external) = &self.external {
            signals.extend(external.location.iter());
            signals.extend(external.work_history.iter().filter_map(|w| w.location.as_ref()));
        }
        signals
    }

    /// Current employer from the record, then from the external profile
    pub fn current_company(&self) -> Option<&str> {
        self.company.as_deref().or_else(|| {
            self.external.as_ref().and_then(|e| {
                e.work_history
                    .iter()
                    .find(|w| w.is_current)
                    .and_then(|w| w.company.as_deref())
            })
        })
    }

    pub fn current_title(&self) -> Option<&str> {
        self.external.as_ref().and_then(|e| e.current_title())
    }

    /// Values of a named attribute column, used by filters and diversification
    pub fn column(&self, name: &str) -> Vec<String> {
        match name {
            "user_id" | "id" => vec![self.user_id.clone()],
            "grade" => self.grade.iter().map(|g| g.as_str().to_string()).collect(),
            "expertise_area" | "expertise_areas" | "expertise" => self.expertise_areas.clone(),
            "skills" | "skill" => self.all_skills().into_iter().map(str::to_string).collect(),
            "languages" | "language" => self.languages.clone(),
            "industries" | "industry" => self.industries.clone(),
            "company" => self.current_company().map(str::to_string).into_iter().collect(),
            "availability" => self.availability.clone(),
            "meeting_format" | "meeting_formats" => self.meeting_formats.clone(),
            "city" | "location" => self
                .location
                .as_ref()
                .and_then(|l| l.city.clone())
                .into_iter()
                .collect(),
            "country" => self
                .location
                .as_ref()
                .and_then(|l| l.country.clone())
                .into_iter()
                .collect(),
            "region" => self
                .location
                .as_ref()
                .and_then(|l| l.region.clone())
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Extension bag for intent-specific request data
pub type IntentContent = serde_json::Map<String, serde_json::Value>;

/// The requester's own attributes plus what they are asking for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequesterContext {
    pub profile: CandidateRecord,
    pub intent_id: String,
    pub intent: IntentType,
    pub content: IntentContent,
}

impl RequesterContext {
    pub fn user_id(&self) -> &str {
        &self.profile.user_id
    }

    /// Lower-cased string value of an intent content key
    pub fn content_str(&self, key: &str) -> Option<String> {
        self.content
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    }

    /// True when the intent content asks for an in-person meeting
    pub fn wants_offline_meeting(&self) -> bool {
        matches!(
            self.content_str("meeting_format").as_deref(),
            Some("offline") | Some("in_person") | Some("in-person")
        )
    }
}

/// Outcome carried by a persisted matching result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MatchingOutcome {
    Ranked { candidate_ids: Vec<String> },
    Failed { code: String, details: String },
}

/// One persisted result per matching request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingResult {
    pub id: uuid::Uuid,
    pub requester_id: String,
    pub intent_id: String,
    pub preset: String,
    pub outcome: MatchingOutcome,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl MatchingResult {
    pub fn ranked(
        requester_id: &str,
        intent_id: &str,
        preset: &str,
        candidate_ids: Vec<String>,
    ) -> Self {
        Self::new(requester_id, intent_id, preset, MatchingOutcome::Ranked { candidate_ids })
    }

    pub fn failed(
        requester_id: &str,
        intent_id: &str,
        preset: &str,
        code: &str,
        details: String,
    ) -> Self {
        Self::new(
            requester_id,
            intent_id,
            preset,
            MatchingOutcome::Failed {
                code: code.to_string(),
                details,
            },
        )
    }

    fn new(requester_id: &str, intent_id: &str, preset: &str, outcome: MatchingOutcome) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            requester_id: requester_id.to_string(),
            intent_id: intent_id.to_string(),
            preset: preset.to_string(),
            outcome,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn ranked_ids(&self) -> &[String] {
        match &self.outcome {
            MatchingOutcome::Ranked { candidate_ids } => candidate_ids,
            MatchingOutcome::Failed { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_parse_synonyms() {
        assert_eq!(Grade::parse("Mid"), Some(Grade::Middle));
        assert_eq!(Grade::parse(" principal "), Some(Grade::Lead));
        assert_eq!(Grade::parse("wizard"), None);
        assert!(Grade::Senior > Grade::Junior);
    }

    #[test]
    fn test_unknown_intent_deserializes() {
        let intent: IntentType = serde_json::from_str("\"speed_dating\"").unwrap();
        assert_eq!(intent, IntentType::Unknown);
        assert_eq!(IntentType::parse("mentoring_mentor"), IntentType::MentoringMentor);
    }

    #[test]
    fn test_location_signals_order() {
        let record = CandidateRecord {
            location: Some(Location { city: Some("berlin".into()), ..Default::default() }),
            external: Some(ExternalProfile {
                work_history: vec![WorkExperience {
                    location: Some(Location { city: Some("paris".into()), ..Default::default() }),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            ..Default::default()
        };

        let signals = record.location_signals();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].city.as_deref(), Some("berlin"));
    }

    #[test]
    fn test_failed_result_has_no_ids() {
        let result =
            MatchingResult::failed("u1", "i1", "default", "data_access_error", "boom".into());
        assert!(result.ranked_ids().is_empty());
    }
}
