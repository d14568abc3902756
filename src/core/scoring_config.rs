//! Immutable scoring constants, grouped by rule family.
//!
//! A `ScoringConfig` is built once (defaults, optionally overridden from the
//! `[scoring]` configuration section) and shared read-only by every
//! predictor. Nothing in the pipeline mutates it.

use serde::{Deserialize, Serialize};

use crate::core::rules::Rule;
use crate::models::Grade;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub location: LocationConfig,
    pub grade: GradeConfig,
    pub overlap: OverlapConfig,
    pub network: NetworkConfig,
    pub project: ProjectConfig,
    pub education: EducationConfig,
    pub availability: AvailabilityConfig,
    pub communication: CommunicationConfig,
    pub intents: IntentsConfig,
    pub final_pass: FinalPassConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub base_score: f64,
    pub city_score: f64,
    pub country_score: f64,
    pub region_score: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            base_score: 0.3,
            city_score: 1.0,
            country_score: 0.7,
            region_score: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeConfig {
    pub base_score: f64,
    /// Weight for `[requester grade][candidate grade]`, ladder order intern..lead
    pub matrix: [[f64; 5]; 5],
}

impl GradeConfig {
    pub fn weight(&self, from: Grade, to: Grade) -> f64 {
        self.matrix[from.index()][to.index()]
    }
}

impl Default for GradeConfig {
    fn default() -> Self {
        Self {
            base_score: 0.5,
            matrix: [
                [1.0, 0.9, 0.6, 0.4, 0.3],
                [0.9, 1.0, 0.8, 0.6, 0.4],
                [0.6, 0.8, 1.0, 0.8, 0.6],
                [0.4, 0.6, 0.8, 1.0, 0.9],
                [0.3, 0.4, 0.6, 0.9, 1.0],
            ],
        }
    }
}

/// Match-ratio tier boundaries (inclusive lower bounds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub excellent: f64,
    pub good: f64,
    pub fair: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            excellent: 0.8,
            good: 0.6,
            fair: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierScores {
    pub excellent: f64,
    pub good: f64,
    pub fair: f64,
    pub poor: f64,
}

impl Default for TierScores {
    fn default() -> Self {
        Self {
            excellent: 1.0,
            good: 0.8,
            fair: 0.6,
            poor: 0.2,
        }
    }
}

/// Shared by the skill, language and expertise rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlapConfig {
    pub base_score: f64,
    /// Blend weight of the tier score against the base score
    pub weight: f64,
    pub thresholds: TierThresholds,
    pub tiers: TierScores,
}

impl OverlapConfig {
    pub fn tier_score(&self, ratio: f64) -> f64 {
        if ratio >= self.thresholds.excellent {
            self.tiers.excellent
        } else if ratio >= self.thresholds.good {
            self.tiers.good
        } else if ratio >= self.thresholds.fair {
            self.tiers.fair
        } else {
            self.tiers.poor
        }
    }
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            base_score: 0.3,
            weight: 0.8,
            thresholds: TierThresholds::default(),
            tiers: TierScores::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub base_score: f64,
    pub presence_score: f64,
    pub follower_cap: u64,
    pub follower_max_bonus: f64,
    pub summary_bonus: f64,
    pub skills_bonus: f64,
    pub experience_bonus: f64,
    pub seniority_bonus: f64,
    pub seniority_keywords: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_score: 0.3,
            presence_score: 0.5,
            follower_cap: 5_000,
            follower_max_bonus: 0.2,
            summary_bonus: 0.05,
            skills_bonus: 0.05,
            experience_bonus: 0.05,
            seniority_bonus: 0.15,
            seniority_keywords: [
                "senior", "lead", "head", "principal", "staff", "director", "vp", "chief",
                "cto", "ceo", "founder", "architect",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub base_score: f64,
    pub per_project_bonus: f64,
    pub max_project_bonus: f64,
    pub per_keyword_bonus: f64,
    pub max_keyword_bonus: f64,
    pub recency_bonus: f64,
    /// A finished job counts as recent if it ended within this many years
    pub recency_years: i32,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            base_score: 0.2,
            per_project_bonus: 0.1,
            max_project_bonus: 0.3,
            per_keyword_bonus: 0.1,
            max_keyword_bonus: 0.3,
            recency_bonus: 0.2,
            recency_years: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationConfig {
    pub base_score: f64,
    pub has_education_bonus: f64,
    pub degree_bonus: f64,
    pub advanced_degree_bonus: f64,
    pub field_match_bonus: f64,
    pub advanced_degree_keywords: Vec<String>,
}

impl Default for EducationConfig {
    fn default() -> Self {
        Self {
            base_score: 0.3,
            has_education_bonus: 0.2,
            degree_bonus: 0.15,
            advanced_degree_bonus: 0.15,
            field_match_bonus: 0.2,
            advanced_degree_keywords: ["master", "msc", "mba", "phd", "doctor", "candidate of"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityConfig {
    pub base_score: f64,
    pub slot_overlap_weight: f64,
    pub format_match_bonus: f64,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            base_score: 0.4,
            slot_overlap_weight: 0.4,
            format_match_bonus: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunicationConfig {
    pub base_score: f64,
    pub per_shared_language: f64,
    pub max_language_bonus: f64,
    pub style_match_bonus: f64,
}

impl Default for CommunicationConfig {
    fn default() -> Self {
        Self {
            base_score: 0.4,
            per_shared_language: 0.15,
            max_language_bonus: 0.3,
            style_match_bonus: 0.3,
        }
    }
}

/// How a component rule score is folded into a composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combine {
    /// `score + (rule - 0.5) * weight`, clamped to [0, 1]
    Impact,
    /// `(1 - weight) * score + weight * rule`
    Blend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub rule: Rule,
    pub weight: f64,
    pub combine: Combine,
}

impl Component {
    pub const fn impact(rule: Rule, weight: f64) -> Self {
        Self { rule, weight, combine: Combine::Impact }
    }

    pub const fn blend(rule: Rule, weight: f64) -> Self {
        Self { rule, weight, combine: Combine::Blend }
    }
}

/// Constants for one intent composite
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeConfig {
    pub base_score: f64,
    pub components: Vec<Component>,
    pub boost: f64,
    pub secondary_boost: f64,
    pub penalty: f64,
    /// Minimum score for candidates that qualify as a good match
    pub floor: f64,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            base_score: 0.5,
            components: Vec::new(),
            boost: 0.0,
            secondary_boost: 0.0,
            penalty: 0.0,
            floor: 0.0,
        }
    }
}

impl CompositeConfig {
    fn new(base_score: f64, components: Vec<Component>) -> Self {
        Self {
            base_score,
            components,
            ..Default::default()
        }
    }

    fn boosts(mut self, boost: f64, secondary_boost: f64, penalty: f64, floor: f64) -> Self {
        self.boost = boost;
        self.secondary_boost = secondary_boost;
        self.penalty = penalty;
        self.floor = floor;
        self
    }
}

/// Per-intent composites. Deserializing overlays the given fields on each
/// intent's own defaults, so `{"referral": {"floor": 0.7}}` only moves the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "IntentsOverride")]
pub struct IntentsConfig {
    /// Weight of the composite score against the running base-rule score
    pub blend_weight: f64,
    /// Overlap ratio a candidate needs before a composite floor applies
    pub qualifying_ratio: f64,
    pub founder_keywords: Vec<String>,
    pub mock_interview: CompositeConfig,
    pub mentoring_mentor: CompositeConfig,
    pub mentoring_mentee: CompositeConfig,
    pub project_contributor: CompositeConfig,
    pub find_cofounder: CompositeConfig,
    pub pet_project: CompositeConfig,
    pub referral: CompositeConfig,
    pub professional_networking: CompositeConfig,
    pub social_expansion: CompositeConfig,
}

impl Default for IntentsConfig {
    fn default() -> Self {
        use Component as C;
        use Rule::*;

        Self {
            blend_weight: 0.6,
            qualifying_ratio: 0.4,
            founder_keywords: ["founder", "co-founder", "cofounder", "ceo", "cto", "owner"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            mock_interview: CompositeConfig::new(
                0.45,
                vec![
                    C::impact(Skill, 0.4),
                    C::impact(Expertise, 0.3),
                    C::impact(Grade, 0.2),
                    C::impact(CommunicationStyle, 0.1),
                ],
            )
            .boosts(0.1, 0.0, 0.15, 0.5),
            mentoring_mentor: CompositeConfig::new(
                0.4,
                vec![
                    C::impact(Expertise, 0.5),
                    C::impact(Skill, 0.3),
                    C::impact(NetworkQuality, 0.1),
                    C::blend(CommunicationStyle, 0.1),
                ],
            )
            .boosts(0.15, 0.05, 0.2, 0.55),
            mentoring_mentee: CompositeConfig::new(
                0.4,
                vec![
                    C::impact(Expertise, 0.4),
                    C::impact(Availability, 0.2),
                    C::impact(CommunicationStyle, 0.2),
                    C::impact(Language, 0.1),
                ],
            )
            .boosts(0.15, 0.0, 0.2, 0.5),
            project_contributor: CompositeConfig::new(
                0.4,
                vec![
                    C::blend(Skill, 0.4),
                    C::impact(ProjectExperience, 0.3),
                    C::impact(Availability, 0.2),
                    C::impact(Expertise, 0.2),
                ],
            )
            .boosts(0.05, 0.0, 0.0, 0.5),
            find_cofounder: CompositeConfig::new(
                0.35,
                vec![
                    C::impact(ProjectExperience, 0.3),
                    C::impact(NetworkQuality, 0.2),
                    C::impact(Location, 0.2),
                    C::impact(Expertise, 0.2),
                ],
            )
            .boosts(0.15, 0.05, 0.0, 0.5),
            pet_project: CompositeConfig::new(
                0.45,
                vec![
                    C::impact(Skill, 0.3),
                    C::impact(Availability, 0.3),
                    C::impact(CommunicationStyle, 0.2),
                ],
            )
            .boosts(0.05, 0.0, 0.0, 0.45),
            referral: CompositeConfig::new(
                0.35,
                vec![
                    C::impact(Expertise, 0.3),
                    C::impact(NetworkQuality, 0.3),
                    C::impact(Grade, 0.1),
                ],
            )
            .boosts(0.25, 0.05, 0.0, 0.6),
            professional_networking: CompositeConfig::new(
                0.4,
                vec![
                    C::impact(Expertise, 0.4),
                    C::impact(NetworkQuality, 0.2),
                    C::impact(Location, 0.2),
                    C::impact(Skill, 0.1),
                ],
            )
            .boosts(0.15, 0.05, 0.0, 0.5),
            social_expansion: CompositeConfig::new(
                0.5,
                vec![
                    C::impact(Location, 0.4),
                    C::impact(Language, 0.2),
                    C::impact(CommunicationStyle, 0.2),
                ],
            )
            .boosts(0.05, 0.0, 0.0, 0.0),
        }
    }
}

/// Cross-cutting adjustments applied after the intent composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalPassConfig {
    pub follower_threshold: u64,
    pub follower_boost: f64,
    pub summary_boost: f64,
    pub skills_boost: f64,
    pub experience_boost: f64,
    pub max_richness_boost: f64,
    pub offline_same_city_boost: f64,
    pub offline_same_country_boost: f64,
    pub offline_mismatch_penalty: f64,
    pub offline_unknown_penalty: f64,
    /// Cap for candidates below the requester when the intent needs seniority
    pub below_grade_ceiling: f64,
    /// Cap for candidates at or above the requester when looking for mentees
    pub above_grade_ceiling: f64,
    /// Minimum for senior-or-above candidates on referral requests
    pub senior_floor: f64,
    pub min_score: f64,
    pub max_score: f64,
}

impl Default for FinalPassConfig {
    fn default() -> Self {
        Self {
            follower_threshold: 500,
            follower_boost: 0.03,
            summary_boost: 0.02,
            skills_boost: 0.02,
            experience_boost: 0.03,
            max_richness_boost: 0.08,
            offline_same_city_boost: 0.1,
            offline_same_country_boost: 0.03,
            offline_mismatch_penalty: 0.15,
            offline_unknown_penalty: 0.05,
            below_grade_ceiling: 0.45,
            above_grade_ceiling: 0.45,
            senior_floor: 0.3,
            min_score: 0.01,
            max_score: 0.99,
        }
    }
}

/// One composite as written in configuration
#[derive(Debug, Default, Deserialize)]
struct CompositeOverride {
    base_score: Option<f64>,
    components: Option<Vec<Component>>,
    boost: Option<f64>,
    secondary_boost: Option<f64>,
    penalty: Option<f64>,
    floor: Option<f64>,
}

impl CompositeOverride {
    fn over(self, defaults: CompositeConfig) -> CompositeConfig {
        CompositeConfig {
            base_score: self.base_score.unwrap_or(defaults.base_score),
            components: self.components.unwrap_or(defaults.components),
            boost: self.boost.unwrap_or(defaults.boost),
            secondary_boost: self.secondary_boost.unwrap_or(defaults.secondary_boost),
            penalty: self.penalty.unwrap_or(defaults.penalty),
            floor: self.floor.unwrap_or(defaults.floor),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IntentsOverride {
    blend_weight: Option<f64>,
    qualifying_ratio: Option<f64>,
    founder_keywords: Option<Vec<String>>,
    mock_interview: CompositeOverride,
    mentoring_mentor: CompositeOverride,
    mentoring_mentee: CompositeOverride,
    project_contributor: CompositeOverride,
    find_cofounder: CompositeOverride,
    pet_project: CompositeOverride,
    referral: CompositeOverride,
    professional_networking: CompositeOverride,
    social_expansion: CompositeOverride,
}

impl From<IntentsOverride> for IntentsConfig {
    fn from(o: IntentsOverride) -> Self {
        let d = IntentsConfig::default();
        Self {
            blend_weight: o.blend_weight.unwrap_or(d.blend_weight),
            qualifying_ratio: o.qualifying_ratio.unwrap_or(d.qualifying_ratio),
            founder_keywords: o.founder_keywords.unwrap_or(d.founder_keywords),
            mock_interview: o.mock_interview.over(d.mock_interview),
            mentoring_mentor: o.mentoring_mentor.over(d.mentoring_mentor),
            mentoring_mentee: o.mentoring_mentee.over(d.mentoring_mentee),
            project_contributor: o.project_contributor.over(d.project_contributor),
            find_cofounder: o.find_cofounder.over(d.find_cofounder),
            pet_project: o.pet_project.over(d.pet_project),
            referral: o.referral.over(d.referral),
            professional_networking: o.professional_networking.over(d.professional_networking),
            social_expansion: o.social_expansion.over(d.social_expansion),
        }
    }
}
