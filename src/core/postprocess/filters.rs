use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Scored;
use crate::models::{CandidateRecord, RequesterContext};

fn default_penalty() -> f64 {
    0.5
}

/// Injected retention predicate for custom filters
#[derive(Clone)]
pub struct CandidatePredicate(Arc<dyn Fn(&CandidateRecord) -> bool + Send + Sync>);

impl CandidatePredicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&CandidateRecord) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn keeps(&self, candidate: &CandidateRecord) -> bool {
        (self.0)(candidate)
    }
}

impl fmt::Debug for CandidatePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CandidatePredicate(..)")
    }
}

/// Allowed value set for one request; `None` means the filter has nothing to enforce
fn resolve(
    values: &[String],
    from_requester: bool,
    column: &str,
    requester: &RequesterContext,
) -> Option<HashSet<String>> {
    let mut set: HashSet<String> = values.iter().map(|v| v.trim().to_lowercase()).collect();
    if from_requester {
        set.extend(requester.profile.column(column));
    }
    set.retain(|v| !v.is_empty());
    (!set.is_empty()).then_some(set)
}

fn normalized<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values.iter().map(|v| v.as_ref().trim().to_lowercase()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterSpec {
    /// Drop candidates whose column shares no value with the allowed set
    Strict {
        column: String,
        #[serde(default)]
        values: Vec<String>,
        /// Take the allowed values from the requester's own column
        #[serde(default)]
        from_requester: bool,
    },
    /// Keep everyone, multiply non-matching scores by `penalty`
    Soft {
        column: String,
        #[serde(default)]
        values: Vec<String>,
        #[serde(default)]
        from_requester: bool,
        #[serde(default = "default_penalty")]
        penalty: f64,
    },
    #[serde(skip)]
    Custom {
        name: String,
        predicate: CandidatePredicate,
    },
}

impl FilterSpec {
    pub fn strict<S: AsRef<str>>(column: &str, allowed: &[S]) -> Self {
        FilterSpec::Strict {
            column: column.to_string(),
            values: normalized(allowed),
            from_requester: false,
        }
    }

    pub fn soft<S: AsRef<str>>(column: &str, allowed: &[S], penalty: f64) -> Self {
        FilterSpec::Soft {
            column: column.to_string(),
            values: normalized(allowed),
            from_requester: false,
            penalty,
        }
    }

    /// Strict filter on the requester's own values for `column`
    pub fn strict_from_requester(column: &str) -> Self {
        FilterSpec::Strict {
            column: column.to_string(),
            values: Vec::new(),
            from_requester: true,
        }
    }

    pub fn custom<F>(name: &str, f: F) -> Self
    where
        F: Fn(&CandidateRecord) -> bool + Send + Sync + 'static,
    {
        FilterSpec::Custom {
            name: name.to_string(),
            predicate: CandidatePredicate::new(f),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FilterSpec::Strict { column, .. } => format!("strict({})", column),
            FilterSpec::Soft { column, .. } => format!("soft({})", column),
            FilterSpec::Custom { name, .. } => format!("custom({})", name),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        match self {
            FilterSpec::Soft { penalty, .. } if !(0.0..=1.0).contains(penalty) => {
                Err(format!("soft filter penalty {} is outside [0, 1]", penalty))
            }
            FilterSpec::Strict { column, .. } | FilterSpec::Soft { column, .. }
                if column.trim().is_empty() =>
            {
                Err("filter column must not be empty".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Apply the filter in place
    pub fn apply(&self, candidates: &mut Vec<Scored>, requester: &RequesterContext) {
        let before = candidates.len();
        match self {
            FilterSpec::Strict {
                column,
                values,
                from_requester,
            } => {
                let Some(allowed) = resolve(values, *from_requester, column, requester) else {
                    tracing::debug!(
                        column = %column,
                        "Strict filter has no allowed values, skipping"
                    );
                    return;
                };
                candidates.retain(|c| intersects(&c.candidate, column, &allowed));
            }
            FilterSpec::Soft {
                column,
                values,
                from_requester,
                penalty,
            } => {
                let Some(allowed) = resolve(values, *from_requester, column, requester) else {
                    return;
                };
                for c in candidates.iter_mut() {
                    if !intersects(&c.candidate, column, &allowed) {
                        c.score *= penalty;
                    }
                }
            }
            FilterSpec::Custom { predicate, .. } => {
                candidates.retain(|c| predicate.keeps(&c.candidate));
            }
        }

        tracing::debug!(
            filter = %self.describe(),
            before,
            after = candidates.len(),
            "Filter applied"
        );
    }
}

fn intersects(candidate: &CandidateRecord, column: &str, allowed: &HashSet<String>) -> bool {
    candidate.column(column).iter().any(|v| allowed.contains(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::test_support::{record, strings};

    fn expert(id: &str, areas: &[&str], score: f64) -> Scored {
        let candidate = CandidateRecord {
            expertise_areas: strings(areas),
            ..record(id)
        };
        Scored::new(candidate, score)
    }

    fn pool() -> Vec<Scored> {
        vec![
            expert("dev", &["development"], 0.4),
            expert("mkt", &["marketing"], 0.9),
            expert("both", &["marketing", "development"], 0.6),
        ]
    }

    fn ids(candidates: &[Scored]) -> Vec<&str> {
        candidates.iter().map(|c| c.candidate.user_id.as_str()).collect()
    }

    #[test]
    fn test_strict_filter_drops_non_matching() {
        let mut candidates = pool();
        FilterSpec::strict("expertise_area", &["Development"])
            .apply(&mut candidates, &RequesterContext::default());
        assert_eq!(ids(&candidates), vec!["dev", "both"]);
    }

    #[test]
    fn test_strict_filter_is_idempotent() {
        let filter = FilterSpec::strict("expertise_area", &["development"]);
        let requester = RequesterContext::default();

        let mut once = pool();
        filter.apply(&mut once, &requester);
        let mut twice = once.clone();
        filter.apply(&mut twice, &requester);
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn test_strict_filter_from_requester() {
        let requester = RequesterContext {
            profile: CandidateRecord { expertise_areas: strings(&["marketing"]), ..record("me") },
            ..Default::default()
        };
        let filter = FilterSpec::strict_from_requester("expertise");

        let mut candidates = pool();
        filter.apply(&mut candidates, &requester);
        assert_eq!(ids(&candidates), vec!["mkt", "both"]);
    }

    #[test]
    fn test_strict_filter_without_values_is_noop() {
        let filter = FilterSpec::strict_from_requester("expertise");
        let mut candidates = pool();
        filter.apply(&mut candidates, &RequesterContext::default());
        assert_eq!(candidates.len(), 3);
    }

    #[test]
    fn test_soft_filter_penalizes() {
        let mut candidates = pool();
        FilterSpec::soft("expertise", &["development"], 0.5)
            .apply(&mut candidates, &RequesterContext::default());
        assert_eq!(candidates.len(), 3);
        assert!((candidates[1].score - 0.45).abs() < 1e-9);
        assert!((candidates[0].score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_custom_filter() {
        let mut candidates = pool();
        FilterSpec::custom("not-both", |c| c.user_id != "both")
            .apply(&mut candidates, &RequesterContext::default());
        assert_eq!(ids(&candidates), vec!["dev", "mkt"]);
    }

    #[test]
    fn test_soft_penalty_defaults_to_half() {
        let spec: FilterSpec = serde_json::from_str(
            r#"{"kind": "soft", "column": "grade", "values": ["senior"]}"#,
        )
        .unwrap();
        match spec {
            FilterSpec::Soft { penalty, .. } => assert_eq!(penalty, 0.5),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_bad_penalty() {
        assert!(FilterSpec::soft("grade", &["senior"], 1.5).validate().is_err());
        assert!(FilterSpec::strict("grade", &["senior"]).validate().is_ok());
    }
}
