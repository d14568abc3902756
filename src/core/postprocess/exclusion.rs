use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::Scored;

/// Candidates that must never be returned, by id or by employer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionSpec {
    pub ids: Vec<String>,
    pub companies: Vec<String>,
}

impl ExclusionSpec {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.companies.is_empty()
    }

    pub fn apply(&self, candidates: &mut Vec<Scored>) {
        if self.is_empty() {
            return;
        }

        let ids: HashSet<&str> = self.ids.iter().map(|s| s.trim()).collect();
        let companies: HashSet<String> = self
            .companies
            .iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();

        let before = candidates.len();
        candidates.retain(|c| {
            if ids.contains(c.candidate.user_id.as_str()) {
                return false;
            }
            match c.candidate.current_company() {
                Some(company) => !companies.contains(&company.trim().to_lowercase()),
                None => true,
            }
        });

        tracing::debug!(
            excluded = before - candidates.len(),
            remaining = candidates.len(),
            "Exclusion applied"
        );
    }
}
