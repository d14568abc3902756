use super::overlap::match_ratio;
use super::unit;
use crate::core::features::FeatureRow;
use crate::core::normalizer;
use crate::core::scoring_config::AvailabilityConfig;
use crate::models::RequesterContext;

/// Requested time slots: profile slots plus any slots in the intent content
fn requested_slots(requester: &RequesterContext) -> Vec<String> {
    let mut slots = requester.profile.availability.clone();
    if let Some(value) = requester.content.get("availability") {
        for slot in normalizer::to_sequence(value) {
            if !slots.contains(&slot) {
                slots.push(slot);
            }
        }
    }
    slots
}

/// Meeting formats the requester accepts; intent content wins over the profile
fn requested_formats(requester: &RequesterContext) -> Vec<String> {
    match requester.content_str("meeting_format") {
        Some(format) => vec![format],
        None => requester.profile.meeting_formats.clone(),
    }
}

pub fn score(
    candidates: &[FeatureRow],
    requester: &RequesterContext,
    base: f64,
    config: &AvailabilityConfig,
) -> Vec<f64> {
    let slots = requested_slots(requester);
    let formats = requested_formats(requester);
    if slots.is_empty() && formats.is_empty() {
        return vec![base; candidates.len()];
    }

    candidates
        .iter()
        .map(|row| {
            let candidate = &row.candidate;
            if candidate.availability.is_empty() && candidate.meeting_formats.is_empty() {
                return base;
            }

            let slot_ratio = match_ratio(&slots, &candidate.availability).unwrap_or(0.0);
            let format_bonus = if formats.iter().any(|f| candidate.meeting_formats.contains(f)) {
                config.format_match_bonus
            } else {
                0.0
            };

            unit(base + slot_ratio * config.slot_overlap_weight + format_bonus)
        })
        .collect()
}
