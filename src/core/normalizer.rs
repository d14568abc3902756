//! Canonicalization of heterogeneous attribute values.
//!
//! Profile sources disagree on how they store the same attribute: a bare
//! string, a list, an enum object (`{"value": "senior"}`) or a labeled
//! object (`{"label": "Backend"}`). Everything here collapses those shapes
//! into ordered, lower-cased string sequences. None of these functions
//! fail; unusable input degrades to an empty sequence.

use serde_json::Value;

use crate::models::{Education, Grade, Location, WorkExperience};

/// Object keys that carry the payload of an enum or labeled object
const PAYLOAD_KEYS: [&str; 4] = ["value", "label", "name", "title"];

/// Collapse any supported shape into an ordered, deduplicated sequence
pub fn to_sequence(value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    collect(value, &mut out, 0);
    out
}

fn collect(value: &Value, out: &mut Vec<String>, depth: usize) {
    // Nested payload objects deeper than this are treated as garbage
    if depth > 4 {
        tracing::debug!("Dropping attribute nested deeper than {} levels", depth);
        return;
    }

    match value {
        Value::Null => {}
        Value::String(s) => push_unique(out, s),
        Value::Number(n) => push_unique(out, &n.to_string()),
        Value::Bool(b) => push_unique(out, &b.to_string()),
        Value::Array(items) => {
            for item in items {
                collect(item, out, depth + 1);
            }
        }
        Value::Object(map) => {
            match PAYLOAD_KEYS.iter().find_map(|key| map.get(*key)) {
                Some(inner) => collect(inner, out, depth + 1),
                None => tracing::debug!(
                    keys = ?map.keys().collect::<Vec<_>>(),
                    "Unrecognized attribute object, skipping"
                ),
            }
        }
    }
}

fn push_unique(out: &mut Vec<String>, raw: &str) {
    let cleaned = raw.trim().to_lowercase();
    if !cleaned.is_empty() && !out.contains(&cleaned) {
        out.push(cleaned);
    }
}

/// First element of the normalized sequence
pub fn to_scalar(value: &Value) -> Option<String> {
    to_sequence(value).into_iter().next()
}

/// Free text kept verbatim apart from trimming (summaries, descriptions)
pub fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(_) | Value::Array(_) => {
            let joined = to_sequence(value).join(" ");
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    }
}

pub fn to_grade(value: &Value) -> Option<Grade> {
    let label = to_scalar(value)?;
    let grade = Grade::parse(&label);
    if grade.is_none() {
        tracing::debug!(label = %label, "Unrecognized grade label");
    }
    grade
}

/// Parse a location from `{"city","country","region"}` or `"City, Country"`
pub fn to_location(value: &Value) -> Option<Location> {
    let location = match value {
        Value::Object(map)
            if ["city", "country", "region"].iter().any(|k| map.contains_key(*k)) =>
        {
            Location {
                city: map.get("city").and_then(to_scalar),
                country: map.get("country").and_then(to_scalar),
                region: map.get("region").and_then(to_scalar),
            }
        }
        Value::Null => return None,
        other => {
            let parts = to_sequence(other)
                .into_iter()
                .next()
                .map(|s| {
                    s.split(',')
                        .map(|p| p.trim().to_string())
                        .filter(|p| !p.is_empty())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            match parts.as_slice() {
                [] => return None,
                [city] => Location { city: Some(city.clone()), ..Default::default() },
                [city, country] => Location {
                    city: Some(city.clone()),
                    country: Some(country.clone()),
                    region: None,
                },
                [city, .., country] => Location {
                    city: Some(city.clone()),
                    country: Some(country.clone()),
                    region: parts.get(1).cloned(),
                },
            }
        }
    };

    (!location.is_empty()).then_some(location)
}

/// Parse a count such as `1234`, `"1,234"`, `"1.2k"` or `"3m"`
pub fn to_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => parse_count(s).unwrap_or_else(|| {
            tracing::debug!(raw = %s, "Unparseable count, using 0");
            0
        }),
        Value::Object(_) | Value::Array(_) => {
            to_scalar(value).and_then(|s| parse_count(&s)).unwrap_or(0)
        }
        _ => 0,
    }
}

fn parse_count(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '_' | '+'))
        .collect();
    let (digits, multiplier) = match cleaned.chars().last()? {
        'k' => (&cleaned[..cleaned.len() - 1], 1_000.0),
        'm' => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };
    let number: f64 = digits.parse().ok()?;
    (number.is_finite() && number >= 0.0).then(|| (number * multiplier) as u64)
}

fn to_year(value: Option<&Value>) -> Option<i32> {
    match value? {
        Value::Number(n) => n.as_i64().map(|y| y as i32),
        // Accept "2021" and ISO-like "2021-05"
        Value::String(s) => s.trim().get(..4).and_then(|y| y.parse().ok()),
        Value::Object(map) => to_year(map.get("year")),
        _ => None,
    }
}

pub fn to_work_experience(value: &Value) -> Option<WorkExperience> {
    let Value::Object(map) = value else {
        tracing::debug!("Work history entry is not an object, skipping");
        return None;
    };

    let end_year = to_year(
        map.get("end_year")
            .or_else(|| map.get("ends_at"))
            .or_else(|| map.get("end")),
    );
    let is_current = map
        .get("is_current")
        .and_then(Value::as_bool)
        .unwrap_or_else(|| end_year.is_none() && map.contains_key("start_year"));

    Some(WorkExperience {
        title: map.get("title").and_then(to_scalar),
        company: map.get("company").and_then(to_scalar),
        description: map.get("description").and_then(to_text),
        location: map.get("location").and_then(to_location),
        start_year: to_year(
            map.get("start_year")
                .or_else(|| map.get("starts_at"))
                .or_else(|| map.get("start")),
        ),
        end_year,
        is_current,
    })
}

pub fn to_education(value: &Value) -> Option<Education> {
    match value {
        Value::Object(map) => Some(Education {
            school: map.get("school").and_then(to_scalar),
            degree: map.get("degree").or_else(|| map.get("degree_name")).and_then(to_scalar),
            field_of_study: map
                .get("field_of_study")
                .or_else(|| map.get("field"))
                .and_then(to_scalar),
            end_year: to_year(map.get("end_year").or_else(|| map.get("ends_at"))),
        }),
        Value::String(s) if !s.trim().is_empty() => Some(Education {
            school: Some(s.trim().to_lowercase()),
            ..Default::default()
        }),
        _ => None,
    }
}
