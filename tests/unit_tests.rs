// Unit tests for Intent Match

use std::collections::HashMap;
use std::sync::Arc;

use intent_match::core::normalizer::{to_count, to_grade, to_location, to_sequence};
use intent_match::core::rules::overlap::match_ratio;
use intent_match::core::{
    FeatureAssembler, FeatureRow, FilterSpec, PostProcessSpec, PostProcessor, Rule, RuleParams,
    RuleResult, Scored, ScoringConfig,
};
use intent_match::models::{Grade, IntentType, RawRequester, RawUser, RequesterContext};
use serde_json::json;

fn raw_user(id: &str, expertise: serde_json::Value, skills: serde_json::Value) -> RawUser {
    RawUser {
        id: id.to_string(),
        grade: json!("senior"),
        location: json!("Berlin, Germany"),
        expertise_areas: expertise,
        skills,
        ..Default::default()
    }
}

fn requester(expertise: serde_json::Value, skills: serde_json::Value) -> RequesterContext {
    let raw = RawRequester {
        user: raw_user("me", expertise, skills),
        intent_id: "intent-1".to_string(),
        intent_type: json!({ "value": "professional_networking" }),
        content: serde_json::Map::new(),
    };
    FeatureAssembler::new().requester(&raw, None)
}

fn rows(main: RequesterContext, candidates: &[RawUser]) -> Vec<FeatureRow> {
    FeatureAssembler::new().assemble(main, candidates, &HashMap::new())
}

#[test]
fn test_normalizer_accepts_every_value_shape() {
    assert_eq!(to_sequence(&json!("Development")), vec!["development"]);
    assert_eq!(to_sequence(&json!(["Rust", " SQL "])), vec!["rust", "sql"]);
    assert_eq!(to_sequence(&json!({"value": "Senior"})), vec!["senior"]);
    assert_eq!(to_sequence(&json!([{"label": "Go"}, {"name": "Kotlin"}])), vec!["go", "kotlin"]);
    assert!(to_sequence(&json!(null)).is_empty());
    assert_eq!(to_sequence(&json!(["Rust", "rust"])), vec!["rust"]);
}

#[test]
fn test_normalizer_grade_and_location() {
    assert_eq!(to_grade(&json!({"value": "Senior"})), Some(Grade::Senior));
    assert_eq!(to_grade(&json!("wizard")), None);

    let location = to_location(&json!("Berlin, Germany")).unwrap();
    assert_eq!(location.city.as_deref(), Some("berlin"));
    assert_eq!(location.country.as_deref(), Some("germany"));
    assert!(to_location(&json!(null)).is_none());
}

#[test]
fn test_normalizer_counts() {
    assert_eq!(to_count(&json!(1234)), 1234);
    assert_eq!(to_count(&json!("1,234")), 1234);
    assert_eq!(to_count(&json!("garbage")), 0);
}

#[test]
fn test_match_ratio_ignores_order_and_duplicates() {
    let a = match_ratio(&["rust", "sql", "go"], &["go", "rust"]);
    let b = match_ratio(&["go", "sql", "rust", "rust"], &["rust", "go", "go"]);
    assert_eq!(a, b);
    assert!((a.unwrap() - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_match_ratio_is_asymmetric() {
    assert_eq!(match_ratio(&["rust"], &["rust", "go", "sql"]), Some(1.0));
    assert!((match_ratio(&["rust", "go", "sql"], &["rust"]).unwrap() - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(match_ratio::<&str, &str>(&[], &["rust"]), None);
}

#[test]
fn test_rules_are_deterministic() {
    let config = ScoringConfig::default();
    let candidates = vec![
        raw_user("a", json!(["development"]), json!(["rust", "go"])),
        raw_user("b", json!(["marketing"]), json!(["seo"])),
    ];
    let main = requester(json!(["development"]), json!(["rust"]));
    let rows = rows(main.clone(), &candidates);

    for rule in Rule::ALL {
        let first = rule.apply(&rows, &main, &RuleParams::default(), &config).unwrap();
        let second = rule.apply(&rows, &main, &RuleParams::default(), &config).unwrap();
        assert_eq!(first.scores(), second.scores(), "{} is not deterministic", rule.name());
        assert_eq!(first.len(), rows.len());
    }
}

#[test]
fn test_overlap_rules_fall_back_to_base_without_requester_signal() {
    let config = ScoringConfig::default();
    let candidates = vec![
        raw_user("a", json!(["development"]), json!(["rust"])),
        raw_user("b", json!([]), json!([])),
    ];
    let main = requester(json!([]), json!([]));
    let rows = rows(main.clone(), &candidates);

    let params = RuleParams::with_base(0.42);
    for rule in [Rule::Skill, Rule::Expertise] {
        let result = rule.apply(&rows, &main, &params, &config).unwrap();
        assert_eq!(result.scores(), &[0.42, 0.42]);
    }
}

#[test]
fn test_rule_result_repair_matches_expected_length() {
    assert_eq!(RuleResult::new(vec![0.1, 0.2, 0.3]).repair(1, 0.5).scores(), &[0.1]);
    assert_eq!(RuleResult::new(vec![0.9]).repair(3, 0.5).scores(), &[0.9, 0.9, 0.9]);
    assert_eq!(RuleResult::new(vec![]).repair(2, 0.5).scores(), &[0.5, 0.5]);
}

#[test]
fn test_assembler_skips_requester_row() {
    let candidates = vec![
        raw_user("me", json!([]), json!([])),
        raw_user("a", json!([]), json!([])),
    ];
    let main = requester(json!(["development"]), json!([]));
    assert_eq!(main.intent, IntentType::ProfessionalNetworking);

    let rows = rows(main, &candidates);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].candidate.user_id, "a");
}

#[test]
fn test_strict_filter_is_idempotent() {
    let assembler = FeatureAssembler::new();
    let main = requester(json!(["development"]), json!([]));
    let scored: Vec<Scored> = [
        ("a", json!(["development"])),
        ("b", json!(["marketing"])),
        ("c", json!(["development", "design"])),
    ]
    .into_iter()
    .map(|(id, expertise)| {
        let candidate = assembler.candidate(&raw_user(id, expertise, json!([])), None);
        Scored::new(candidate, 0.5)
    })
    .collect();

    let spec = PostProcessSpec {
        filters: vec![FilterSpec::strict("expertise", &["development"])],
        ..Default::default()
    };
    let processor = PostProcessor::new();
    let once = processor.run(&spec, &main, scored, 10);
    let once_ids: Vec<String> = once.iter().map(|s| s.candidate.user_id.clone()).collect();
    let twice = processor.run(&spec, &main, once, 10);
    let twice_ids: Vec<String> = twice.iter().map(|s| s.candidate.user_id.clone()).collect();

    assert_eq!(once_ids, vec!["a", "c"]);
    assert_eq!(once_ids, twice_ids);
}

#[test]
fn test_scoring_config_shares_across_predictors() {
    let config = Arc::new(ScoringConfig::default());
    assert!(config.grade.weight(Grade::Junior, Grade::Senior) >= 0.0);
    assert!(config.final_pass.min_score < config.final_pass.max_score);
}
