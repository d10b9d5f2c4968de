//! JSON contract for results handed to callers.
//!
//! Keys and enum spellings here are what downstream consumers parse, so a
//! rename must show up as a failing test.

use newscheck_common::*;
use serde_json::json;

fn rule_result(score: f64) -> ScoreResult {
    ScoreResult::new(
        score,
        0.5,
        Mode::RuleBased,
        Details::RuleBased(SignalBreakdown::default()),
    )
}

#[test]
fn batch_items_are_tagged_by_outcome() {
    let batch = BatchResult {
        items: vec![
            BatchItem {
                input: "first".into(),
                outcome: BatchOutcome::Scored(rule_result(0.2)),
            },
            BatchItem {
                input: "second".into(),
                outcome: BatchOutcome::Failed(ErrorRecord::from(&NewsCheckError::ModelUnavailable(
                    "no key".into(),
                ))),
            },
        ],
    };

    let value = serde_json::to_value(&batch).unwrap();
    let items = value["items"].as_array().unwrap();
    assert_eq!(items[0]["input"], "first");
    assert_eq!(items[0]["scored"]["label"], "REAL");
    assert_eq!(items[1]["failed"]["kind"], "model_unavailable");
    assert_eq!(items[1]["failed"]["message"], "Model unavailable: no key");
}

#[test]
fn batch_round_trips_through_json() {
    let batch = BatchResult {
        items: vec![BatchItem {
            input: "only".into(),
            outcome: BatchOutcome::Scored(rule_result(0.75)),
        }],
    };
    let text = serde_json::to_string(&batch).unwrap();
    let back: BatchResult = serde_json::from_str(&text).unwrap();
    assert_eq!(back, batch);
}

#[test]
fn empty_input_flag_is_only_serialized_when_set() {
    let normal = serde_json::to_value(SignalBreakdown::default()).unwrap();
    assert!(normal.get("empty_input").is_none());

    let empty = serde_json::to_value(SignalBreakdown::empty_input()).unwrap();
    assert_eq!(empty["empty_input"], true);
}

#[test]
fn empty_transformer_result_keeps_flagged_breakdown() {
    let value = serde_json::to_value(ScoreResult::empty_input(Mode::Transformer)).unwrap();
    assert_eq!(
        value,
        json!({
            "fake_score": 0.0,
            "confidence": 0.0,
            "label": "REAL",
            "method": "transformer",
            "details": { "signals": {}, "empty_input": true }
        })
    );

    let back: ScoreResult = serde_json::from_value(value).unwrap();
    assert!(back.is_empty_input());
    assert_eq!(back.method, Mode::Transformer);
}

#[test]
fn transformer_details_deserialize_by_shape() {
    let value = json!({
        "fake_score": 0.91,
        "confidence": 0.91,
        "label": "FAKE",
        "method": "transformer",
        "details": {
            "raw_label": "NEGATIVE",
            "raw_probability": 0.91,
            "fake_probability": 0.91,
            "real_probability": 0.09
        }
    });
    let result: ScoreResult = serde_json::from_value(value).unwrap();
    assert_eq!(result.method, Mode::Transformer);
    assert!(matches!(result.details, Details::Transformer(ref out) if out.raw_label == "NEGATIVE"));
}

#[test]
fn url_analysis_omits_missing_parts() {
    let analysis = UrlAnalysis {
        url: "https://news.test/a".into(),
        title: "Bridge reopens".into(),
        description: None,
        content_preview: String::new(),
        strategy: Some(ExtractionStrategy::Paragraphs),
        title_analysis: Some(rule_result(0.1)),
        content_analysis: None,
        overall_fake_score: Some(0.1),
        overall_label: Some(Label::Real),
    };
    let value = serde_json::to_value(&analysis).unwrap();
    assert_eq!(value["strategy"], "paragraphs");
    assert_eq!(value["overall_label"], "REAL");
    assert!(value.get("content_analysis").is_none());
    assert!(value.get("description").is_none());
}
