use newscheck_common::{Details, ErrorKind, Label, Mode, NewsCheckError};
use newscheck_scoring::testing::{MockClassifier, MockLoader};
use newscheck_scoring::ScoreCombiner;

const CLICKBAIT: &str = "You won't BELIEVE what this celebrity did LAST NIGHT!!!";
const PLAIN: &str = "City council approves new transportation infrastructure plan";
const MIXED: &str = "Scientists discover shocking cure for all diseases!!!";

/// Reported scores are rounded to three decimals, so blended values may
/// drift by one unit in the last place.
const ROUNDING_EPS: f64 = 0.0011;

fn fake_labels() -> Vec<String> {
    vec!["NEGATIVE".into(), "FAKE".into(), "LABEL_1".into()]
}

fn combiner_with(classifier: MockClassifier) -> ScoreCombiner {
    ScoreCombiner::default().with_loader(MockLoader::new(classifier), fake_labels())
}

#[tokio::test]
async fn clickbait_headline_is_fake() {
    let r = ScoreCombiner::default()
        .predict(CLICKBAIT, Mode::RuleBased)
        .await
        .unwrap();
    assert_eq!(r.label, Label::Fake);
    assert!(r.fake_score >= 0.9, "score {}", r.fake_score);
    assert_eq!(r.method, Mode::RuleBased);
}

#[tokio::test]
async fn council_headline_is_real() {
    let r = ScoreCombiner::default()
        .predict(PLAIN, Mode::RuleBased)
        .await
        .unwrap();
    assert_eq!(r.label, Label::Real);
    assert!(r.fake_score <= 0.1, "score {}", r.fake_score);
}

#[tokio::test]
async fn mixed_signals_score_in_the_middle() {
    let r = ScoreCombiner::default()
        .predict(MIXED, Mode::RuleBased)
        .await
        .unwrap();
    assert!(r.fake_score > 0.4 && r.fake_score < 0.8, "score {}", r.fake_score);
}

#[tokio::test]
async fn batch_keeps_failed_item_in_place() {
    let combiner = combiner_with(MockClassifier::new(0.2).failing_on("diseases"));
    let texts = vec![PLAIN.to_string(), MIXED.to_string(), CLICKBAIT.to_string()];

    let batch = combiner.predict_batch(&texts, Mode::Transformer).await;

    assert_eq!(batch.len(), 3);
    assert!(batch.items[0].result().is_some());
    let error = batch.items[1].error().unwrap();
    assert_eq!(error.kind, ErrorKind::ModelUnavailable);
    assert!(batch.items[2].result().is_some());
    assert_eq!(batch.items[1].input, MIXED);
}

#[tokio::test]
async fn every_mode_is_idempotent() {
    let combiner = combiner_with(MockClassifier::new(0.35));
    for mode in [Mode::RuleBased, Mode::Transformer, Mode::Hybrid] {
        let first = combiner.predict(CLICKBAIT, mode).await.unwrap();
        let second = combiner.predict(CLICKBAIT, mode).await.unwrap();
        assert_eq!(first, second, "mode {mode}");
    }
}

#[tokio::test]
async fn hybrid_is_weighted_blend() {
    let combiner = combiner_with(MockClassifier::new(0.1).on_text("celebrity", 0.9));

    for text in [CLICKBAIT, PLAIN, MIXED] {
        let rule = combiner.predict(text, Mode::RuleBased).await.unwrap();
        let model = combiner.predict(text, Mode::Transformer).await.unwrap();
        let hybrid = combiner.predict(text, Mode::Hybrid).await.unwrap();

        let expected = 0.6 * rule.fake_score + 0.4 * model.fake_score;
        assert!(
            (hybrid.fake_score - expected).abs() <= ROUNDING_EPS,
            "{text}: {} vs {expected}",
            hybrid.fake_score
        );
        let expected_conf = 0.6 * rule.confidence + 0.4 * model.confidence;
        assert!((hybrid.confidence - expected_conf).abs() <= ROUNDING_EPS);
        assert_eq!(hybrid.label, Label::from_score(hybrid.fake_score));

        match hybrid.details {
            Details::Hybrid { rule_based, transformer } => {
                assert!(!rule_based.signals.is_empty());
                assert_eq!(transformer.raw_label, model_raw_label(&model.details));
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }
}

fn model_raw_label(details: &Details) -> String {
    match details {
        Details::Transformer(out) => out.raw_label.clone(),
        other => panic!("unexpected details: {other:?}"),
    }
}

#[tokio::test]
async fn transformer_maps_negative_to_fake() {
    let combiner = combiner_with(MockClassifier::new(0.8));
    let r = combiner.predict(PLAIN, Mode::Transformer).await.unwrap();
    assert_eq!(r.fake_score, 0.8);
    assert_eq!(r.confidence, 0.8);
    assert_eq!(r.label, Label::Fake);
}

#[tokio::test]
async fn results_stay_in_unit_range() {
    let combiner = combiner_with(MockClassifier::new(1.0));
    let long = "SHOCKING!!! ".repeat(800);
    for text in [CLICKBAIT, PLAIN, MIXED, "?", long.as_str()] {
        for mode in [Mode::RuleBased, Mode::Transformer, Mode::Hybrid] {
            let r = combiner.predict(text, mode).await.unwrap();
            assert!((0.0..=1.0).contains(&r.fake_score));
            assert!((0.0..=1.0).contains(&r.confidence));
            assert_eq!(r.is_fake(), r.fake_score >= 0.5);
        }
    }
}

#[tokio::test]
async fn empty_input_in_every_mode() {
    let combiner = ScoreCombiner::default();
    for mode in [Mode::RuleBased, Mode::Transformer, Mode::Hybrid] {
        let r = combiner.predict("", mode).await.unwrap();
        assert_eq!(r.fake_score, 0.0);
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.label, Label::Real);
        assert_eq!(r.method, mode);
    }
}

#[tokio::test]
async fn hybrid_without_model_fails() {
    let err = ScoreCombiner::default()
        .predict(PLAIN, Mode::Hybrid)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsCheckError::ModelUnavailable(_)));
}

#[tokio::test]
async fn result_json_has_flat_keys() {
    let r = ScoreCombiner::default()
        .predict(CLICKBAIT, Mode::RuleBased)
        .await
        .unwrap();
    let json = serde_json::to_value(&r).unwrap();
    for key in ["fake_score", "confidence", "label", "method", "details"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["label"], "FAKE");
    assert_eq!(json["method"], "rule-based");
    assert!(json["details"]["signals"]["sensational_words"]["value"].is_number());
}
