use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, NewsCheckError};

/// Scores at or above this value are labelled FAKE.
pub const LABEL_THRESHOLD: f64 = 0.5;

/// Round to the three decimals every reported score carries.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Real,
    Fake,
}

impl Label {
    /// Derive the label from a fake score using the fixed threshold.
    pub fn from_score(fake_score: f64) -> Self {
        if fake_score >= LABEL_THRESHOLD {
            Label::Fake
        } else {
            Label::Real
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Real => "REAL",
            Label::Fake => "FAKE",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scoring method. Also the `method` field of every result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    RuleBased,
    Transformer,
    Hybrid,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::RuleBased => "rule-based",
            Mode::Transformer => "transformer",
            Mode::Hybrid => "hybrid",
        }
    }

    /// Whether this mode needs the learned model.
    pub fn needs_model(&self) -> bool {
        !matches!(self, Mode::RuleBased)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = NewsCheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rule-based" | "rule_based" | "rule" | "rules" => Ok(Mode::RuleBased),
            "transformer" | "model" => Ok(Mode::Transformer),
            "hybrid" => Ok(Mode::Hybrid),
            other => Err(NewsCheckError::Config(format!(
                "unknown scoring mode '{other}' (expected rule-based, transformer or hybrid)"
            ))),
        }
    }
}

// --- Heuristic breakdown ---

/// One heuristic dimension's contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Normalized signal strength in [0,1].
    pub value: f64,
    pub weight: f64,
    pub explanation: String,
}

impl Signal {
    /// Weighted share of the combined score.
    pub fn contribution(&self) -> f64 {
        self.value * self.weight
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalBreakdown {
    pub signals: BTreeMap<String, Signal>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub empty_input: bool,
}

impl SignalBreakdown {
    pub fn empty_input() -> Self {
        Self {
            signals: BTreeMap::new(),
            empty_input: true,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Signal> {
        self.signals.get(name)
    }
}

// --- Learned model output ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    /// Label as reported by the model, e.g. "NEGATIVE".
    pub raw_label: String,
    /// Probability the model assigned to `raw_label`.
    pub raw_probability: f64,
    pub fake_probability: f64,
    pub real_probability: f64,
}

impl ModelOutput {
    /// Probability of the predicted class.
    pub fn confidence(&self) -> f64 {
        self.fake_probability.max(self.real_probability)
    }
}

// --- Score result ---

/// Per-method details. Normally the variant follows `ScoreResult::method`;
/// the one exception is empty input, which carries `RuleBased` details with
/// `empty_input: true` whatever the method (see [`ScoreResult::empty_input`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Details {
    Hybrid {
        #[serde(rename = "rule-based")]
        rule_based: SignalBreakdown,
        transformer: ModelOutput,
    },
    RuleBased(SignalBreakdown),
    Transformer(ModelOutput),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub fake_score: f64,
    pub confidence: f64,
    pub label: Label,
    pub method: Mode,
    pub details: Details,
}

impl ScoreResult {
    /// Build a result, rounding both scores and deriving the label from the
    /// rounded fake score.
    pub fn new(fake_score: f64, confidence: f64, method: Mode, details: Details) -> Self {
        let fake_score = round3(fake_score.clamp(0.0, 1.0));
        Self {
            fake_score,
            confidence: round3(confidence.clamp(0.0, 1.0)),
            label: Label::from_score(fake_score),
            method,
            details,
        }
    }

    /// Degenerate result for empty input: zero score, zero confidence.
    ///
    /// No model runs on empty input, so the details are always an empty
    /// `SignalBreakdown` flagged `empty_input`, even when `method` is
    /// `transformer` or `hybrid`. Check [`ScoreResult::is_empty_input`]
    /// before matching details against the method.
    pub fn empty_input(method: Mode) -> Self {
        Self::new(
            0.0,
            0.0,
            method,
            Details::RuleBased(SignalBreakdown::empty_input()),
        )
    }

    pub fn is_fake(&self) -> bool {
        self.label == Label::Fake
    }

    pub fn is_empty_input(&self) -> bool {
        matches!(&self.details, Details::RuleBased(b) if b.empty_input)
    }
}

// --- Extraction ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    JsonLd,
    ArticleElement,
    ContentContainer,
    Paragraphs,
    LargestBlock,
}

impl ExtractionStrategy {
    /// Fallback order, most specific first.
    pub const ORDER: [ExtractionStrategy; 5] = [
        ExtractionStrategy::JsonLd,
        ExtractionStrategy::ArticleElement,
        ExtractionStrategy::ContentContainer,
        ExtractionStrategy::Paragraphs,
        ExtractionStrategy::LargestBlock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategy::JsonLd => "json_ld",
            ExtractionStrategy::ArticleElement => "article_element",
            ExtractionStrategy::ContentContainer => "content_container",
            ExtractionStrategy::Paragraphs => "paragraphs",
            ExtractionStrategy::LargestBlock => "largest_block",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractedArticle {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<ExtractionStrategy>,
    pub success: bool,
}

impl ExtractedArticle {
    pub fn failed() -> Self {
        Self::default()
    }
}

// --- Batch ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&NewsCheckError> for ErrorRecord {
    fn from(err: &NewsCheckError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    Scored(ScoreResult),
    Failed(ErrorRecord),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub input: String,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

impl BatchItem {
    pub fn result(&self) -> Option<&ScoreResult> {
        match &self.outcome {
            BatchOutcome::Scored(r) => Some(r),
            BatchOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorRecord> {
        match &self.outcome {
            BatchOutcome::Scored(_) => None,
            BatchOutcome::Failed(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub scored: usize,
    pub failed: usize,
    pub fake: usize,
    pub real: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchResult {
    pub items: Vec<BatchItem>,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total: self.items.len(),
            ..Default::default()
        };
        for item in &self.items {
            match &item.outcome {
                BatchOutcome::Scored(r) => {
                    summary.scored += 1;
                    match r.label {
                        Label::Fake => summary.fake += 1,
                        Label::Real => summary.real += 1,
                    }
                }
                BatchOutcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }
}

// --- URL analysis ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlAnalysis {
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub content_preview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<ExtractionStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_analysis: Option<ScoreResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_analysis: Option<ScoreResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_fake_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_label: Option<Label>,
}

// --- Corroboration ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_threshold_is_inclusive() {
        assert_eq!(Label::from_score(0.5), Label::Fake);
        assert_eq!(Label::from_score(0.4999), Label::Real);
        assert_eq!(Label::from_score(1.0), Label::Fake);
        assert_eq!(Label::from_score(0.0), Label::Real);
    }

    #[test]
    fn label_follows_rounded_score() {
        // 0.4996 rounds to 0.5, so the reported label must be FAKE.
        let r = ScoreResult::new(
            0.4996,
            0.0,
            Mode::RuleBased,
            Details::RuleBased(SignalBreakdown::default()),
        );
        assert_eq!(r.fake_score, 0.5);
        assert_eq!(r.label, Label::Fake);
    }

    #[test]
    fn scores_are_clamped() {
        let r = ScoreResult::new(
            1.7,
            -0.2,
            Mode::RuleBased,
            Details::RuleBased(SignalBreakdown::default()),
        );
        assert_eq!(r.fake_score, 1.0);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn empty_input_result_is_degenerate() {
        let r = ScoreResult::empty_input(Mode::Hybrid);
        assert_eq!(r.fake_score, 0.0);
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.label, Label::Real);
        assert_eq!(r.method, Mode::Hybrid);
        match r.details {
            Details::RuleBased(b) => assert!(b.empty_input),
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn empty_input_details_are_rule_shaped_for_every_method() {
        for mode in [Mode::RuleBased, Mode::Transformer, Mode::Hybrid] {
            let r = ScoreResult::empty_input(mode);
            assert_eq!(r.method, mode);
            assert!(r.is_empty_input());
            assert!(matches!(&r.details, Details::RuleBased(b) if b.signals.is_empty()));
        }
        let scored = ScoreResult::new(
            0.2,
            0.6,
            Mode::RuleBased,
            Details::RuleBased(SignalBreakdown::default()),
        );
        assert!(!scored.is_empty_input());
    }

    #[test]
    fn mode_parses_aliases() {
        assert_eq!("rule-based".parse::<Mode>().unwrap(), Mode::RuleBased);
        assert_eq!("RULE_BASED".parse::<Mode>().unwrap(), Mode::RuleBased);
        assert_eq!(" hybrid ".parse::<Mode>().unwrap(), Mode::Hybrid);
        assert_eq!("transformer".parse::<Mode>().unwrap(), Mode::Transformer);
        assert!("bayesian".parse::<Mode>().is_err());
    }

    #[test]
    fn result_serializes_to_flat_keys() {
        let r = ScoreResult::new(
            0.912,
            0.824,
            Mode::RuleBased,
            Details::RuleBased(SignalBreakdown::default()),
        );
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["label"], "FAKE");
        assert_eq!(json["method"], "rule-based");
        assert_eq!(json["fake_score"], 0.912);
        assert!(json["details"]["signals"].is_object());
    }

    #[test]
    fn hybrid_details_are_keyed_by_method() {
        let details = Details::Hybrid {
            rule_based: SignalBreakdown::default(),
            transformer: ModelOutput {
                raw_label: "NEGATIVE".into(),
                raw_probability: 0.9,
                fake_probability: 0.9,
                real_probability: 0.1,
            },
        };
        let json = serde_json::to_value(&details).unwrap();
        assert!(json.get("rule-based").is_some());
        assert_eq!(json["transformer"]["raw_label"], "NEGATIVE");
    }

    #[test]
    fn batch_summary_counts_outcomes() {
        let scored = |score: f64| BatchItem {
            input: "x".into(),
            outcome: BatchOutcome::Scored(ScoreResult::new(
                score,
                0.5,
                Mode::RuleBased,
                Details::RuleBased(SignalBreakdown::default()),
            )),
        };
        let batch = BatchResult {
            items: vec![
                scored(0.9),
                BatchItem {
                    input: "y".into(),
                    outcome: BatchOutcome::Failed(ErrorRecord {
                        kind: ErrorKind::ModelUnavailable,
                        message: "no model".into(),
                    }),
                },
                scored(0.1),
            ],
        };
        let summary = batch.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.scored, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.fake, 1);
        assert_eq!(summary.real, 1);
    }
}
