use std::sync::Arc;

use async_trait::async_trait;
use newscheck_common::{ModelOutput, NewsCheckError, Result};
use newscheck_archive::text_extract::truncate_chars;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Inputs are cut to this many characters before classification.
pub const MAX_MODEL_INPUT_CHARS: usize = 512;

/// One class and its probability as reported by a classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

// --- Classifier seams ---

/// A loaded text classifier. Returns the class distribution for one text.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>>;
    fn name(&self) -> &str;
}

/// Produces a classifier. Called at most once successfully per `LearnedModel`.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn TextClassifier>>;
}

// --- LearnedModel ---

/// Lazily loaded classifier shared by every scoring call.
///
/// The first call that needs the model loads it; concurrent first callers
/// wait on the same load. A failed load is not cached, so the next call
/// retries.
pub struct LearnedModel {
    loader: Box<dyn ModelLoader>,
    classifier: OnceCell<Arc<dyn TextClassifier>>,
    fake_labels: Vec<String>,
}

impl LearnedModel {
    pub fn new(loader: impl ModelLoader + 'static, fake_labels: Vec<String>) -> Self {
        Self {
            loader: Box::new(loader),
            classifier: OnceCell::new(),
            fake_labels: fake_labels.into_iter().map(|l| l.to_uppercase()).collect(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.classifier.initialized()
    }

    /// Load the classifier now instead of on first use.
    pub async fn warm_up(&self) -> Result<()> {
        self.classifier().await.map(|_| ())
    }

    async fn classifier(&self) -> Result<&Arc<dyn TextClassifier>> {
        self.classifier
            .get_or_try_init(|| async {
                let classifier = self.loader.load().await.inspect_err(|e| {
                    warn!(error = %e, "Model load failed");
                })?;
                info!(model = classifier.name(), "Model loaded");
                Ok(classifier)
            })
            .await
    }

    /// Classify text and map the distribution to fake/real probabilities.
    pub async fn score(&self, text: &str) -> Result<ModelOutput> {
        let classifier = self.classifier().await?;
        let input = truncate_chars(text, MAX_MODEL_INPUT_CHARS);
        let distribution = classifier.classify(input).await?;
        map_distribution(&distribution, &self.fake_labels)
    }
}

/// Fold a class distribution into fake/real probabilities.
///
/// Labels listed in `fake_labels` count toward fake, everything else toward
/// real. When only one side is reported the other is its complement;
/// otherwise the two sides are normalized to sum to one.
pub fn map_distribution(distribution: &[LabelScore], fake_labels: &[String]) -> Result<ModelOutput> {
    let top = distribution
        .iter()
        .filter(|ls| ls.score.is_finite())
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| NewsCheckError::ModelUnavailable("classifier returned no labels".into()))?;

    let is_fake = |label: &str| fake_labels.iter().any(|f| f.eq_ignore_ascii_case(label));

    let mut fake = None::<f64>;
    let mut real = None::<f64>;
    for ls in distribution.iter().filter(|ls| ls.score.is_finite()) {
        let side = if is_fake(&ls.label) { &mut fake } else { &mut real };
        *side = Some(side.unwrap_or(0.0) + ls.score.clamp(0.0, 1.0));
    }

    let (fake_probability, real_probability) = match (fake, real) {
        (Some(f), None) => (f.min(1.0), 1.0 - f.min(1.0)),
        (None, Some(r)) => (1.0 - r.min(1.0), r.min(1.0)),
        (Some(f), Some(r)) if f + r > 0.0 => (f / (f + r), r / (f + r)),
        _ => (0.5, 0.5),
    };

    Ok(ModelOutput {
        raw_label: top.label.clone(),
        raw_probability: top.score.clamp(0.0, 1.0),
        fake_probability,
        real_probability,
    })
}
