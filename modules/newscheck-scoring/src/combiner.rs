use std::sync::Arc;

use newscheck_common::{Config, Details, Mode, NewsCheckError, Result, ScoreResult};
use tracing::debug;

use crate::heuristic::{rule_confidence, HeuristicScorer};
use crate::huggingface::HuggingFaceLoader;
use crate::learned::{LearnedModel, ModelLoader};
use crate::lexicon::Lexicon;

/// Share of the heuristic score in hybrid mode. The model gets the rest.
pub const HYBRID_RULE_WEIGHT: f64 = 0.6;
pub const HYBRID_MODEL_WEIGHT: f64 = 1.0 - HYBRID_RULE_WEIGHT;

/// Scores text with the heuristic scorer, the learned model, or both.
///
/// Cheap to clone; clones share the lazily loaded model.
#[derive(Clone)]
pub struct ScoreCombiner {
    heuristic: Arc<HeuristicScorer>,
    model: Option<Arc<LearnedModel>>,
    pub(crate) batch_concurrency: usize,
}

impl ScoreCombiner {
    /// Rule-based only. Model modes fail with `ModelUnavailable`.
    pub fn new(heuristic: HeuristicScorer) -> Self {
        Self {
            heuristic: Arc::new(heuristic),
            model: None,
            batch_concurrency: newscheck_common::config::DEFAULT_BATCH_CONCURRENCY,
        }
    }

    pub fn with_model(mut self, model: LearnedModel) -> Self {
        self.model = Some(Arc::new(model));
        self
    }

    pub fn with_loader(self, loader: impl ModelLoader + 'static, fake_labels: Vec<String>) -> Self {
        self.with_model(LearnedModel::new(loader, fake_labels))
    }

    pub fn with_batch_concurrency(mut self, n: usize) -> Self {
        self.batch_concurrency = n.max(1);
        self
    }

    /// Heuristic from the configured lexicon (or the built-in one) plus the
    /// Hugging Face model. The model is not contacted until first use.
    pub fn from_config(config: &Config) -> Result<Self> {
        let lexicon = match &config.lexicon_path {
            Some(path) => Lexicon::load(path)?,
            None => Lexicon::default(),
        };
        Ok(Self::new(HeuristicScorer::new(&lexicon)?)
            .with_loader(HuggingFaceLoader::from_config(config), config.fake_labels.clone())
            .with_batch_concurrency(config.batch_concurrency))
    }

    pub fn heuristic(&self) -> &HeuristicScorer {
        &self.heuristic
    }

    pub fn model(&self) -> Option<&LearnedModel> {
        self.model.as_deref()
    }

    fn learned(&self) -> Result<&LearnedModel> {
        self.model
            .as_deref()
            .ok_or_else(|| NewsCheckError::ModelUnavailable("no model configured".into()))
    }

    /// Score one text. Blank text gives the zero result in every mode
    /// without touching the model.
    pub async fn predict(&self, text: &str, mode: Mode) -> Result<ScoreResult> {
        if text.trim().is_empty() {
            return Ok(ScoreResult::empty_input(mode));
        }

        let result = match mode {
            Mode::RuleBased => self.heuristic.predict(text),
            Mode::Transformer => {
                let output = self.learned()?.score(text).await?;
                ScoreResult::new(
                    output.fake_probability,
                    output.confidence(),
                    Mode::Transformer,
                    Details::Transformer(output),
                )
            }
            Mode::Hybrid => {
                let output = self.learned()?.score(text).await?;
                let (rule_score, breakdown) = self.heuristic.score(text);
                let fake_score =
                    HYBRID_RULE_WEIGHT * rule_score + HYBRID_MODEL_WEIGHT * output.fake_probability;
                let confidence = HYBRID_RULE_WEIGHT * rule_confidence(rule_score)
                    + HYBRID_MODEL_WEIGHT * output.confidence();
                ScoreResult::new(
                    fake_score,
                    confidence,
                    Mode::Hybrid,
                    Details::Hybrid {
                        rule_based: breakdown,
                        transformer: output,
                    },
                )
            }
        };

        debug!(
            mode = %mode,
            fake_score = result.fake_score,
            label = %result.label,
            "Scored text"
        );
        Ok(result)
    }
}

impl Default for ScoreCombiner {
    fn default() -> Self {
        Self::new(HeuristicScorer::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newscheck_common::Label;

    #[tokio::test]
    async fn rule_based_needs_no_model() {
        let combiner = ScoreCombiner::default();
        let r = combiner
            .predict("You won't BELIEVE what this celebrity did LAST NIGHT!!!", Mode::RuleBased)
            .await
            .unwrap();
        assert_eq!(r.method, Mode::RuleBased);
        assert_eq!(r.label, Label::Fake);
    }

    #[tokio::test]
    async fn model_modes_without_model_are_unavailable() {
        let combiner = ScoreCombiner::default();
        for mode in [Mode::Transformer, Mode::Hybrid] {
            let err = combiner.predict("Council meets Tuesday", mode).await.unwrap_err();
            assert!(matches!(err, NewsCheckError::ModelUnavailable(_)));
        }
    }

    #[tokio::test]
    async fn empty_text_skips_the_model() {
        let combiner = ScoreCombiner::default();
        let r = combiner.predict("  ", Mode::Transformer).await.unwrap();
        assert_eq!(r.fake_score, 0.0);
        assert_eq!(r.method, Mode::Transformer);
    }

    #[test]
    fn hybrid_weights_sum_to_one() {
        assert!((HYBRID_RULE_WEIGHT + HYBRID_MODEL_WEIGHT - 1.0).abs() < 1e-12);
    }

    #[test]
    fn batch_concurrency_is_at_least_one() {
        assert_eq!(ScoreCombiner::default().with_batch_concurrency(0).batch_concurrency, 1);
    }
}
