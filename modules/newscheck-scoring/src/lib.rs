pub mod batch;
pub mod combiner;
pub mod heuristic;
pub mod huggingface;
pub mod learned;
pub mod lexicon;
pub mod url_analysis;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use combiner::ScoreCombiner;
pub use heuristic::HeuristicScorer;
pub use huggingface::{HuggingFaceClassifier, HuggingFaceLoader};
pub use learned::{LabelScore, LearnedModel, ModelLoader, TextClassifier};
pub use lexicon::Lexicon;
pub use url_analysis::UrlAnalyzer;
