use std::sync::Arc;

use newscheck_archive::text_extract::truncate_chars;
use newscheck_archive::{extract, normalize_article_url, PageFetcher};
use newscheck_common::{
    round3, ExtractedArticle, Label, Mode, NewsCheckError, Result, ScoreResult, UrlAnalysis,
};
use tracing::info;

use crate::combiner::ScoreCombiner;

/// Article bodies are cut to this many characters before scoring.
pub const MAX_CONTENT_CHARS: usize = 2000;
pub const CONTENT_PREVIEW_CHARS: usize = 200;
pub const TITLE_WEIGHT: f64 = 0.3;
pub const CONTENT_WEIGHT: f64 = 0.7;

/// Fetches a page, extracts the article and scores title and body.
/// Title and body scoring are both on by default.
pub struct UrlAnalyzer {
    fetcher: Arc<dyn PageFetcher>,
    combiner: ScoreCombiner,
    analyze_title: bool,
    analyze_content: bool,
}

impl UrlAnalyzer {
    pub fn new(fetcher: Arc<dyn PageFetcher>, combiner: ScoreCombiner) -> Self {
        Self {
            fetcher,
            combiner,
            analyze_title: true,
            analyze_content: true,
        }
    }

    pub fn with_title_analysis(mut self, enabled: bool) -> Self {
        self.analyze_title = enabled;
        self
    }

    pub fn with_content_analysis(mut self, enabled: bool) -> Self {
        self.analyze_content = enabled;
        self
    }

    pub async fn analyze_url(&self, raw_url: &str, mode: Mode) -> Result<UrlAnalysis> {
        let url = normalize_article_url(raw_url)?;
        info!(url = url.as_str(), fetcher = self.fetcher.name(), "Analyzing URL");

        let html = self.fetcher.fetch(&url).await?;
        let article = extract(&html);
        if !article.success {
            return Err(NewsCheckError::ExtractionFailure(url));
        }
        self.analyze_article(url, article, mode).await
    }

    /// Score an already extracted article.
    pub async fn analyze_article(
        &self,
        url: String,
        article: ExtractedArticle,
        mode: Mode,
    ) -> Result<UrlAnalysis> {
        let title_analysis = match article.title.trim() {
            title if !self.analyze_title || title.is_empty() => None,
            title => Some(self.combiner.predict(title, mode).await?),
        };
        let content = truncate_chars(&article.body, MAX_CONTENT_CHARS);
        let content_analysis = match content.trim() {
            body if !self.analyze_content || body.is_empty() => None,
            body => Some(self.combiner.predict(body, mode).await?),
        };

        let overall_fake_score = overall_score(title_analysis.as_ref(), content_analysis.as_ref());
        let overall_label = overall_fake_score.map(Label::from_score);

        if let Some(score) = overall_fake_score {
            info!(url = url.as_str(), overall_fake_score = score, "URL analyzed");
        }

        Ok(UrlAnalysis {
            content_preview: truncate_chars(&article.body, CONTENT_PREVIEW_CHARS).to_string(),
            url,
            title: article.title,
            description: article.description,
            strategy: article.strategy,
            title_analysis,
            content_analysis,
            overall_fake_score,
            overall_label,
        })
    }
}

/// Weighted blend of title and content scores, or whichever one exists.
fn overall_score(title: Option<&ScoreResult>, content: Option<&ScoreResult>) -> Option<f64> {
    match (title, content) {
        (Some(t), Some(c)) => Some(round3(
            TITLE_WEIGHT * t.fake_score + CONTENT_WEIGHT * c.fake_score,
        )),
        (Some(only), None) | (None, Some(only)) => Some(only.fake_score),
        (None, None) => None,
    }
}
