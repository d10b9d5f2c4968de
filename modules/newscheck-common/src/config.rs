use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{NewsCheckError, Result};
use crate::types::Mode;

pub const DEFAULT_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";
pub const DEFAULT_MODEL_ENDPOINT: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_FAKE_LABELS: &[&str] = &["NEGATIVE", "FAKE", "LABEL_1"];
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Application configuration loaded from environment variables.
/// Every key is optional; rule-based scoring needs none of them.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,

    // Learned model
    pub huggingface_api_key: Option<String>,
    pub model_name: String,
    pub model_endpoint: String,
    /// Model labels that mean FAKE, uppercased.
    pub fake_labels: Vec<String>,

    // Fetching and batching
    pub fetch_timeout: Duration,
    pub batch_concurrency: usize,

    /// Optional TOML file overriding the built-in lexicon.
    pub lexicon_path: Option<PathBuf>,

    // Corroboration search
    pub newsapi_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::RuleBased,
            huggingface_api_key: None,
            model_name: DEFAULT_MODEL.to_string(),
            model_endpoint: DEFAULT_MODEL_ENDPOINT.to_string(),
            fake_labels: DEFAULT_FAKE_LABELS.iter().map(|s| s.to_string()).collect(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            lexicon_path: None,
            newsapi_api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let mode = match get("NEWSCHECK_MODE") {
            Some(raw) => raw.parse()?,
            None => defaults.mode,
        };

        let fake_labels = match get("NEWSCHECK_FAKE_LABELS") {
            Some(raw) => {
                let labels: Vec<String> = raw
                    .split(',')
                    .map(|s| s.trim().to_ascii_uppercase())
                    .filter(|s| !s.is_empty())
                    .collect();
                if labels.is_empty() {
                    return Err(NewsCheckError::Config(
                        "NEWSCHECK_FAKE_LABELS must name at least one label".into(),
                    ));
                }
                labels
            }
            None => defaults.fake_labels,
        };

        let fetch_timeout = match get("NEWSCHECK_FETCH_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("NEWSCHECK_FETCH_TIMEOUT_SECS", &raw)?),
            None => defaults.fetch_timeout,
        };

        let batch_concurrency = match get("NEWSCHECK_BATCH_CONCURRENCY") {
            Some(raw) => parse_positive("NEWSCHECK_BATCH_CONCURRENCY", &raw)? as usize,
            None => defaults.batch_concurrency,
        };

        Ok(Self {
            mode,
            huggingface_api_key: get("HUGGINGFACE_API_KEY"),
            model_name: get("NEWSCHECK_MODEL").unwrap_or(defaults.model_name),
            model_endpoint: get("NEWSCHECK_MODEL_ENDPOINT")
                .map(|e| e.trim_end_matches('/').to_string())
                .unwrap_or(defaults.model_endpoint),
            fake_labels,
            fetch_timeout,
            batch_concurrency,
            lexicon_path: get("NEWSCHECK_LEXICON").map(PathBuf::from),
            newsapi_api_key: get("NEWSAPI_API_KEY"),
        })
    }

    fn log_keys(&self) {
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) => {
                    let n = v.char_indices().nth(5).map_or(v.len(), |(i, _)| i);
                    format!("{}...({} chars)", &v[..n], v.len())
                }
                None => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  NEWSCHECK_MODE: {}", self.mode);
        tracing::info!("  NEWSCHECK_MODEL: {}", self.model_name);
        tracing::info!("  HUGGINGFACE_API_KEY: {}", preview_opt(&self.huggingface_api_key));
        tracing::info!("  NEWSAPI_API_KEY: {}", preview_opt(&self.newsapi_api_key));
        if let Some(path) = &self.lexicon_path {
            tracing::info!("  NEWSCHECK_LEXICON: {}", path.display());
        }
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u64> {
    match raw.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(NewsCheckError::Config(format!(
            "{key} must be a positive integer, got '{raw}'"
        ))),
    }
}
