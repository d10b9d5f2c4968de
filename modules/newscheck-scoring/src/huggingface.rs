use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use newscheck_common::{Config, NewsCheckError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::learned::{LabelScore, ModelLoader, TextClassifier};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// Text-classification responses come back nested one level per input.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn into_distribution(self) -> Vec<LabelScore> {
        match self {
            InferenceResponse::Nested(mut outer) => {
                if outer.is_empty() {
                    Vec::new()
                } else {
                    outer.swap_remove(0)
                }
            }
            InferenceResponse::Flat(inner) => inner,
        }
    }
}

// --- Classifier ---

/// Text classifier backed by the Hugging Face Inference API.
pub struct HuggingFaceClassifier {
    http: reqwest::Client,
    url: String,
    model: String,
}

impl HuggingFaceClassifier {
    pub fn new(api_key: &str, endpoint: &str, model: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| NewsCheckError::ModelUnavailable(format!("invalid API key: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NewsCheckError::ModelUnavailable(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            url: format!("{}/{}", endpoint.trim_end_matches('/'), model),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl TextClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>> {
        debug!(model = %self.model, chars = text.chars().count(), "Inference request");

        let response = self
            .http
            .post(&self.url)
            .json(&InferenceRequest { inputs: text })
            .send()
            .await
            .map_err(|e| NewsCheckError::ModelUnavailable(format!("inference request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(NewsCheckError::ModelUnavailable(format!(
                "inference API error ({status}): {error_text}"
            )));
        }

        let parsed: InferenceResponse = response.json().await.map_err(|e| {
            NewsCheckError::ModelUnavailable(format!("unexpected inference response: {e}"))
        })?;
        Ok(parsed.into_distribution())
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// --- Loader ---

/// Builds a [`HuggingFaceClassifier`] from configuration. Loading fails when
/// no API key is configured.
pub struct HuggingFaceLoader {
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl HuggingFaceLoader {
    pub fn new(api_key: Option<String>, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key,
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.huggingface_api_key.clone(),
            config.model_endpoint.clone(),
            config.model_name.clone(),
        )
    }
}

#[async_trait]
impl ModelLoader for HuggingFaceLoader {
    async fn load(&self) -> Result<Arc<dyn TextClassifier>> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| NewsCheckError::ModelUnavailable("HUGGINGFACE_API_KEY is not set".into()))?;
        let classifier = HuggingFaceClassifier::new(api_key, &self.endpoint, &self.model)?;
        Ok(Arc::new(classifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_and_flat_responses() {
        let nested: InferenceResponse = serde_json::from_str(
            r#"[[{"label":"NEGATIVE","score":0.97},{"label":"POSITIVE","score":0.03}]]"#,
        )
        .unwrap();
        let dist = nested.into_distribution();
        assert_eq!(dist.len(), 2);
        assert_eq!(dist[0].label, "NEGATIVE");

        let flat: InferenceResponse =
            serde_json::from_str(r#"[{"label":"LABEL_1","score":0.6}]"#).unwrap();
        assert_eq!(flat.into_distribution()[0].score, 0.6);
    }

    #[test]
    fn empty_response_gives_empty_distribution() {
        let nested: InferenceResponse = serde_json::from_str("[]").unwrap();
        assert!(nested.into_distribution().is_empty());
    }

    #[tokio::test]
    async fn missing_api_key_fails_to_load() {
        let loader = HuggingFaceLoader::new(None, "https://example.test/models", "m");
        let err = loader.load().await.err().unwrap();
        assert!(matches!(err, NewsCheckError::ModelUnavailable(_)));

        let blank = HuggingFaceLoader::new(Some(String::new()), "https://example.test/models", "m");
        assert!(blank.load().await.is_err());
    }

    #[tokio::test]
    async fn loader_builds_model_url() {
        let loader = HuggingFaceLoader::new(Some("hf_test".into()), "https://example.test/models/", "org/model");
        let classifier = loader.load().await.unwrap();
        assert_eq!(classifier.name(), "org/model");
    }
}
