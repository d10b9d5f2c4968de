// Corroboration search. Results are advisory and never feed the score.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use newscheck_common::SearchResult;
use serde::Deserialize;
use tracing::info;

const NEWSAPI_URL: &str = "https://newsapi.org/v2/everything";
const DUCKDUCKGO_URL: &str = "https://api.duckduckgo.com/";

// --- WebSearcher trait ---

#[async_trait]
pub trait WebSearcher: Send + Sync {
    async fn search(&self, claim: &str, max_results: usize) -> Result<Vec<SearchResult>>;
    fn name(&self) -> &str;
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")
}

// --- NewsAPI ---

pub struct NewsApiSearcher {
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl NewsApiSearcher {
    pub fn new(api_key: &str) -> Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            client: http_client()?,
        })
    }
}

fn newsapi_results(data: NewsApiResponse, max_results: usize) -> Vec<SearchResult> {
    data.articles
        .into_iter()
        .filter_map(|a| {
            Some(SearchResult {
                title: a.title.unwrap_or_default(),
                snippet: a.description.unwrap_or_default(),
                url: a.url.filter(|u| !u.is_empty())?,
            })
        })
        .take(max_results)
        .collect()
}

#[async_trait]
impl WebSearcher for NewsApiSearcher {
    async fn search(&self, claim: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        info!(claim, max_results, "NewsAPI search");

        let page_size = max_results.clamp(1, 100).to_string();
        let resp = self
            .client
            .get(NEWSAPI_URL)
            .header("Authorization", &self.api_key)
            .query(&[("q", claim), ("pageSize", page_size.as_str()), ("language", "en")])
            .send()
            .await
            .context("NewsAPI request failed")?;

        if !resp.status().is_success() {
            bail!("NewsAPI returned HTTP {}", resp.status().as_u16());
        }

        let data: NewsApiResponse = resp
            .json()
            .await
            .context("Failed to parse NewsAPI response")?;

        let results = newsapi_results(data, max_results);
        info!(claim, count = results.len(), "NewsAPI search complete");
        Ok(results)
    }

    fn name(&self) -> &str {
        "newsapi"
    }
}

// --- DuckDuckGo Instant Answer ---

pub struct DuckDuckGoSearcher {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DuckDuckGoResponse {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    related_topics: Vec<DuckDuckGoTopic>,
}

/// Related topics are either plain entries or named groups of entries.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DuckDuckGoTopic {
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<DuckDuckGoTopic>,
    },
    Entry {
        #[serde(rename = "Text", default)]
        text: String,
        #[serde(rename = "FirstURL", default)]
        first_url: String,
    },
}

impl DuckDuckGoSearcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: http_client()?,
        })
    }
}

fn flatten_topics(topics: Vec<DuckDuckGoTopic>, out: &mut Vec<SearchResult>) {
    for topic in topics {
        match topic {
            DuckDuckGoTopic::Group { topics } => flatten_topics(topics, out),
            DuckDuckGoTopic::Entry { text, first_url } if !first_url.is_empty() => {
                // Topic text reads "Title - description"; split once for the title.
                let title = text.split(" - ").next().unwrap_or_default().to_string();
                out.push(SearchResult {
                    title,
                    snippet: text,
                    url: first_url,
                });
            }
            DuckDuckGoTopic::Entry { .. } => {}
        }
    }
}

fn duckduckgo_results(data: DuckDuckGoResponse, max_results: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();
    if !data.abstract_url.is_empty() && !data.abstract_text.is_empty() {
        results.push(SearchResult {
            title: data.heading,
            snippet: data.abstract_text,
            url: data.abstract_url,
        });
    }
    flatten_topics(data.related_topics, &mut results);
    results.truncate(max_results);
    results
}

#[async_trait]
impl WebSearcher for DuckDuckGoSearcher {
    async fn search(&self, claim: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        info!(claim, max_results, "DuckDuckGo search");

        let resp = self
            .client
            .get(DUCKDUCKGO_URL)
            .query(&[
                ("q", claim),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .context("DuckDuckGo request failed")?;

        if !resp.status().is_success() {
            bail!("DuckDuckGo returned HTTP {}", resp.status().as_u16());
        }

        // The API answers with a JavaScript content type, so parse the text.
        let body = resp.text().await.context("Failed to read DuckDuckGo response")?;
        let data: DuckDuckGoResponse =
            serde_json::from_str(&body).context("Failed to parse DuckDuckGo response")?;

        let results = duckduckgo_results(data, max_results);
        info!(claim, count = results.len(), "DuckDuckGo search complete");
        Ok(results)
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newsapi_articles_without_url_are_dropped() {
        let data: NewsApiResponse = serde_json::from_str(
            r#"{"status":"ok","totalResults":3,"articles":[
                {"title":"Council approves plan","description":"Vote passed","url":"https://a.test/1"},
                {"title":"No link","description":null,"url":null},
                {"title":"Second","url":"https://a.test/2"}]}"#,
        )
        .unwrap();
        let results = newsapi_results(data, 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].snippet, "Vote passed");
        assert_eq!(results[1].snippet, "");
    }

    #[test]
    fn newsapi_respects_max_results() {
        let data: NewsApiResponse = serde_json::from_str(
            r#"{"articles":[{"url":"https://a.test/1"},{"url":"https://a.test/2"}]}"#,
        )
        .unwrap();
        assert_eq!(newsapi_results(data, 1).len(), 1);
    }

    #[test]
    fn duckduckgo_flattens_abstract_and_grouped_topics() {
        let data: DuckDuckGoResponse = serde_json::from_str(
            r#"{"Heading":"Light rail","AbstractText":"Light rail is a form of transit.",
                "AbstractURL":"https://en.wikipedia.org/wiki/Light_rail",
                "RelatedTopics":[
                  {"Text":"Tram - A rail vehicle","FirstURL":"https://duckduckgo.com/Tram"},
                  {"Name":"See also","Topics":[
                    {"Text":"Metro - Rapid transit","FirstURL":"https://duckduckgo.com/Metro"}]},
                  {"Text":"no url"}]}"#,
        )
        .unwrap();
        let results = duckduckgo_results(data, 10);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "Light rail");
        assert_eq!(results[1].title, "Tram");
        assert_eq!(results[2].url, "https://duckduckgo.com/Metro");
    }

    #[test]
    fn duckduckgo_empty_answer() {
        let data: DuckDuckGoResponse = serde_json::from_str(r#"{"RelatedTopics":[]}"#).unwrap();
        assert!(duckduckgo_results(data, 5).is_empty());
    }
}
