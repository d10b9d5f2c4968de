// Test mocks for the scoring pipeline.
//
// Three mocks matching the trait boundaries:
// - MockClassifier (TextClassifier): substring rules to a fixed distribution
// - MockLoader (ModelLoader): counts loads, can fail or stall
// - MockFetcher (PageFetcher): HashMap-based URL to HTML

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use newscheck_archive::PageFetcher;
use newscheck_common::{FetchError, NewsCheckError, Result};

use crate::learned::{LabelScore, ModelLoader, TextClassifier};

// ---------------------------------------------------------------------------
// MockClassifier
// ---------------------------------------------------------------------------

/// Returns `NEGATIVE`/`POSITIVE` with a fixed fake probability. Texts
/// containing a registered substring get that rule's probability instead;
/// texts containing a failing substring return `ModelUnavailable`.
#[derive(Clone)]
pub struct MockClassifier {
    default_fake: f64,
    rules: Vec<(String, f64)>,
    failing: Vec<String>,
    calls: Arc<AtomicUsize>,
}

impl MockClassifier {
    pub fn new(default_fake: f64) -> Self {
        Self {
            default_fake,
            rules: Vec::new(),
            failing: Vec::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn on_text(mut self, contains: &str, fake: f64) -> Self {
        self.rules.push((contains.to_string(), fake));
        self
    }

    pub fn failing_on(mut self, contains: &str) -> Self {
        self.failing.push(contains.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextClassifier for MockClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.iter().any(|needle| text.contains(needle.as_str())) {
            return Err(NewsCheckError::ModelUnavailable("MockClassifier: inference failed".into()));
        }
        let fake = self
            .rules
            .iter()
            .find(|(needle, _)| text.contains(needle.as_str()))
            .map(|(_, p)| *p)
            .unwrap_or(self.default_fake);
        Ok(vec![
            LabelScore {
                label: "NEGATIVE".into(),
                score: fake,
            },
            LabelScore {
                label: "POSITIVE".into(),
                score: 1.0 - fake,
            },
        ])
    }

    fn name(&self) -> &str {
        "mock-classifier"
    }
}

// ---------------------------------------------------------------------------
// MockLoader
// ---------------------------------------------------------------------------

/// Hands out a `MockClassifier`. Counts load attempts; can fail the first N
/// attempts and sleep before answering to widen race windows.
pub struct MockLoader {
    classifier: MockClassifier,
    loads: Arc<AtomicUsize>,
    failures_left: AtomicUsize,
    delay: Duration,
}

impl MockLoader {
    pub fn new(classifier: MockClassifier) -> Self {
        Self {
            classifier,
            loads: Arc::new(AtomicUsize::new(0)),
            failures_left: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub fn failing_first(self, n: usize) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shared counter of load attempts, readable after the loader is moved.
    pub fn load_counter(&self) -> Arc<AtomicUsize> {
        self.loads.clone()
    }
}

#[async_trait]
impl ModelLoader for MockLoader {
    async fn load(&self) -> Result<Arc<dyn TextClassifier>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(NewsCheckError::ModelUnavailable("MockLoader: scripted failure".into()));
        }
        Ok(Arc::new(self.classifier.clone()))
    }
}

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// HashMap-based page fetcher. Unregistered URLs fail with a 404.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
