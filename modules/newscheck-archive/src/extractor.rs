// Article extraction from arbitrary HTML.
//
// Strategies run most-specific first; the first one yielding a non-trivial
// title AND body wins. Nothing here fails: a page no strategy understands
// comes back as `success = false` with empty text.

use std::sync::LazyLock;

use newscheck_common::{ExtractedArticle, ExtractionStrategy};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::text_extract::{
    direct_text_len, element_blocks, element_text, normalize_whitespace, strip_boilerplate,
};

pub const MIN_TITLE_CHARS: usize = 5;
pub const MIN_BODY_CHARS: usize = 50;

/// Container selectors tried by the `content_container` strategy, in order.
const CONTENT_CONTAINERS: &[&str] = &[
    "main",
    "[itemprop='articleBody']",
    "div.article-body",
    "div.post-content",
    "div.entry-content",
    "div.content",
];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static H1_SEL: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static OG_TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| selector("meta[property='og:title']"));
static OG_DESC_SEL: LazyLock<Selector> =
    LazyLock::new(|| selector("meta[property='og:description']"));
static META_DESC_SEL: LazyLock<Selector> = LazyLock::new(|| selector("meta[name='description']"));
static JSON_LD_SEL: LazyLock<Selector> =
    LazyLock::new(|| selector("script[type='application/ld+json']"));
static ARTICLE_SEL: LazyLock<Selector> = LazyLock::new(|| selector("article"));
static CONTAINER_SELS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| CONTENT_CONTAINERS.iter().map(|css| selector(css)).collect());
static PARAGRAPH_SEL: LazyLock<Selector> = LazyLock::new(|| selector("p"));
static BLOCK_SEL: LazyLock<Selector> = LazyLock::new(|| selector("div, section, td"));

static ARTICLE_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:Article|NewsArticle|BlogPosting|ReportageNewsArticle|AnalysisNewsArticle|OpinionNewsArticle|BackgroundNewsArticle|ScholarlyArticle|Report)$",
    )
    .expect("valid regex")
});

/// Minimum lengths a strategy's output must reach to count as success.
#[derive(Debug, Clone, Copy)]
pub struct ExtractorConfig {
    pub min_title_chars: usize,
    pub min_body_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_title_chars: MIN_TITLE_CHARS,
            min_body_chars: MIN_BODY_CHARS,
        }
    }
}

/// Extract title and body with the default thresholds.
pub fn extract(html: &str) -> ExtractedArticle {
    extract_with(html, &ExtractorConfig::default())
}

pub fn extract_with(html: &str, config: &ExtractorConfig) -> ExtractedArticle {
    if html.trim().is_empty() {
        debug!("Empty HTML, nothing to extract");
        return ExtractedArticle::failed();
    }

    let document = Html::parse_document(html);
    let page_title = document_title(&document);

    for strategy in ExtractionStrategy::ORDER {
        let Some((title, body)) = run_strategy(strategy, &document, page_title.as_deref()) else {
            continue;
        };

        let title = normalize_whitespace(&title);
        let body = strip_boilerplate(&body);
        if !title.is_empty()
            && !body.is_empty()
            && title.chars().count() >= config.min_title_chars
            && body.chars().count() >= config.min_body_chars
        {
            debug!(
                strategy = strategy.as_str(),
                title_chars = title.chars().count(),
                body_chars = body.chars().count(),
                "Extraction strategy succeeded"
            );
            return ExtractedArticle {
                title,
                body,
                description: meta_description(&document),
                strategy: Some(strategy),
                success: true,
            };
        }
        debug!(strategy = strategy.as_str(), "Extraction strategy produced too little text");
    }

    debug!("No extraction strategy succeeded");
    ExtractedArticle::failed()
}

fn run_strategy(
    strategy: ExtractionStrategy,
    document: &Html,
    page_title: Option<&str>,
) -> Option<(String, String)> {
    let with_page_title = |body: String| page_title.map(|t| (t.to_string(), body));

    match strategy {
        ExtractionStrategy::JsonLd => json_ld_article(document, page_title),
        ExtractionStrategy::ArticleElement => document
            .select(&ARTICLE_SEL)
            .map(element_blocks)
            .max_by_key(|text| text.len())
            .and_then(with_page_title),
        ExtractionStrategy::ContentContainer => CONTAINER_SELS
            .iter()
            .find_map(|sel| document.select(sel).next())
            .map(element_blocks)
            .and_then(with_page_title),
        ExtractionStrategy::Paragraphs => {
            let paragraphs: Vec<String> = document
                .select(&PARAGRAPH_SEL)
                .map(element_blocks)
                .filter(|p| !p.trim().is_empty())
                .collect();
            if paragraphs.is_empty() {
                None
            } else {
                with_page_title(paragraphs.join("\n"))
            }
        }
        ExtractionStrategy::LargestBlock => document
            .select(&BLOCK_SEL)
            .map(|el| (direct_text_len(el), el))
            .filter(|(len, _)| *len > 0)
            .max_by_key(|(len, _)| *len)
            .map(|(_, el)| element_blocks(el))
            .and_then(with_page_title),
    }
}

/// `<title>`, then the first `<h1>`, then `og:title`.
fn document_title(document: &Html) -> Option<String> {
    let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };

    document
        .select(&TITLE_SEL)
        .next()
        .map(element_text)
        .and_then(non_empty)
        .or_else(|| {
            document
                .select(&H1_SEL)
                .next()
                .map(element_text)
                .and_then(non_empty)
        })
        .or_else(|| meta_content(document, &OG_TITLE_SEL))
}

/// `og:description`, then `<meta name="description">`.
fn meta_description(document: &Html) -> Option<String> {
    meta_content(document, &OG_DESC_SEL).or_else(|| meta_content(document, &META_DESC_SEL))
}

fn meta_content(document: &Html, sel: &Selector) -> Option<String> {
    document
        .select(sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(normalize_whitespace)
        .filter(|s| !s.is_empty())
}

// --- JSON-LD ---

fn json_ld_article(document: &Html, page_title: Option<&str>) -> Option<(String, String)> {
    document.select(&JSON_LD_SEL).find_map(|script| {
        let raw = script_text(script);
        let parsed: Value = serde_json::from_str(&raw).ok()?;
        let article = find_article(&parsed)?;

        let body = article.get("articleBody")?.as_str()?.to_string();
        let title = ["headline", "name"]
            .iter()
            .find_map(|key| article.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .or_else(|| page_title.map(str::to_string))?;
        Some((title, body))
    })
}

fn script_text(script: ElementRef<'_>) -> String {
    let content: String = script.text().collect();
    content
        .trim()
        .trim_start_matches("<![CDATA[")
        .trim_end_matches("]]>")
        .trim()
        .to_string()
}

/// Find the first schema.org article object in a JSON-LD value, looking
/// through top-level arrays and `@graph`.
fn find_article(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_article),
        Value::Object(map) => {
            if is_article_type(map.get("@type")) {
                return Some(value);
            }
            map.get("@graph").and_then(find_article)
        }
        _ => None,
    }
}

fn is_article_type(type_val: Option<&Value>) -> bool {
    match type_val {
        Some(Value::String(s)) => ARTICLE_TYPE_RE.is_match(s),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|s| ARTICLE_TYPE_RE.is_match(s)),
        _ => false,
    }
}
