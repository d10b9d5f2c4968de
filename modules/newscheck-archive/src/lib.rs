pub mod extractor;
pub mod fetch;
pub mod search;
pub mod text_extract;

pub use extractor::{extract, extract_with, ExtractorConfig};
pub use fetch::{normalize_article_url, HttpFetcher, PageFetcher};
pub use newscheck_common::{ExtractedArticle, ExtractionStrategy, FetchError, SearchResult};
pub use search::{DuckDuckGoSearcher, NewsApiSearcher, WebSearcher};
