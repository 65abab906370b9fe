//! Corroborating-source lookups
//!
//! Two sources are supported: a web search over the DuckDuckGo HTML endpoint
//! and the NewsAPI `everything` search. Both sit behind [`EvidenceSource`] so
//! the pipeline can run with any subset of them.

use async_trait::async_trait;
use reqwest::Url;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::policy::is_famous;
use super::truncate_chars;

const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com";
const NEWS_API_URL: &str = "https://newsapi.org";
const USER_AGENT: &str = concat!("newsroom/", env!("CARGO_PKG_VERSION"));

/// Results kept from one web search
pub const MAX_SEARCH_RESULTS: usize = 8;

/// Articles requested from the news API
pub const NEWS_API_PAGE_SIZE: u32 = 5;

/// Characters of submitted text used as a search query
pub const QUERY_CHARS: usize = 200;

pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const NEWS_API_TIMEOUT: Duration = Duration::from_secs(10);

/// Evidence lookup errors
#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// One corroborating article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub title: String,
    pub url: String,
}

/// Results of a single evidence source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvidenceBatch {
    pub sources: Vec<EvidenceItem>,
    pub trusted_hits: usize,
}

/// Evidence accumulated over every source the pipeline consulted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvidenceReport {
    pub sources: Vec<EvidenceItem>,
    pub trusted_hits: usize,
}

impl EvidenceReport {
    pub fn absorb(&mut self, batch: EvidenceBatch) {
        self.trusted_hits += batch.trusted_hits;
        self.sources.extend(batch.sources);
    }
}

/// A lookup that returns corroborating articles for a piece of text
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn gather(&self, text: &str) -> Result<EvidenceBatch, EvidenceError>;
}

fn build_http_client(timeout: Duration) -> Result<reqwest::Client, EvidenceError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| EvidenceError::Network(e.to_string()))
}

// ========================================
// Web search
// ========================================

/// DuckDuckGo HTML search
pub struct WebSearchClient {
    http: reqwest::Client,
    base_url: String,
}

impl WebSearchClient {
    pub fn new() -> Result<Self, EvidenceError> {
        Ok(Self {
            http: build_http_client(SEARCH_TIMEOUT)?,
            base_url: DUCKDUCKGO_HTML_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl EvidenceSource for WebSearchClient {
    fn name(&self) -> &'static str {
        "web search"
    }

    async fn gather(&self, text: &str) -> Result<EvidenceBatch, EvidenceError> {
        let url = format!("{}/html/", self.base_url);
        let query = truncate_chars(text, QUERY_CHARS);

        debug!(url = %url, "Web search request");

        let response = self
            .http
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| EvidenceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EvidenceError::Api(status.as_u16(), error_text));
        }

        let html = response
            .text()
            .await
            .map_err(|e| EvidenceError::Parse(e.to_string()))?;

        let sources = parse_search_results(&html, MAX_SEARCH_RESULTS);
        let trusted_hits = sources
            .iter()
            .filter(|item| is_famous(&item.title) || is_famous(&item.url))
            .count();

        Ok(EvidenceBatch {
            sources,
            trusted_hits,
        })
    }
}

/// Extract result links from a DuckDuckGo HTML results page
pub fn parse_search_results(html: &str, max: usize) -> Vec<EvidenceItem> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a.result__a") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let title = anchor.text().collect::<String>().trim().to_string();
            Some(EvidenceItem {
                title,
                url: resolve_result_url(href),
            })
        })
        .take(max)
        .collect()
}

/// Unwrap DuckDuckGo redirect links (`//duckduckgo.com/l/?uddg=<target>`)
fn resolve_result_url(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    match Url::parse(&absolute) {
        Ok(url) if url.path().starts_with("/l/") => url
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, target)| target.into_owned())
            .unwrap_or(absolute),
        _ => absolute,
    }
}

// ========================================
// News API
// ========================================

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    title: Option<String>,
    url: Option<String>,
}

/// NewsAPI `everything` search
pub struct NewsApiClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(api_key: &str) -> Result<Self, EvidenceError> {
        Ok(Self {
            api_key: api_key.to_string(),
            http: build_http_client(NEWS_API_TIMEOUT)?,
            base_url: NEWS_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl EvidenceSource for NewsApiClient {
    fn name(&self) -> &'static str {
        "news api"
    }

    async fn gather(&self, text: &str) -> Result<EvidenceBatch, EvidenceError> {
        let url = format!("{}/v2/everything", self.base_url);
        let query = truncate_chars(text, QUERY_CHARS);
        let page_size = NEWS_API_PAGE_SIZE.to_string();

        debug!(url = %url, "News API request");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("apiKey", self.api_key.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await
            .map_err(|e| EvidenceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EvidenceError::Api(status.as_u16(), error_text));
        }

        let body: NewsApiResponse = response
            .json()
            .await
            .map_err(|e| EvidenceError::Parse(e.to_string()))?;

        let sources: Vec<EvidenceItem> = body
            .articles
            .into_iter()
            .map(|a| EvidenceItem {
                title: a.title.unwrap_or_default(),
                url: a.url.unwrap_or_default(),
            })
            .collect();

        // every returned article counts as corroboration
        Ok(EvidenceBatch {
            trusted_hits: sources.len(),
            sources,
        })
    }
}
