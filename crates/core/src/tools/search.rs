//! # Web Search
//!
//! Search providers used by the Researcher.
//!
//! - `GoogleSearch` - Google Custom Search JSON API
//! - `SearxngSearch` - self-hosted SearXNG instance
//! - `SimulatedSearch` - deterministic placeholder results
//!
//! Live providers are wrapped in `DegradingSearch`, which answers with the
//! simulated set whenever the live call fails.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

pub const DEFAULT_GOOGLE_BASE_URL: &str = "https://www.googleapis.com";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
const SUMMARY_TOP_RESULTS: usize = 3;

/// A single ranked result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
    /// Display host of the result (e.g. `example.com`)
    pub source: String,
}

/// Results for one query plus a prompt-ready summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub summary: String,
    /// Placeholder results, not from a real search engine
    #[serde(default)]
    pub simulated: bool,
}

impl SearchResponse {
    fn new(query: &str, results: Vec<SearchHit>, simulated: bool) -> Self {
        Self {
            query: query.to_string(),
            summary: summarize(query, &results, simulated),
            results,
            simulated,
        }
    }
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether results come from a real search engine
    fn is_live(&self) -> bool {
        true
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResponse, SearchError>;
}

fn summarize(query: &str, results: &[SearchHit], simulated: bool) -> String {
    if results.is_empty() {
        return format!("No search results found for \"{}\".", query);
    }

    let top = results
        .iter()
        .take(SUMMARY_TOP_RESULTS)
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. **{}**\n   {}\n   Source: {}",
                i + 1,
                r.title,
                r.snippet,
                r.source
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let label = if simulated {
        "Simulated Search Results"
    } else {
        "Search Results"
    };
    format!(
        "{} for \"{}\" ({} results):\n\n{}",
        label,
        query,
        results.len(),
        top
    )
}

fn http_client() -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(SEARCH_TIMEOUT)
        .build()
        .map_err(|e| SearchError::Unavailable(format!("Failed to create HTTP client: {}", e)))
}

fn display_host(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

// ============================================================================
// Simulated
// ============================================================================

/// Deterministic placeholder provider for unconfigured deployments.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSearch;

impl SimulatedSearch {
    pub fn results_for(query: &str) -> SearchResponse {
        let encoded = urlencoding::encode(query);
        let hits = vec![
            SearchHit {
                title: format!("{} - Overview and Latest Updates", query),
                link: format!("https://example.com/search/{}", encoded),
                snippet: format!(
                    "Comprehensive information about {}. This is a simulated search result.",
                    query
                ),
                source: "example.com".to_string(),
            },
            SearchHit {
                title: format!("{} - Research and Analysis", query),
                link: format!("https://research.example.com/{}", encoded),
                snippet: format!(
                    "In-depth analysis related to {}. This is a simulated search result.",
                    query
                ),
                source: "research.example.com".to_string(),
            },
            SearchHit {
                title: format!("{} - News and Updates", query),
                link: format!("https://news.example.com/{}", encoded),
                snippet: format!(
                    "Recent news about {}. This is a simulated search result.",
                    query
                ),
                source: "news.example.com".to_string(),
            },
        ];
        SearchResponse::new(query, hits, true)
    }
}

#[async_trait]
impl SearchProvider for SimulatedSearch {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn is_live(&self) -> bool {
        false
    }

    async fn search(&self, query: &str, _max_results: usize) -> Result<SearchResponse, SearchError> {
        Ok(Self::results_for(query))
    }
}

// ============================================================================
// Google Custom Search
// ============================================================================

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    display_link: String,
}

pub struct GoogleSearch {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    engine_id: String,
}

impl GoogleSearch {
    pub fn new(
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
        base_url: Option<String>,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_GOOGLE_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
        })
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResponse, SearchError> {
        // The API caps `num` at 10
        let num = max_results.clamp(1, 10);
        let url = format!(
            "{}/customsearch/v1?key={}&cx={}&q={}&num={}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.engine_id),
            urlencoding::encode(query),
            num
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SearchError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SearchError::Unavailable(format!(
                "Search API error: {}",
                response.status().as_u16()
            )));
        }

        let data: GoogleResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Unavailable(format!("Invalid search response: {}", e)))?;

        let hits = data
            .items
            .into_iter()
            .take(max_results)
            .map(|item| {
                let source = if item.display_link.is_empty() {
                    display_host(&item.link)
                } else {
                    item.display_link
                };
                SearchHit {
                    title: item.title,
                    link: item.link,
                    snippet: item.snippet,
                    source,
                }
            })
            .collect();

        Ok(SearchResponse::new(query, hits, false))
    }
}

// ============================================================================
// SearXNG
// ============================================================================

pub struct SearxngSearch {
    client: reqwest::Client,
    base_url: String,
}

impl SearxngSearch {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SearchError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SearchProvider for SearxngSearch {
    fn name(&self) -> &'static str {
        "searxng"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResponse, SearchError> {
        let url = format!(
            "{}/search?q={}&format=json",
            self.base_url,
            urlencoding::encode(query)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SearchError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SearchError::Unavailable(format!(
                "SearXNG error: {}",
                response.status().as_u16()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SearchError::Unavailable(format!("Invalid SearXNG response: {}", e)))?;

        let results = json
            .get("results")
            .and_then(|r| r.as_array())
            .ok_or_else(|| SearchError::Unavailable("SearXNG response has no results".into()))?;

        let field = |r: &serde_json::Value, key: &str| {
            r.get(key)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };

        let hits = results
            .iter()
            .take(max_results)
            .map(|r| {
                let link = field(r, "url");
                SearchHit {
                    title: field(r, "title"),
                    snippet: field(r, "content"),
                    source: display_host(&link),
                    link,
                }
            })
            .collect();

        Ok(SearchResponse::new(query, hits, false))
    }
}

// ============================================================================
// Degradation wrapper
// ============================================================================

/// Live provider that falls back to simulated results on failure.
pub struct DegradingSearch {
    inner: Box<dyn SearchProvider>,
}

impl DegradingSearch {
    pub fn new(inner: Box<dyn SearchProvider>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl SearchProvider for DegradingSearch {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn is_live(&self) -> bool {
        self.inner.is_live()
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResponse, SearchError> {
        match self.inner.search(query, max_results).await {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::warn!(
                    provider = self.inner.name(),
                    query = %query,
                    error = %e,
                    "Search failed, using simulated results"
                );
                Ok(SimulatedSearch::results_for(query))
            }
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Which search provider to use, resolved from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchConfig {
    Google {
        api_key: String,
        engine_id: String,
    },
    Searxng {
        base_url: String,
    },
    #[default]
    Simulated,
}

impl SearchConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let (Some(api_key), Some(engine_id)) = (
            non_empty("GOOGLE_SEARCH_API_KEY"),
            non_empty("GOOGLE_SEARCH_ENGINE_ID"),
        ) {
            return SearchConfig::Google { api_key, engine_id };
        }

        if let Some(base_url) = non_empty("SEARXNG_URL") {
            return SearchConfig::Searxng { base_url };
        }

        SearchConfig::Simulated
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            SearchConfig::Google { .. } => "google",
            SearchConfig::Searxng { .. } => "searxng",
            SearchConfig::Simulated => "simulated",
        }
    }

    /// Build the provider. Falls back to simulated search if the HTTP
    /// client cannot be created.
    pub fn create_provider(&self) -> Arc<dyn SearchProvider> {
        let live: Result<Box<dyn SearchProvider>, SearchError> = match self {
            SearchConfig::Google { api_key, engine_id } => {
                GoogleSearch::new(api_key.clone(), engine_id.clone(), None)
                    .map(|p| Box::new(p) as Box<dyn SearchProvider>)
            }
            SearchConfig::Searxng { base_url } => SearxngSearch::new(base_url.clone())
                .map(|p| Box::new(p) as Box<dyn SearchProvider>),
            SearchConfig::Simulated => {
                tracing::info!(
                    "Web search not configured, set GOOGLE_SEARCH_API_KEY and GOOGLE_SEARCH_ENGINE_ID or SEARXNG_URL"
                );
                return Arc::new(SimulatedSearch);
            }
        };

        match live {
            Ok(provider) => Arc::new(DegradingSearch::new(provider)),
            Err(e) => {
                tracing::warn!(error = %e, "Search provider unavailable, using simulated results");
                Arc::new(SimulatedSearch)
            }
        }
    }
}
