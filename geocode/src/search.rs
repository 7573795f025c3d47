//! Free-text address search client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{classify, GeocodeError};

/// Default public address search endpoint.
const DEFAULT_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Identifying User-Agent, required by the search service's usage policy.
const DEFAULT_USER_AGENT: &str = "pledge-signup/0.1";

/// Maximum candidates requested per search.
const RESULT_LIMIT: u32 = 5;

/// Default timeout for search requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// One candidate address returned by the search service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressCandidate {
    /// Full display form, e.g. "123 Main St, Springfield, IL, USA".
    pub display_name: String,
}

/// Raw JSON element of the search response; only the display name is
/// consumed.
#[derive(Debug, Deserialize)]
struct SearchResult {
    display_name: String,
}

/// Client for the free-text address search service.
pub struct AddressSearchClient {
    base_url: String,
    client: reqwest::Client,
}

impl AddressSearchClient {
    /// Create a client against the default public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_SEARCH_URL, DEFAULT_USER_AGENT)
    }

    /// Create a client against a custom endpoint with a custom User-Agent.
    pub fn with_base_url(base_url: &str, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Search for candidate addresses matching `query`.
    ///
    /// An empty or whitespace query returns an empty list without touching
    /// the network. US-biased, capped at [`RESULT_LIMIT`] results.
    pub async fn search(&self, query: &str) -> Result<Vec<AddressCandidate>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let limit = RESULT_LIMIT.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", limit.as_str()),
                ("countrycodes", "us"),
                ("addressdetails", "1"),
            ])
            .send()
            .await
            .map_err(classify)?;

        if !response.status().is_success() {
            return Err(GeocodeError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let results: Vec<SearchResult> = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        Ok(results
            .into_iter()
            .map(|r| AddressCandidate {
                display_name: r.display_name,
            })
            .collect())
    }

    /// Search, degrading every failure to "no results".
    ///
    /// The sign-up flow treats an unreachable search service the same as
    /// an address with no matches; the underlying error is still logged.
    pub async fn search_or_empty(&self, query: &str) -> Vec<AddressCandidate> {
        match self.search(query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "address search degraded to no results");
                Vec::new()
            }
        }
    }
}

impl Default for AddressSearchClient {
    fn default() -> Self {
        Self::new()
    }
}
