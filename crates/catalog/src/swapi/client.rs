//! SWAPI client implementation.
//!
//! Uses `reqwest` for HTTP and memoizes every successful response body in a
//! `moka` cache keyed by the exact request URL.

use std::sync::Arc;

use holocron_core::{Character, Film, FilmUrl, Homeworld, Page, PlanetUrl, Species, SpeciesUrl};
use moka::future::Cache;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{JsonGateway, SwapiError, fetch};
use crate::config::SwapiConfig;

// =============================================================================
// SwapiClient
// =============================================================================

/// Client for the Star Wars API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct SwapiClient {
    inner: Arc<SwapiClientInner>,
}

struct SwapiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, Value>,
}

impl SwapiClient {
    /// Create a new SWAPI client.
    ///
    /// # Errors
    ///
    /// Returns `SwapiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &SwapiConfig) -> Result<Self, SwapiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("holocron/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // No capacity bound and no TTL: entries live as long as the client.
        let cache = Cache::builder().build();

        Ok(Self {
            inner: Arc::new(SwapiClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Base URL all listing endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Number of memoized responses.
    pub async fn cached_entries(&self) -> u64 {
        self.inner.cache.run_pending_tasks().await;
        self.inner.cache.entry_count()
    }

    /// Build `{base}/{collection}/` with the given query parameters.
    fn collection_url(&self, collection: &str, query: &[(&str, &str)]) -> Result<Url, SwapiError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/{collection}/"))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Perform the GET without consulting the cache.
    async fn get_uncached(&self, url: &str) -> Result<Value, SwapiError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(status = %status, "SWAPI returned non-success status");
            return Err(SwapiError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| {
            warn!(
                error = %source,
                body = %body.chars().take(200).collect::<String>(),
                "Failed to parse SWAPI response"
            );
            SwapiError::Parse {
                url: url.to_owned(),
                source,
            }
        })
    }

    // =========================================================================
    // Resource Methods
    // =========================================================================

    /// Get one page of the character listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the page is malformed.
    pub async fn get_people(&self, page: u32) -> Result<Page<Character>, SwapiError> {
        let url = self.people_url(page)?;
        fetch(self, &url).await
    }

    /// Search characters by name on the server side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the page is malformed.
    pub async fn search_people(&self, query: &str) -> Result<Page<Character>, SwapiError> {
        let url = self.collection_url("people", &[("search", query)])?;
        fetch(self, url.as_str()).await
    }

    /// Get a planet by its reference URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the record is malformed.
    pub async fn get_homeworld(&self, url: &PlanetUrl) -> Result<Homeworld, SwapiError> {
        fetch(self, url.as_str()).await
    }

    /// Get a species by its reference URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the record is malformed.
    pub async fn get_species(&self, url: &SpeciesUrl) -> Result<Species, SwapiError> {
        fetch(self, url.as_str()).await
    }

    /// Get a film by its reference URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the record is malformed.
    pub async fn get_film(&self, url: &FilmUrl) -> Result<Film, SwapiError> {
        fetch(self, url.as_str()).await
    }
}

impl JsonGateway for SwapiClient {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch_json(&self, url: &str) -> Result<Value, SwapiError> {
        if let Some(value) = self.inner.cache.get(url).await {
            debug!("Cache hit");
            return Ok(value);
        }

        let value = self.get_uncached(url).await?;

        // Concurrent misses for the same URL may both insert the same payload.
        self.inner.cache.insert(url.to_owned(), value.clone()).await;

        Ok(value)
    }

    fn people_url(&self, page: u32) -> Result<String, SwapiError> {
        let page = page.to_string();
        Ok(self.collection_url("people", &[("page", &page)])?.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base: &str) -> SwapiClient {
        SwapiClient::new(&SwapiConfig {
            base_url: Url::parse(base).unwrap(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_people_url() {
        let client = client("https://swapi.dev/api");
        assert_eq!(
            client.people_url(1).unwrap(),
            "https://swapi.dev/api/people/?page=1"
        );
    }

    #[test]
    fn test_people_url_tolerates_trailing_slash() {
        let client = client("https://swapi.dev/api/");
        assert_eq!(
            client.people_url(3).unwrap(),
            "https://swapi.dev/api/people/?page=3"
        );
    }

    #[test]
    fn test_search_url_is_encoded() {
        let client = client("https://swapi.dev/api");
        let url = client
            .collection_url("people", &[("search", "r2 d2&x")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://swapi.dev/api/people/?search=r2+d2%26x"
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        // Port 9 (discard) on localhost refuses connections.
        let client = client("http://127.0.0.1:9/api");
        let url = client.people_url(1).unwrap();

        assert!(client.fetch_json(&url).await.is_err());
        assert_eq!(client.cached_entries().await, 0);
    }
}
