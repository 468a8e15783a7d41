//! Remote data gateway for the Star Wars API (SWAPI).
//!
//! # Architecture
//!
//! - Plain REST over `reqwest`; every resource is addressed by its absolute URL
//! - SWAPI is the source of truth - NO local persistence of the dataset
//! - In-memory memoization via `moka`, keyed by exact URL, for the lifetime
//!   of the client (no TTL, no eviction). Failed responses are not cached.
//! - No retries: one failed attempt is terminal for that call
//!
//! # Example
//!
//! ```rust,ignore
//! use holocron_catalog::swapi::SwapiClient;
//!
//! let client = SwapiClient::new(&config.swapi)?;
//!
//! let page = client.get_people(1).await?;
//! let tatooine = client.get_homeworld(&page.results[0].homeworld).await?;
//! ```

mod client;

pub use client::SwapiClient;

use std::future::Future;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur when talking to SWAPI.
///
/// Every variant is a fetch failure from the caller's point of view; callers
/// decide whether to fall back or surface it.
#[derive(Debug, Error)]
pub enum SwapiError {
    /// Transport failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("Failed to fetch {url}: HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// Body was not the expected JSON shape.
    #[error("JSON parse error for {url}: {source}")]
    Parse {
        /// Requested URL.
        url: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Source of JSON documents addressed by URL.
///
/// Implemented by [`SwapiClient`]; the enrichment pipeline is generic over
/// this trait so it can run against an in-memory fake.
pub trait JsonGateway: Send + Sync {
    /// Resolve `url` to its JSON payload.
    fn fetch_json(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<serde_json::Value, SwapiError>> + Send;

    /// URL of page `page` (1-based) of the character listing.
    ///
    /// # Errors
    ///
    /// Returns `SwapiError::InvalidUrl` if the configured base URL is unusable.
    fn people_url(&self, page: u32) -> Result<String, SwapiError>;
}

/// Decode a fetched payload into a typed record.
///
/// # Errors
///
/// Returns `SwapiError::Parse` if the payload does not match `T`.
pub fn decode<T: DeserializeOwned>(url: &str, value: serde_json::Value) -> Result<T, SwapiError> {
    serde_json::from_value(value).map_err(|source| SwapiError::Parse {
        url: url.to_owned(),
        source,
    })
}

/// Fetch `url` through `gateway` and decode it.
///
/// # Errors
///
/// Returns the gateway's error, or `SwapiError::Parse` on a shape mismatch.
pub async fn fetch<T, G>(gateway: &G, url: &str) -> Result<T, SwapiError>
where
    T: DeserializeOwned,
    G: JsonGateway,
{
    let value = gateway.fetch_json(url).await?;
    decode(url, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use holocron_core::Species;

    #[test]
    fn test_status_error_display() {
        let err = SwapiError::Status {
            url: "https://swapi.dev/api/species/99/".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch https://swapi.dev/api/species/99/: HTTP 404"
        );
    }

    #[test]
    fn test_decode_shape_mismatch() {
        let result: Result<Species, _> = decode(
            "https://swapi.dev/api/species/1/",
            serde_json::json!({"title": "not a species"}),
        );
        assert!(matches!(result, Err(SwapiError::Parse { .. })));
    }
}
