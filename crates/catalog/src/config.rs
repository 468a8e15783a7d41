//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `SWAPI_BASE_URL` - SWAPI root (default: `https://swapi.dev/api`)
//! - `HOLOCRON_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `HOLOCRON_PAGE_SIZE` - Records per catalog page (default: 9)
//! - `HOLOCRON_SESSION_DIR` - Directory holding the session record
//!   (default: platform data dir + `holocron`)
//! - `HOLOCRON_REFRESH_INTERVAL_SECS` - Session refresh period (default: 1800)
//! - `HOLOCRON_LOGIN_LATENCY_MS` - Simulated login delay (default: 500)
//! - `HOLOCRON_REFRESH_LATENCY_MS` - Simulated refresh delay (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use holocron_core::query::DEFAULT_PAGE_SIZE;
use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://swapi.dev/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30 * 60;
const DEFAULT_LOGIN_LATENCY_MS: u64 = 500;
const DEFAULT_REFRESH_LATENCY_MS: u64 = 300;
const SESSION_DIR_NAME: &str = "holocron";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("No data directory available; set HOLOCRON_SESSION_DIR")]
    NoSessionDir,
}

/// Catalog application configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// SWAPI connection settings
    pub swapi: SwapiConfig,
    /// Records per catalog page
    pub page_size: usize,
    /// Session store settings
    pub session: SessionConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// SWAPI connection settings.
#[derive(Debug, Clone)]
pub struct SwapiConfig {
    /// API root, e.g. `https://swapi.dev/api`
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Mock session store settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory holding the persisted session record
    pub dir: PathBuf,
    /// Period of the background token refresh
    pub refresh_interval: Duration,
    /// Simulated delay before a login completes
    pub login_latency: Duration,
    /// Simulated delay before a refresh completes
    pub refresh_latency: Duration,
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let page_size: usize = get_parsed_or("HOLOCRON_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "HOLOCRON_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            swapi: SwapiConfig::from_env()?,
            page_size,
            session: SessionConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
        })
    }
}

impl Default for SwapiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default SWAPI URL is valid"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl SwapiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_env_or_default("SWAPI_BASE_URL", DEFAULT_BASE_URL);
        let base_url = parse_value::<Url>("SWAPI_BASE_URL", &raw)?;
        let timeout_secs = get_parsed_or("HOLOCRON_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl SessionConfig {
    /// Settings for a store rooted at `dir` with no simulated latency.
    #[must_use]
    pub const fn immediate(dir: PathBuf) -> Self {
        Self {
            dir,
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            login_latency: Duration::ZERO,
            refresh_latency: Duration::ZERO,
        }
    }

    fn from_env() -> Result<Self, ConfigError> {
        let dir = match get_optional_env("HOLOCRON_SESSION_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_local_dir()
                .ok_or(ConfigError::NoSessionDir)?
                .join(SESSION_DIR_NAME),
        };

        let refresh_secs =
            get_parsed_or("HOLOCRON_REFRESH_INTERVAL_SECS", DEFAULT_REFRESH_INTERVAL_SECS)?;
        if refresh_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "HOLOCRON_REFRESH_INTERVAL_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            dir,
            refresh_interval: Duration::from_secs(refresh_secs),
            login_latency: Duration::from_millis(get_parsed_or(
                "HOLOCRON_LOGIN_LATENCY_MS",
                DEFAULT_LOGIN_LATENCY_MS,
            )?),
            refresh_latency: Duration::from_millis(get_parsed_or(
                "HOLOCRON_REFRESH_LATENCY_MS",
                DEFAULT_REFRESH_LATENCY_MS,
            )?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional environment variable, falling back to `default` when unset.
fn get_parsed_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

/// Parse a raw variable value, naming the variable in the error.
fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
