//! Mock session store.
//!
//! Holds at most one [`Session`] in durable storage under a single key.
//! Login is checked against a fixed demo account and tokens are synthesized
//! locally (see [`mock`]); nothing here is a real credential system.

mod error;
pub mod mock;
mod refresh;
mod storage;

pub use error::{AuthError, StorageError};
pub use refresh::RefreshTask;
pub use storage::{FileStorage, MemoryStorage, SessionStorage};

use std::sync::Arc;
use std::time::Duration;

use holocron_core::{Email, Session};
use secrecy::SecretString;
use tracing::{info, instrument, warn};

use crate::config::SessionConfig;

/// Storage keys.
pub mod keys {
    /// Key holding the JSON-serialized current session.
    pub const AUTH_USER: &str = "auth_user";
}

/// Issues, refreshes and clears the persisted session.
///
/// Cheap to clone; clones share the same storage.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    login_latency: Duration,
    refresh_latency: Duration,
}

impl SessionStore {
    /// Create a store over `storage` with no simulated latency.
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            login_latency: Duration::ZERO,
            refresh_latency: Duration::ZERO,
        }
    }

    /// Create a file-backed store from configuration.
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(Arc::new(FileStorage::new(config.dir.clone())))
            .with_latency(config.login_latency, config.refresh_latency)
    }

    /// Delay login and refresh completion, imitating a remote auth service.
    #[must_use]
    pub const fn with_latency(mut self, login: Duration, refresh: Duration) -> Self {
        self.login_latency = login;
        self.refresh_latency = refresh;
        self
    }

    /// Log in with the demo account and persist a fresh session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` unless the pair matches the demo
    /// account exactly, or a storage error if the session cannot be saved.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Session, AuthError> {
        simulate_latency(self.login_latency).await;

        if !mock::credentials_match(email, password) {
            warn!("Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;
        let session = Session {
            token: mock::issue_token(&email),
            refresh_token: mock::issue_token(&email),
            email,
        };
        self.save(&session)?;

        info!("Session created");
        Ok(session)
    }

    /// Delete the persisted session. Succeeds when none exists.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the record cannot be removed.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), AuthError> {
        self.storage.remove(keys::AUTH_USER)?;
        info!("Session cleared");
        Ok(())
    }

    /// The persisted session, if any.
    ///
    /// Unreadable or corrupt records are logged and reported as absent.
    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        let raw = match self.storage.get(keys::AUTH_USER) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read session record");
                return None;
            }
        };

        serde_json::from_str(&raw)
            .inspect_err(|e| warn!(error = %e, "Ignoring corrupt session record"))
            .ok()
    }

    /// Replace the current session's tokens with new ones.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NoActiveSession` if nobody is logged in, or a
    /// storage error if the update cannot be saved.
    #[instrument(skip(self))]
    pub async fn refresh_session(&self) -> Result<Session, AuthError> {
        simulate_latency(self.refresh_latency).await;

        let current = self.current_session().ok_or(AuthError::NoActiveSession)?;
        let refreshed = current.with_tokens(
            mock::issue_token(&current.email),
            mock::issue_token(&current.email),
        );
        self.save(&refreshed)?;

        info!(email = %refreshed.email, "Session refreshed");
        Ok(refreshed)
    }

    fn save(&self, session: &Session) -> Result<(), AuthError> {
        let json = serde_json::to_string(session)?;
        self.storage.set(keys::AUTH_USER, &json)?;
        Ok(())
    }
}

async fn simulate_latency(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}
