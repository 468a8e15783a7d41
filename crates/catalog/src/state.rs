//! Application state shared across commands.

use std::sync::Arc;

use crate::config::CatalogConfig;
use crate::error::AppError;
use crate::session::SessionStore;
use crate::swapi::SwapiClient;
use crate::view::CatalogView;

/// Long-lived resources built once from configuration.
///
/// Cheaply cloneable via `Arc`. The SWAPI client's response cache is shared
/// by every clone, so repeated loads within one process hit the network once
/// per URL.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: CatalogConfig,
    swapi: SwapiClient,
    sessions: SessionStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: CatalogConfig) -> Result<Self, AppError> {
        let swapi = SwapiClient::new(&config.swapi)?;
        let sessions = SessionStore::from_config(&config.session);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                swapi,
                sessions,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.inner.config
    }

    /// Get a reference to the memoizing SWAPI client.
    #[must_use]
    pub fn swapi(&self) -> &SwapiClient {
        &self.inner.swapi
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// A fresh catalog view over the shared client and session store.
    #[must_use]
    pub fn view(&self) -> CatalogView<SwapiClient> {
        CatalogView::new(
            self.inner.swapi.clone(),
            self.inner.sessions.clone(),
            self.inner.config.page_size,
            self.inner.config.session.refresh_interval,
        )
    }
}
