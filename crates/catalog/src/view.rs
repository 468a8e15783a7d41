//! The browsing session a front end drives.
//!
//! A [`CatalogView`] owns the authentication state, the loaded collection
//! and the current query. Front ends call its operations in response to
//! user input and render [`CatalogView::result`].

use std::time::Duration;

use holocron_core::{CharacterUrl, EnrichedCharacter, QueryResult, QueryState, Session, apply_query};
use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::enrichment::{self, CharacterDetail};
use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::session::{RefreshTask, SessionStore};
use crate::swapi::{JsonGateway, SwapiClient};

struct Refresh {
    task: RefreshTask,
    updates: watch::Receiver<Option<Session>>,
}

/// Authentication, collection and query state for one user.
pub struct CatalogView<G: JsonGateway = SwapiClient> {
    gateway: G,
    sessions: SessionStore,
    session: Option<Session>,
    refresh: Option<Refresh>,
    refresh_interval: Duration,
    records: Vec<EnrichedCharacter>,
    load_error: Option<String>,
    query: QueryState,
}

impl<G: JsonGateway> CatalogView<G> {
    /// Create a view, reading the persisted session once.
    ///
    /// The refresh task is not started; call [`Self::start_refresh`] from
    /// inside a Tokio runtime.
    #[must_use]
    pub fn new(
        gateway: G,
        sessions: SessionStore,
        page_size: usize,
        refresh_interval: Duration,
    ) -> Self {
        let session = sessions.current_session();
        if let Some(session) = &session {
            set_sentry_user(session.email.as_str());
        }

        Self {
            gateway,
            sessions,
            session,
            refresh: None,
            refresh_interval,
            records: Vec::new(),
            load_error: None,
            query: QueryState::new(page_size),
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The loaded collection, in server order.
    #[must_use]
    pub fn records(&self) -> &[EnrichedCharacter] {
        &self.records
    }

    /// Message from the last failed load, cleared by the next success.
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    #[must_use]
    pub const fn query(&self) -> &QueryState {
        &self.query
    }

    /// Whether the background refresh is running.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refresh.as_ref().is_some_and(|r| !r.task.is_finished())
    }

    /// Start the background refresh if logged in and not already running.
    pub fn start_refresh(&mut self) {
        if self.session.is_none() || self.is_refreshing() {
            return;
        }
        let (task, updates) = RefreshTask::spawn(self.sessions.clone(), self.refresh_interval);
        self.refresh = Some(Refresh { task, updates });
    }

    /// Log in and start refreshing the new session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for anything but the demo
    /// account, or a storage error.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &SecretString) -> Result<&Session> {
        let session = self.sessions.login(email, password).await?;
        set_sentry_user(session.email.as_str());
        add_breadcrumb("auth", "Logged in", None);

        self.stop_refresh();
        self.session = Some(session);
        self.start_refresh();
        debug!("Refresh task started");

        self.session.as_ref().ok_or(AppError::Unauthenticated)
    }

    /// Log out, stop refreshing and forget the loaded collection.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the persisted session cannot be removed.
    /// Local state is cleared regardless.
    pub fn logout(&mut self) -> Result<()> {
        self.clear_local_state();
        add_breadcrumb("auth", "Logged out", None);
        self.sessions.logout()?;
        Ok(())
    }

    /// Rotate the session tokens now. A failed refresh logs out.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthenticated` when not logged in, or the
    /// refresh failure after logging out.
    pub async fn refresh_now(&mut self) -> Result<&Session> {
        if self.session.is_none() {
            return Err(AppError::Unauthenticated);
        }

        match self.sessions.refresh_session().await {
            Ok(session) => Ok(self.session.insert(session)),
            Err(e) => {
                warn!(error = %e, "Refresh failed, logging out");
                self.clear_local_state();
                if let Err(e) = self.sessions.logout() {
                    warn!(error = %e, "Failed to clear session after refresh failure");
                }
                Err(e.into())
            }
        }
    }

    /// Pick up the latest state from the background refresh.
    ///
    /// Returns whether the view is still authenticated; a failed background
    /// refresh logs the view out.
    pub fn poll_refresh(&mut self) -> bool {
        let Some(refresh) = self.refresh.as_mut() else {
            return self.is_authenticated();
        };

        if refresh.updates.has_changed().unwrap_or(false) {
            let latest = refresh.updates.borrow_and_update().clone();
            match latest {
                Some(session) => self.session = Some(session),
                None => {
                    info!("Background refresh ended the session");
                    self.clear_local_state();
                }
            }
        }

        self.is_authenticated()
    }

    /// Fetch and enrich the whole collection.
    ///
    /// On failure the previous collection is kept and [`Self::load_error`]
    /// holds the message to show with a retry affordance.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthenticated` when not logged in, or
    /// `LoadError::LoadFailed` if listing the characters failed.
    #[instrument(skip(self))]
    pub async fn load_all_enriched(&mut self) -> Result<&[EnrichedCharacter]> {
        if !self.poll_refresh() {
            return Err(AppError::Unauthenticated);
        }

        add_breadcrumb("catalog", "Loading characters", None);
        match enrichment::load_all_enriched(&self.gateway).await {
            Ok(records) => {
                self.records = records;
                self.load_error = None;
                Ok(&self.records)
            }
            Err(e) => {
                let err = AppError::from(e);
                self.load_error = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Current filtered page and facets.
    #[must_use]
    pub fn result(&self) -> QueryResult<'_> {
        apply_query(&self.records, &self.query)
    }

    /// Replace the query.
    ///
    /// If the search text or any filter differs from the current query the
    /// page moves to 1; otherwise the requested page is clamped to range.
    pub fn apply_query(&mut self, state: QueryState) -> QueryResult<'_> {
        let filters_changed = state.filters() != self.query.filters();
        let page = state.page();
        self.query = state;

        if filters_changed {
            self.query.set_page(1);
        } else {
            self.clamp_page(page);
        }
        self.result()
    }

    /// Move to page `page`, clamped to `1..=max(total_pages, 1)`.
    pub fn change_page(&mut self, page: usize) -> QueryResult<'_> {
        self.clamp_page(page);
        self.result()
    }

    /// Clear the facet filters, keeping the search text.
    pub fn clear_filters(&mut self) -> QueryResult<'_> {
        self.query.clear_filters();
        self.result()
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.set_search(search);
    }

    pub fn set_homeworld(&mut self, homeworld: Option<String>) {
        self.query.set_homeworld(homeworld);
    }

    pub fn set_species(&mut self, species: Option<String>) {
        self.query.set_species(species);
    }

    pub fn set_film_count(&mut self, film_count: Option<String>) {
        self.query.set_film_count(film_count);
    }

    /// First loaded record whose name equals `name`, ignoring case.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&EnrichedCharacter> {
        self.records
            .iter()
            .find(|record| record.name().eq_ignore_ascii_case(name))
    }

    /// Resolve the full detail of a loaded character.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthenticated` when not logged in, or
    /// `AppError::NotFound` if no loaded record has that URL.
    pub async fn detail(&self, url: &CharacterUrl) -> Result<CharacterDetail> {
        if !self.is_authenticated() {
            return Err(AppError::Unauthenticated);
        }

        let record = self
            .records
            .iter()
            .find(|record| record.url() == url)
            .ok_or_else(|| AppError::NotFound(url.to_string()))?;

        add_breadcrumb("catalog", "Opened detail", Some(&[("name", record.name())]));
        Ok(enrichment::load_detail(&self.gateway, record).await)
    }

    fn clamp_page(&mut self, page: usize) {
        let total = self.result().total_pages().max(1);
        self.query.set_page(page.clamp(1, total));
    }

    fn stop_refresh(&mut self) {
        if let Some(refresh) = self.refresh.take() {
            refresh.task.cancel();
        }
    }

    fn clear_local_state(&mut self) {
        self.stop_refresh();
        self.session = None;
        self.records.clear();
        self.load_error = None;
        self.query = QueryState::new(self.query.page_size());
        clear_sentry_user();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::enrichment::tests::{FakeGateway, galaxy};
    use crate::session::{MemoryStorage, mock};

    const PERIOD: Duration = Duration::from_secs(30 * 60);

    fn view_over(gateway: FakeGateway, page_size: usize) -> CatalogView<FakeGateway> {
        let sessions = SessionStore::new(Arc::new(MemoryStorage::new()));
        CatalogView::new(gateway, sessions, page_size, PERIOD)
    }

    fn demo_password() -> SecretString {
        SecretString::from(mock::DEMO_PASSWORD)
    }

    async fn logged_in(gateway: FakeGateway, page_size: usize) -> CatalogView<FakeGateway> {
        let mut view = view_over(gateway, page_size);
        view.login(mock::DEMO_EMAIL, &demo_password()).await.unwrap();
        view
    }

    fn names(result: &QueryResult<'_>) -> Vec<String> {
        result
            .page_items()
            .iter()
            .map(|r| r.name().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn test_load_requires_login() {
        let mut view = view_over(galaxy(), 9);
        let err = view.load_all_enriched().await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));
        assert!(view.gateway().requests().is_empty());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password() {
        let mut view = view_over(galaxy(), 9);
        let err = view
            .login(mock::DEMO_EMAIL, &SecretString::from("nope"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Invalid email or password");
        assert!(!view.is_authenticated());
        assert!(!view.is_refreshing());
    }

    #[tokio::test]
    async fn test_initial_state_reads_persisted_session() {
        let sessions = SessionStore::new(Arc::new(MemoryStorage::new()));
        sessions
            .login(mock::DEMO_EMAIL, &demo_password())
            .await
            .unwrap();

        let view = CatalogView::new(galaxy(), sessions, 9, PERIOD);
        assert!(view.is_authenticated());
        assert_eq!(view.session().unwrap().email.as_str(), mock::DEMO_EMAIL);
    }

    #[tokio::test]
    async fn test_load_and_query() {
        let mut view = logged_in(galaxy(), 9).await;
        assert!(view.is_refreshing());

        let records = view.load_all_enriched().await.unwrap();
        assert_eq!(records.len(), 3);

        view.set_species(Some("Droid".to_string()));
        let result = view.result();
        assert_eq!(names(&result), vec!["C-3PO", "R2-D2"]);
        assert_eq!(result.facets().homeworlds, vec!["Naboo", "Tatooine"]);

        view.set_search("r2");
        assert_eq!(names(&view.result()), vec!["R2-D2"]);

        let result = view.clear_filters();
        assert_eq!(names(&result), vec!["R2-D2"]);
        assert_eq!(view.query().search(), "r2");
    }

    #[tokio::test]
    async fn test_change_page_is_clamped() {
        let mut view = logged_in(galaxy(), 2).await;
        view.load_all_enriched().await.unwrap();

        assert_eq!(view.change_page(2).page_items().len(), 1);
        assert_eq!(view.change_page(7).page(), 2);
        assert_eq!(view.change_page(0).page(), 1);

        view.set_search("nobody");
        assert_eq!(view.change_page(3).page(), 1);
    }

    #[tokio::test]
    async fn test_apply_query_resets_page_on_filter_change() {
        let mut view = logged_in(galaxy(), 2).await;
        view.load_all_enriched().await.unwrap();
        view.change_page(2);

        let mut same = view.query().clone();
        same.set_page(2);
        assert_eq!(view.apply_query(same).page(), 2);

        let mut next = view.query().clone();
        next.set_homeworld(Some("Tatooine".to_string()));
        next.set_page(2);
        let result = view.apply_query(next);
        assert_eq!(result.page(), 1);
        assert_eq!(result.filtered_count(), 2);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_previous_records() {
        let mut view = logged_in(galaxy(), 9).await;
        view.load_all_enriched().await.unwrap();

        view.gateway = galaxy().with(
            "https://swapi.test/api/people/?page=1",
            json!({"detail": "Not found"}),
        );
        let err = view.load_all_enriched().await.unwrap_err();

        assert!(matches!(err, AppError::Load(_)));
        assert_eq!(
            view.load_error(),
            Some("Failed to fetch characters. Please try again.")
        );
        assert_eq!(view.records().len(), 3);
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let mut view = logged_in(galaxy(), 9).await;
        view.load_all_enriched().await.unwrap();
        view.set_search("luke");

        view.logout().unwrap();

        assert!(!view.is_authenticated());
        assert!(!view.is_refreshing());
        assert!(view.records().is_empty());
        assert_eq!(view.query().search(), "");
        assert!(view.sessions.current_session().is_none());
    }

    #[tokio::test]
    async fn test_detail_of_loaded_character() {
        let mut view = logged_in(galaxy(), 9).await;
        view.load_all_enriched().await.unwrap();

        let luke = view.find_by_name("luke skywalker").unwrap().url().clone();
        let detail = view.detail(&luke).await.unwrap();
        assert_eq!(detail.character.name(), "Luke Skywalker");
        assert_eq!(detail.film_titles.len(), 2);

        let missing = CharacterUrl::new("https://swapi.test/api/people/99/");
        assert!(matches!(
            view.detail(&missing).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_refresh_updates_session() {
        let mut view = logged_in(galaxy(), 9).await;
        let before = view.session().unwrap().token.clone();

        tokio::time::sleep(PERIOD + Duration::from_secs(1)).await;

        assert!(view.poll_refresh());
        assert_ne!(view.session().unwrap().token, before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_background_refresh_logs_out() {
        let mut view = logged_in(galaxy(), 9).await;
        view.load_all_enriched().await.unwrap();

        // Session vanishes from storage; the next refresh fails.
        view.sessions.logout().unwrap();
        tokio::time::sleep(PERIOD + Duration::from_secs(1)).await;

        assert!(!view.poll_refresh());
        assert!(view.records().is_empty());
        assert!(matches!(
            view.load_all_enriched().await.unwrap_err(),
            AppError::Unauthenticated
        ));
    }

    #[tokio::test]
    async fn test_refresh_now_without_stored_session_logs_out() {
        let mut view = logged_in(galaxy(), 9).await;
        view.sessions.logout().unwrap();

        let err = view.refresh_now().await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Auth(crate::session::AuthError::NoActiveSession)
        ));
        assert!(!view.is_authenticated());
    }
}
