//! Integration test support for Holocron.
//!
//! [`FakeSwapi`] serves canned SWAPI documents over real HTTP on a random
//! local port and counts every request it receives. [`TestContext`] wires
//! an [`AppState`] to it with the session persisted in a temporary
//! directory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p holocron-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{Json, Router};
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use holocron_catalog::AppState;
use holocron_catalog::config::{CatalogConfig, SessionConfig, SwapiConfig};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

#[derive(Default)]
struct Documents {
    bodies: Mutex<HashMap<String, Value>>,
    failing: Mutex<HashSet<String>>,
    hits: Mutex<HashMap<String, usize>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A local HTTP server standing in for SWAPI.
///
/// Documents are keyed by path and query, e.g. `/api/people/?page=1`.
/// Unknown paths return 404; paths marked with [`FakeSwapi::fail`] return 500.
pub struct FakeSwapi {
    addr: SocketAddr,
    documents: Arc<Documents>,
    handle: JoinHandle<()>,
}

impl FakeSwapi {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let documents = Arc::new(Documents::default());
        let app = Router::new()
            .fallback(serve)
            .with_state(Arc::clone(&documents));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            documents,
            handle,
        })
    }

    /// API root, e.g. `http://127.0.0.1:41234/api`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Absolute URL for `path` under the API root.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }

    /// Serve `body` at `path` (relative to the API root, e.g. `/planets/1/`).
    pub fn insert(&self, path: &str, body: Value) {
        lock(&self.documents.bodies).insert(format!("/api{path}"), body);
    }

    /// Make `path` answer 500 until [`FakeSwapi::recover`] is called.
    pub fn fail(&self, path: &str) {
        lock(&self.documents.failing).insert(format!("/api{path}"));
    }

    pub fn recover(&self, path: &str) {
        lock(&self.documents.failing).remove(&format!("/api{path}"));
    }

    /// Requests received for `path`.
    #[must_use]
    pub fn hits(&self, path: &str) -> usize {
        lock(&self.documents.hits)
            .get(&format!("/api{path}"))
            .copied()
            .unwrap_or(0)
    }

    /// Requests received for any path.
    #[must_use]
    pub fn total_hits(&self) -> usize {
        lock(&self.documents.hits).values().sum()
    }

    // =========================================================================
    // Fixtures
    // =========================================================================

    /// A character document linking to this server.
    #[must_use]
    pub fn person(&self, id: u32, name: &str, planet: u32, species: &[u32], films: &[u32]) -> Value {
        json!({
            "name": name,
            "height": "172",
            "mass": "77",
            "hair_color": "n/a",
            "skin_color": "n/a",
            "eye_color": "n/a",
            "birth_year": "unknown",
            "gender": "n/a",
            "homeworld": self.url(&format!("/planets/{planet}/")),
            "films": films.iter().map(|f| self.url(&format!("/films/{f}/"))).collect::<Vec<_>>(),
            "species": species.iter().map(|s| self.url(&format!("/species/{s}/"))).collect::<Vec<_>>(),
            "created": "2014-12-10T15:10:51.357000Z",
            "url": self.url(&format!("/people/{id}/")),
        })
    }

    /// Serve `results` as listing page `page`, linking to `page + 1` if
    /// `has_next`.
    pub fn people_page(&self, page: u32, results: Vec<Value>, has_next: bool) {
        let next = has_next.then(|| self.url(&format!("/people/?page={}", page + 1)));
        let previous = (page > 1).then(|| self.url(&format!("/people/?page={}", page - 1)));
        self.insert(
            &format!("/people/?page={page}"),
            json!({
                "count": results.len(),
                "next": next,
                "previous": previous,
                "results": results,
            }),
        );
    }

    pub fn planet(&self, id: u32, name: &str, population: &str) {
        self.insert(
            &format!("/planets/{id}/"),
            json!({"name": name, "terrain": "desert", "climate": "arid", "population": population}),
        );
    }

    pub fn species(&self, id: u32, name: &str) {
        self.insert(
            &format!("/species/{id}/"),
            json!({"name": name, "classification": "mammal", "designation": "sentient"}),
        );
    }

    pub fn film(&self, id: u32, title: &str) {
        self.insert(&format!("/films/{id}/"), json!({"title": title}));
    }

    /// Three characters over two pages: [Luke, C-3PO] then [R2-D2].
    pub fn seed_small(&self) {
        self.people_page(
            1,
            vec![
                self.person(1, "Luke Skywalker", 1, &[], &[1, 2]),
                self.person(2, "C-3PO", 1, &[2], &[1, 2]),
            ],
            true,
        );
        self.people_page(2, vec![self.person(3, "R2-D2", 8, &[2], &[1])], false);
        self.planet(1, "Tatooine", "200000");
        self.planet(8, "Naboo", "4500000000");
        self.species(2, "Droid");
        self.film(1, "A New Hope");
        self.film(2, "The Empire Strikes Back");
    }

    /// `count` characters in pages of ten, alternating between two planets.
    ///
    /// Character `n` is named `Trooper n`, lives on Tatooine when `n` is odd
    /// and Naboo otherwise, and appears in one film.
    pub fn seed_crowd(&self, count: u32) {
        let pages = count.div_ceil(10).max(1);
        for page in 1..=pages {
            let first = (page - 1) * 10 + 1;
            let last = (page * 10).min(count);
            let results = (first..=last)
                .map(|n| {
                    let planet = if n % 2 == 1 { 1 } else { 8 };
                    self.person(n, &format!("Trooper {n}"), planet, &[], &[1])
                })
                .collect();
            self.people_page(page, results, page < pages);
        }
        self.planet(1, "Tatooine", "200000");
        self.planet(8, "Naboo", "4500000000");
        self.film(1, "A New Hope");
    }
}

impl Drop for FakeSwapi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(State(documents): State<Arc<Documents>>, uri: Uri) -> Response {
    let key = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_owned(), |pq| pq.as_str().to_owned());

    *lock(&documents.hits).entry(key.clone()).or_insert(0) += 1;

    if lock(&documents.failing).contains(&key) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "Server error"})),
        )
            .into_response();
    }

    match lock(&documents.bodies).get(&key).cloned() {
        Some(body) => Json(body).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found"}))).into_response(),
    }
}

/// A fake SWAPI plus application state persisting sessions in a temp dir.
pub struct TestContext {
    pub swapi: FakeSwapi,
    pub state: AppState,
    pub session_dir: TempDir,
}

impl TestContext {
    /// Start a fake SWAPI and build state against it.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind or state cannot be built.
    pub async fn new(page_size: usize) -> Result<Self, Box<dyn std::error::Error>> {
        let swapi = FakeSwapi::start().await?;
        let session_dir = tempfile::tempdir()?;
        let state = AppState::new(config(&swapi.base_url(), &session_dir, page_size)?)?;

        Ok(Self {
            swapi,
            state,
            session_dir,
        })
    }

    /// Fresh state over the same server and session directory, as a new
    /// process would see it.
    ///
    /// # Errors
    ///
    /// Returns an error if state cannot be built.
    pub fn restart(&self) -> Result<AppState, Box<dyn std::error::Error>> {
        let page_size = self.state.config().page_size;
        Ok(AppState::new(config(
            &self.swapi.base_url(),
            &self.session_dir,
            page_size,
        )?)?)
    }
}

fn config(
    base_url: &str,
    session_dir: &TempDir,
    page_size: usize,
) -> Result<CatalogConfig, url::ParseError> {
    Ok(CatalogConfig {
        swapi: SwapiConfig {
            base_url: Url::parse(base_url)?,
            timeout: Duration::from_secs(5),
        },
        page_size,
        session: SessionConfig::immediate(session_dir.path().to_path_buf()),
        sentry_dsn: None,
    })
}
