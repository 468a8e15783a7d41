//! Client-side query engine over enriched characters.
//!
//! The whole collection is materialized before querying, so filtering,
//! faceting and pagination are pure functions of the records and a
//! [`QueryState`].
//!
//! # Example
//!
//! ```rust
//! use holocron_core::query::{QueryState, apply_query};
//!
//! let records = Vec::new();
//! let mut state = QueryState::new(9);
//! state.set_search("sky");
//!
//! let result = apply_query(&records, &state);
//! assert_eq!(result.total_pages(), 0);
//! assert!(result.page_items().is_empty());
//! ```

use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::EnrichedCharacter;

/// Number of records per page used by the catalog view.
pub const DEFAULT_PAGE_SIZE: usize = 9;

/// Maximum number of page buttons offered around the current page.
pub const PAGE_WINDOW: usize = 5;

/// A single active predicate.
///
/// Every variant is an exact-match constraint except [`Filter::Search`],
/// which is a case-insensitive substring match on the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Search(String),
    Homeworld(String),
    Species(String),
    /// Decimal string compared against the film-reference count.
    FilmCount(String),
}

impl Filter {
    /// Whether `record` satisfies this predicate.
    #[must_use]
    pub fn matches(&self, record: &EnrichedCharacter) -> bool {
        match self {
            Self::Search(query) => record
                .name()
                .to_lowercase()
                .contains(&query.to_lowercase()),
            Self::Homeworld(name) => record.homeworld_name == *name,
            Self::Species(name) => record.species_name == *name,
            // String comparison: "03" does not match a count of 3.
            Self::FilmCount(count) => record.film_count_key() == *count,
        }
    }
}

/// Search text, facet selections and pagination position.
///
/// Any change to the search text or a filter moves back to page 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    search: String,
    homeworld: Option<String>,
    species: Option<String>,
    film_count: Option<String>,
    page: usize,
    page_size: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QueryState {
    /// Create an unconstrained state on page 1. A zero page size is raised to 1.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            homeworld: None,
            species: None,
            film_count: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    #[must_use]
    pub fn homeworld(&self) -> Option<&str> {
        self.homeworld.as_deref()
    }

    #[must_use]
    pub fn species(&self) -> Option<&str> {
        self.species.as_deref()
    }

    #[must_use]
    pub fn film_count(&self) -> Option<&str> {
        self.film_count.as_deref()
    }

    /// Current page, 1-based.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Replace the search text.
    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        if search != self.search {
            self.search = search;
            self.page = 1;
        }
    }

    /// Select a homeworld, or `None` (or an empty string) for any.
    pub fn set_homeworld(&mut self, homeworld: Option<String>) {
        let homeworld = normalize(homeworld);
        if homeworld != self.homeworld {
            self.homeworld = homeworld;
            self.page = 1;
        }
    }

    /// Select a species, or `None` (or an empty string) for any.
    pub fn set_species(&mut self, species: Option<String>) {
        let species = normalize(species);
        if species != self.species {
            self.species = species;
            self.page = 1;
        }
    }

    /// Select a film count, or `None` (or an empty string) for any.
    pub fn set_film_count(&mut self, film_count: Option<String>) {
        let film_count = normalize(film_count);
        if film_count != self.film_count {
            self.film_count = film_count;
            self.page = 1;
        }
    }

    /// Clear the three facet filters. The search text is kept.
    pub fn clear_filters(&mut self) {
        self.homeworld = None;
        self.species = None;
        self.film_count = None;
        self.page = 1;
    }

    /// Move to page `page`. Page 0 is treated as page 1.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// The predicates currently constraining the result.
    #[must_use]
    pub fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::with_capacity(4);
        if !self.search.is_empty() {
            filters.push(Filter::Search(self.search.clone()));
        }
        if let Some(homeworld) = &self.homeworld {
            filters.push(Filter::Homeworld(homeworld.clone()));
        }
        if let Some(species) = &self.species {
            filters.push(Filter::Species(species.clone()));
        }
        if let Some(film_count) = &self.film_count {
            filters.push(Filter::FilmCount(film_count.clone()));
        }
        filters
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Distinct values available for each filterable attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    /// Sorted lexicographically.
    pub homeworlds: Vec<String>,
    /// Sorted lexicographically.
    pub species: Vec<String>,
    /// Sorted numerically ascending.
    pub film_counts: Vec<String>,
}

impl Facets {
    /// Collect facet values from the complete, unfiltered collection.
    #[must_use]
    pub fn from_records(records: &[EnrichedCharacter]) -> Self {
        let homeworlds: BTreeSet<&str> = records
            .iter()
            .map(|r| r.homeworld_name.as_str())
            .collect();
        let species: BTreeSet<&str> = records.iter().map(|r| r.species_name.as_str()).collect();
        let film_counts: BTreeSet<usize> =
            records.iter().map(|r| r.character.film_count()).collect();

        Self {
            homeworlds: homeworlds.into_iter().map(str::to_owned).collect(),
            species: species.into_iter().map(str::to_owned).collect(),
            film_counts: film_counts.into_iter().map(|n| n.to_string()).collect(),
        }
    }
}

/// Outcome of running a [`QueryState`] against a collection.
#[derive(Debug, Clone)]
pub struct QueryResult<'a> {
    matches: Vec<&'a EnrichedCharacter>,
    facets: Facets,
    page: usize,
    page_size: usize,
}

impl<'a> QueryResult<'a> {
    /// Every record passing the active predicates, in collection order.
    #[must_use]
    pub fn matches(&self) -> &[&'a EnrichedCharacter] {
        &self.matches
    }

    #[must_use]
    pub fn filtered_count(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub const fn facets(&self) -> &Facets {
        &self.facets
    }

    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// `ceil(filtered / page_size)`; 0 when nothing matches.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.matches.len().div_ceil(self.page_size)
    }

    /// Records on the current page. Empty when the page is out of range.
    #[must_use]
    pub fn page_items(&self) -> &[&'a EnrichedCharacter] {
        let start = (self.page - 1).saturating_mul(self.page_size);
        let end = start.saturating_add(self.page_size).min(self.matches.len());
        self.matches.get(start..end).unwrap_or_default()
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Page numbers to offer around the current page.
    #[must_use]
    pub fn page_window(&self) -> Vec<usize> {
        page_window(self.page, self.total_pages())
    }
}

/// Filter, facet and paginate `records` according to `state`.
#[must_use]
pub fn apply_query<'a>(records: &'a [EnrichedCharacter], state: &QueryState) -> QueryResult<'a> {
    let filters = state.filters();
    let matches = records
        .iter()
        .filter(|record| filters.iter().all(|filter| filter.matches(record)))
        .collect();

    QueryResult {
        matches,
        facets: Facets::from_records(records),
        page: state.page(),
        page_size: state.page_size(),
    }
}

/// At most [`PAGE_WINDOW`] consecutive page numbers around `current`.
///
/// The first pages are shown near the start, the last pages near the end,
/// and otherwise the window is centered on `current`.
#[must_use]
pub fn page_window(current: usize, total: usize) -> Vec<usize> {
    let len = total.min(PAGE_WINDOW);
    let half = PAGE_WINDOW / 2;

    let first = if total <= PAGE_WINDOW || current <= half + 1 {
        1
    } else if current.saturating_add(half) >= total {
        total + 1 - PAGE_WINDOW
    } else {
        current - half
    };

    (first..first + len).collect()
}
