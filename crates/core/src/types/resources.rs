//! Related SWAPI resources and the listing envelope.

use serde::{Deserialize, Serialize};

/// A planet, referenced by a character's `homeworld` link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Homeworld {
    pub name: String,
    pub terrain: String,
    pub climate: String,
    /// Population as reported; may be the literal `"unknown"`.
    pub population: String,
}

/// A species, referenced by a character's `species` links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    pub classification: String,
    pub designation: String,
}

/// A film. Only the title is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Film {
    pub title: String,
}

/// One page of a paginated SWAPI listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of records across all pages.
    pub count: u64,
    /// Link to the next page, `None` on the last page.
    pub next: Option<String>,
    /// Link to the previous page, `None` on the first page.
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Whether the server reported another page after this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_next_null_is_last() {
        let page: Page<Film> = serde_json::from_str(
            r#"{"count": 1, "next": null, "previous": null, "results": [{"title": "A New Hope", "episode_id": 4}]}"#,
        )
        .unwrap();

        assert!(!page.has_next());
        assert_eq!(page.results[0].title, "A New Hope");
    }

    #[test]
    fn test_homeworld_keeps_unknown_population() {
        let planet: Homeworld = serde_json::from_str(
            r#"{"name": "Dagobah", "terrain": "swamp, jungles", "climate": "murky", "population": "unknown"}"#,
        )
        .unwrap();

        assert_eq!(planet.population, "unknown");
    }
}
