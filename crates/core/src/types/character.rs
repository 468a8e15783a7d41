//! Character records as served by SWAPI, and their enriched form.

use serde::{Deserialize, Serialize};

use super::url::{CharacterUrl, FilmUrl, PlanetUrl, SpeciesUrl};

/// Species name used when a character lists no species or the lookup fails.
pub const DEFAULT_SPECIES_NAME: &str = "Human";

/// Homeworld name used when the homeworld lookup fails.
pub const DEFAULT_HOMEWORLD_NAME: &str = "Unknown";

/// A person from the `/people/` collection.
///
/// All measurements are kept as the strings the API returns; values such as
/// `"unknown"` or `"n/a"` are common.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub height: String,
    pub mass: String,
    pub hair_color: String,
    pub skin_color: String,
    pub eye_color: String,
    pub birth_year: String,
    pub gender: String,
    pub homeworld: PlanetUrl,
    #[serde(default)]
    pub films: Vec<FilmUrl>,
    #[serde(default)]
    pub species: Vec<SpeciesUrl>,
    /// Unique identifier of the record.
    pub url: CharacterUrl,
    /// Creation timestamp (RFC 3339).
    pub created: String,
}

impl Character {
    /// Number of films the character appears in.
    #[must_use]
    pub fn film_count(&self) -> usize {
        self.films.len()
    }

    /// The species reference used for enrichment, if any.
    #[must_use]
    pub fn primary_species(&self) -> Option<&SpeciesUrl> {
        self.species.first()
    }
}

/// A [`Character`] with display names resolved from its references.
///
/// The derived names are not authoritative: they fall back to
/// [`DEFAULT_SPECIES_NAME`] and [`DEFAULT_HOMEWORLD_NAME`] when a lookup fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedCharacter {
    #[serde(flatten)]
    pub character: Character,
    pub species_name: String,
    pub homeworld_name: String,
}

impl EnrichedCharacter {
    /// Attach resolved names to a character.
    #[must_use]
    pub const fn new(character: Character, species_name: String, homeworld_name: String) -> Self {
        Self {
            character,
            species_name,
            homeworld_name,
        }
    }

    /// Character name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.character.name
    }

    /// Unique identifier of the underlying record.
    #[must_use]
    pub const fn url(&self) -> &CharacterUrl {
        &self.character.url
    }

    /// Film count rendered the way the film-count facet compares it.
    #[must_use]
    pub fn film_count_key(&self) -> String {
        self.character.film_count().to_string()
    }
}
