//! Character enrichment pipeline.
//!
//! Materializes the complete `/people/` collection, then attaches a species
//! name and a homeworld name to every record. Listing failures abort the
//! load; lookup failures only degrade the affected field to its default.

use std::collections::HashSet;

use futures::future::join_all;
use holocron_core::{
    Character, DEFAULT_HOMEWORLD_NAME, DEFAULT_SPECIES_NAME, EnrichedCharacter, Film, Homeworld,
    Page, Species,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::swapi::{JsonGateway, SwapiError, fetch};

/// Error loading the character collection.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A listing page could not be fetched or decoded. Retry by reloading.
    #[error("Failed to fetch characters. Please try again.")]
    LoadFailed(#[source] SwapiError),
}

/// An enriched character with its related records resolved in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterDetail {
    pub character: EnrichedCharacter,
    /// `None` if the homeworld could not be fetched.
    pub homeworld: Option<Homeworld>,
    /// Film titles in reference order; empty if any film lookup failed.
    pub film_titles: Vec<String>,
}

/// Fetch every character, following `next` links from page 1 until the
/// server reports no further page.
///
/// # Errors
///
/// Returns `LoadError::LoadFailed` if any page fails.
#[instrument(skip_all)]
pub async fn load_all_characters<G: JsonGateway>(
    gateway: &G,
) -> Result<Vec<Character>, LoadError> {
    let mut characters = Vec::new();
    let mut visited = HashSet::new();
    let mut next = Some(gateway.people_url(1).map_err(LoadError::LoadFailed)?);

    while let Some(url) = next.take() {
        if !visited.insert(url.clone()) {
            warn!(url = %url, "Listing links back to a visited page, stopping");
            break;
        }

        debug!(page = visited.len(), url = %url, "Fetching characters page");
        let page: Page<Character> = fetch(gateway, &url)
            .await
            .map_err(LoadError::LoadFailed)?;

        characters.extend(page.results);
        next = page.next;
    }

    info!(count = characters.len(), pages = visited.len(), "Fetched character listing");
    Ok(characters)
}

/// Resolve species and homeworld names for every character.
///
/// Lookups run concurrently across and within characters; the output keeps
/// input order.
pub async fn enrich<G: JsonGateway>(
    gateway: &G,
    characters: Vec<Character>,
) -> Vec<EnrichedCharacter> {
    join_all(
        characters
            .into_iter()
            .map(|character| enrich_one(gateway, character)),
    )
    .await
}

/// Fetch and enrich the complete character collection.
///
/// # Errors
///
/// Returns `LoadError::LoadFailed` if listing the characters fails. Species
/// and homeworld lookup failures are never surfaced.
#[instrument(skip_all)]
pub async fn load_all_enriched<G: JsonGateway>(
    gateway: &G,
) -> Result<Vec<EnrichedCharacter>, LoadError> {
    let characters = load_all_characters(gateway).await?;
    let enriched = enrich(gateway, characters).await;
    info!(count = enriched.len(), "Enriched character collection");
    Ok(enriched)
}

/// Resolve the full homeworld record and film titles for one character.
#[instrument(skip_all, fields(name = %character.name()))]
pub async fn load_detail<G: JsonGateway>(
    gateway: &G,
    character: &EnrichedCharacter,
) -> CharacterDetail {
    let homeworld_url = character.character.homeworld.as_str();
    let films = join_all(
        character
            .character
            .films
            .iter()
            .map(|url| fetch::<Film, _>(gateway, url.as_str())),
    );

    let (homeworld, films) = tokio::join!(fetch::<Homeworld, _>(gateway, homeworld_url), films);

    let homeworld = homeworld
        .inspect_err(|e| warn!(error = %e, "Failed to fetch homeworld"))
        .ok();

    let film_titles = films
        .into_iter()
        .map(|film| film.map(|f| f.title))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load one or more films");
            Vec::new()
        });

    CharacterDetail {
        character: character.clone(),
        homeworld,
        film_titles,
    }
}

async fn enrich_one<G: JsonGateway>(gateway: &G, character: Character) -> EnrichedCharacter {
    let (species_name, homeworld_name) = tokio::join!(
        species_name(gateway, &character),
        homeworld_name(gateway, &character)
    );
    EnrichedCharacter::new(character, species_name, homeworld_name)
}

async fn species_name<G: JsonGateway>(gateway: &G, character: &Character) -> String {
    let Some(url) = character.primary_species() else {
        return DEFAULT_SPECIES_NAME.to_owned();
    };

    match fetch::<Species, _>(gateway, url.as_str()).await {
        Ok(species) => species.name,
        Err(e) => {
            warn!(character = %character.name, error = %e, "Failed to fetch species");
            DEFAULT_SPECIES_NAME.to_owned()
        }
    }
}

async fn homeworld_name<G: JsonGateway>(gateway: &G, character: &Character) -> String {
    match fetch::<Homeworld, _>(gateway, character.homeworld.as_str()).await {
        Ok(homeworld) => homeworld.name,
        Err(e) => {
            warn!(character = %character.name, error = %e, "Failed to fetch homeworld");
            DEFAULT_HOMEWORLD_NAME.to_owned()
        }
    }
}
