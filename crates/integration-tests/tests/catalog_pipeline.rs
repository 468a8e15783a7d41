//! Integration tests for the gateway and enrichment pipeline over HTTP.
//!
//! A local fake SWAPI is started per test; no network access is needed.

#![allow(clippy::unwrap_used)]

use holocron_catalog::enrichment::{LoadError, load_all_enriched, load_detail};
use holocron_catalog::swapi::SwapiError;
use holocron_core::{FilmUrl, PlanetUrl, SpeciesUrl};
use holocron_integration_tests::TestContext;
use serde_json::json;

#[tokio::test]
async fn test_pages_concatenate_in_server_order() {
    let ctx = TestContext::new(9).await.unwrap();
    ctx.swapi.people_page(
        1,
        vec![
            ctx.swapi.person(1, "A", 1, &[], &[]),
            ctx.swapi.person(2, "B", 1, &[], &[]),
        ],
        true,
    );
    ctx.swapi
        .people_page(2, vec![ctx.swapi.person(3, "C", 1, &[], &[])], false);
    ctx.swapi.planet(1, "Tatooine", "200000");

    let records = load_all_enriched(ctx.state.swapi()).await.unwrap();

    let names: Vec<&str> = records.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
    assert_eq!(ctx.swapi.hits("/people/?page=1"), 1);
    assert_eq!(ctx.swapi.hits("/people/?page=2"), 1);
    assert_eq!(ctx.swapi.hits("/people/?page=3"), 0);
}

#[tokio::test]
async fn test_enrichment_resolves_names() {
    let ctx = TestContext::new(9).await.unwrap();
    ctx.swapi.seed_small();

    let records = load_all_enriched(ctx.state.swapi()).await.unwrap();

    let summary: Vec<(&str, &str, &str)> = records
        .iter()
        .map(|r| {
            (
                r.name(),
                r.species_name.as_str(),
                r.homeworld_name.as_str(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Luke Skywalker", "Human", "Tatooine"),
            ("C-3PO", "Droid", "Tatooine"),
            ("R2-D2", "Droid", "Naboo"),
        ]
    );
}

#[tokio::test]
async fn test_lookup_failures_fall_back_per_character() {
    let ctx = TestContext::new(9).await.unwrap();
    ctx.swapi.seed_small();
    ctx.swapi.fail("/species/2/");
    ctx.swapi.fail("/planets/8/");

    let records = load_all_enriched(ctx.state.swapi()).await.unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].homeworld_name, "Tatooine");
    assert_eq!(records[1].species_name, "Human");
    assert_eq!(records[1].homeworld_name, "Tatooine");
    assert_eq!(records[2].species_name, "Human");
    assert_eq!(records[2].homeworld_name, "Unknown");
}

#[tokio::test]
async fn test_listing_failure_is_load_failed() {
    let ctx = TestContext::new(9).await.unwrap();
    ctx.swapi.seed_small();
    ctx.swapi.fail("/people/?page=2");

    let err = load_all_enriched(ctx.state.swapi()).await.unwrap_err();

    assert!(matches!(
        err,
        LoadError::LoadFailed(SwapiError::Status { status: 500, .. })
    ));
    assert_eq!(err.to_string(), "Failed to fetch characters. Please try again.");
}

#[tokio::test]
async fn test_second_load_is_served_from_cache() {
    let ctx = TestContext::new(9).await.unwrap();
    ctx.swapi.seed_small();

    let first = load_all_enriched(ctx.state.swapi()).await.unwrap();
    let hits_after_first = ctx.swapi.total_hits();
    assert!(hits_after_first > 0);

    let second = load_all_enriched(ctx.state.swapi()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(ctx.swapi.total_hits(), hits_after_first);
}

#[tokio::test]
async fn test_direct_lookups_share_the_cache() {
    let ctx = TestContext::new(9).await.unwrap();
    ctx.swapi.seed_small();
    let client = ctx.state.swapi();

    let tatooine = PlanetUrl::new(ctx.swapi.url("/planets/1/"));
    let planet = client.get_homeworld(&tatooine).await.unwrap();
    assert_eq!(planet.name, "Tatooine");

    let again = client.get_homeworld(&tatooine).await.unwrap();
    assert_eq!(again, planet);
    assert_eq!(ctx.swapi.hits("/planets/1/"), 1);

    let page = client.get_people(2).await.unwrap();
    assert!(!page.has_next());
    assert_eq!(page.results[0].name, "R2-D2");
}

#[tokio::test]
async fn test_search_people_queries_by_name() {
    let ctx = TestContext::new(9).await.unwrap();
    ctx.swapi.seed_small();
    ctx.swapi.insert(
        "/people/?search=r2",
        json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [ctx.swapi.person(3, "R2-D2", 8, &[2], &[1])],
        }),
    );
    let client = ctx.state.swapi();

    let page = client.search_people("r2").await.unwrap();
    assert_eq!(page.count, 1);
    assert!(!page.has_next());
    assert_eq!(page.results[0].name, "R2-D2");

    client.search_people("r2").await.unwrap();
    assert_eq!(ctx.swapi.hits("/people/?search=r2"), 1);
    assert_eq!(ctx.swapi.hits("/people/?page=1"), 0);
}

#[tokio::test]
async fn test_species_and_film_lookups_are_cached() {
    let ctx = TestContext::new(9).await.unwrap();
    ctx.swapi.seed_small();
    let client = ctx.state.swapi();

    let droid = SpeciesUrl::new(ctx.swapi.url("/species/2/"));
    let species = client.get_species(&droid).await.unwrap();
    assert_eq!(species.name, "Droid");
    assert_eq!(species.classification, "mammal");

    let new_hope = FilmUrl::new(ctx.swapi.url("/films/1/"));
    let film = client.get_film(&new_hope).await.unwrap();
    assert_eq!(film.title, "A New Hope");

    assert_eq!(client.get_species(&droid).await.unwrap(), species);
    assert_eq!(client.get_film(&new_hope).await.unwrap(), film);
    assert_eq!(ctx.swapi.hits("/species/2/"), 1);
    assert_eq!(ctx.swapi.hits("/films/1/"), 1);
}

#[tokio::test]
async fn test_failures_are_not_memoized() {
    let ctx = TestContext::new(9).await.unwrap();
    ctx.swapi.seed_small();
    ctx.swapi.fail("/people/?page=1");

    assert!(load_all_enriched(ctx.state.swapi()).await.is_err());

    ctx.swapi.recover("/people/?page=1");
    let records = load_all_enriched(ctx.state.swapi()).await.unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(ctx.swapi.hits("/people/?page=1"), 2);
}

#[tokio::test]
async fn test_detail_resolves_homeworld_and_films() {
    let ctx = TestContext::new(9).await.unwrap();
    ctx.swapi.seed_small();

    let records = load_all_enriched(ctx.state.swapi()).await.unwrap();
    let luke = load_detail(ctx.state.swapi(), &records[0]).await;

    assert_eq!(
        luke.film_titles,
        vec!["A New Hope", "The Empire Strikes Back"]
    );
    assert_eq!(luke.homeworld.unwrap().population, "200000");
}

#[tokio::test]
async fn test_detail_with_failing_film_has_no_titles() {
    let ctx = TestContext::new(9).await.unwrap();
    ctx.swapi.seed_small();
    ctx.swapi.fail("/films/2/");

    let records = load_all_enriched(ctx.state.swapi()).await.unwrap();

    let luke = load_detail(ctx.state.swapi(), &records[0]).await;
    assert!(luke.film_titles.is_empty());
    assert!(luke.homeworld.is_some());

    let r2 = load_detail(ctx.state.swapi(), &records[2]).await;
    assert_eq!(r2.film_titles, vec!["A New Hope"]);
}
