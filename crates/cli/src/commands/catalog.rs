//! Catalog browsing commands.
//!
//! Every command loads the complete enriched collection first; filtering and
//! pagination run locally over it.

#![allow(clippy::print_stdout)]

use clap::Args;
use holocron_catalog::enrichment::CharacterDetail;
use holocron_catalog::{AppError, AppState, CatalogView, Result};
use holocron_core::format::{format_date, format_height, format_mass, format_population};
use holocron_core::{Facets, QueryResult};

/// Search, facet filters and page for `browse`.
#[derive(Debug, Args)]
pub struct BrowseArgs {
    /// Case-insensitive substring of the name
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Exact homeworld name
    #[arg(long)]
    pub homeworld: Option<String>,

    /// Exact species name
    #[arg(long)]
    pub species: Option<String>,

    /// Exact number of films
    #[arg(long)]
    pub films: Option<String>,

    /// Page to show, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,
}

async fn loaded_view(state: &AppState) -> Result<CatalogView> {
    let mut view = state.view();
    view.load_all_enriched().await?;
    Ok(view)
}

pub async fn browse(state: &AppState, args: &BrowseArgs) -> Result<()> {
    let mut view = loaded_view(state).await?;

    view.set_search(args.search.as_str());
    view.set_homeworld(args.homeworld.clone());
    view.set_species(args.species.clone());
    view.set_film_count(args.films.clone());

    let result = view.change_page(args.page);
    print_page(&result);
    Ok(())
}

pub async fn facets(state: &AppState) -> Result<()> {
    let view = loaded_view(state).await?;
    print_facets(view.result().facets());
    Ok(())
}

pub async fn show(state: &AppState, name: &str) -> Result<()> {
    let view = loaded_view(state).await?;
    let url = view
        .find_by_name(name)
        .map(|record| record.url().clone())
        .ok_or_else(|| AppError::NotFound(name.to_owned()))?;

    let detail = view.detail(&url).await?;
    print_detail(&detail);
    Ok(())
}

fn print_page(result: &QueryResult<'_>) {
    if result.filtered_count() == 0 {
        println!("No characters match.");
        return;
    }

    for record in result.page_items() {
        println!(
            "{:<24} {:<16} {:<16} {} film(s)",
            record.name(),
            record.species_name,
            record.homeworld_name,
            record.character.film_count()
        );
    }

    let window: Vec<String> = result
        .page_window()
        .into_iter()
        .map(|n| {
            if n == result.page() {
                format!("[{n}]")
            } else {
                n.to_string()
            }
        })
        .collect();

    println!();
    println!(
        "Page {} of {} ({} matching)   {}",
        result.page(),
        result.total_pages(),
        result.filtered_count(),
        window.join(" ")
    );
}

fn print_facets(facets: &Facets) {
    println!("Homeworlds: {}", facets.homeworlds.join(", "));
    println!("Species:    {}", facets.species.join(", "));
    println!("Films:      {}", facets.film_counts.join(", "));
}

fn print_detail(detail: &CharacterDetail) {
    let c = &detail.character.character;

    println!("{}", c.name);
    println!("  Species:    {}", detail.character.species_name);
    println!("  Height:     {}", format_height(&c.height));
    println!("  Mass:       {}", format_mass(&c.mass));
    println!("  Birth year: {}", c.birth_year);
    println!("  Gender:     {}", c.gender);
    println!("  Added:      {}", format_date(&c.created));

    match &detail.homeworld {
        Some(planet) => {
            println!("  Homeworld:  {}", planet.name);
            println!("    Terrain:    {}", planet.terrain);
            println!("    Climate:    {}", planet.climate);
            println!("    Population: {}", format_population(&planet.population));
        }
        None => println!("  Homeworld:  {}", detail.character.homeworld_name),
    }

    if detail.film_titles.is_empty() {
        println!("  Films:      {}", c.film_count());
    } else {
        println!("  Films:");
        for title in &detail.film_titles {
            println!("    - {title}");
        }
    }
}
