//! Holocron CLI - browse Star Wars characters from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in with the demo account
//! holocron login -e demo@starwars.com -p demo123
//!
//! # List characters, filtered and paginated
//! holocron browse --species Droid --page 2
//!
//! # Show one character with homeworld and films
//! holocron show "Luke Skywalker"
//!
//! # Keep the session refreshed until Ctrl-C
//! holocron watch
//! ```
//!
//! # Commands
//!
//! - `login`, `logout`, `whoami`, `refresh` - Manage the session
//! - `browse` - Filtered, paginated character listing
//! - `facets` - Values available for each filter
//! - `show` - Character detail
//! - `watch` - Run the background refresh in the foreground

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use holocron_catalog::AppState;
use holocron_catalog::config::CatalogConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::catalog::BrowseArgs;

#[derive(Parser)]
#[command(name = "holocron")]
#[command(author, version, about = "Star Wars character catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist a session
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "HOLOCRON_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Delete the persisted session
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Rotate the session tokens now
    Refresh,
    /// List characters
    Browse(BrowseArgs),
    /// List the values available for each filter
    Facets,
    /// Show one character with homeworld and films
    Show {
        /// Character name (case-insensitive)
        name: String,
    },
    /// Refresh the session periodically until interrupted
    Watch,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CatalogConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match CatalogConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "holocron_catalog=warn,holocron_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        e.report();
        #[allow(clippy::print_stderr)]
        {
            eprintln!("error: {}", e.user_message());
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: CatalogConfig) -> holocron_catalog::Result<()> {
    let state = AppState::new(config)?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&state, &email, password.into()).await?;
        }
        Commands::Logout => commands::auth::logout(&state)?,
        Commands::Whoami => commands::auth::whoami(&state),
        Commands::Refresh => commands::auth::refresh(&state).await?,
        Commands::Browse(args) => commands::catalog::browse(&state, &args).await?,
        Commands::Facets => commands::catalog::facets(&state).await?,
        Commands::Show { name } => commands::catalog::show(&state, &name).await?,
        Commands::Watch => commands::auth::watch(&state).await?,
    }
    Ok(())
}
