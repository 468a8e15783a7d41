//! Session commands.
//!
//! # Usage
//!
//! ```bash
//! holocron login -e demo@starwars.com -p demo123
//! HOLOCRON_PASSWORD=demo123 holocron login -e demo@starwars.com
//! holocron whoami
//! holocron refresh
//! holocron watch
//! holocron logout
//! ```

#![allow(clippy::print_stdout)]

use holocron_catalog::{AppError, AppState, Result};
use secrecy::SecretString;

/// Log in with the demo account.
pub async fn login(state: &AppState, email: &str, password: SecretString) -> Result<()> {
    let mut view = state.view();
    let session = view.login(email, &password).await?;
    println!("Logged in as {}", session.email);
    Ok(())
}

pub fn logout(state: &AppState) -> Result<()> {
    state.view().logout()?;
    println!("Logged out");
    Ok(())
}

pub fn whoami(state: &AppState) {
    match state.sessions().current_session() {
        Some(session) => println!("{}", session.email),
        None => println!("Not logged in"),
    }
}

/// Rotate the tokens once. A failure leaves the user logged out.
pub async fn refresh(state: &AppState) -> Result<()> {
    let mut view = state.view();
    let session = view.refresh_now().await?;
    println!("Session refreshed for {}", session.email);
    Ok(())
}

/// Run the background refresh until Ctrl-C or until a refresh fails.
pub async fn watch(state: &AppState) -> Result<()> {
    let mut view = state.view();
    if !view.is_authenticated() {
        return Err(AppError::Unauthenticated);
    }
    view.start_refresh();

    let interval = state.config().session.refresh_interval;
    println!(
        "Refreshing every {}s, press Ctrl-C to stop",
        interval.as_secs()
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut poll = tokio::time::interval(std::time::Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted, stopping refresh");
                return Ok(());
            }
            _ = poll.tick() => {
                let before = view.session().map(|s| s.token.clone());
                if !view.poll_refresh() {
                    println!("Session refresh failed, logged out");
                    return Err(AppError::Unauthenticated);
                }
                if view.session().map(|s| &s.token) != before.as_ref() {
                    println!("Session refreshed");
                }
            }
        }
    }
}
