//! Unified error handling with Sentry integration.
//!
//! Every catalog operation surfaced to a user returns `Result<T, AppError>`.
//! [`AppError::report`] captures unexpected failures to Sentry, and
//! [`AppError::user_message`] gives the text safe to show on screen.

use thiserror::Error;

use crate::config::ConfigError;
use crate::enrichment::LoadError;
use crate::session::AuthError;
use crate::swapi::SwapiError;

/// Application-level error type for the catalog.
#[derive(Debug, Error)]
pub enum AppError {
    /// Session operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// SWAPI request failed.
    #[error("SWAPI error: {0}")]
    Swapi(#[from] SwapiError),

    /// The character collection could not be loaded.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The operation requires a logged-in session.
    #[error("Not logged in")]
    Unauthenticated,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Whether this failure is unexpected and worth an error report.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Swapi(_) | Self::Load(_) | Self::Config(_) => true,
            Self::Auth(err) => matches!(err, AuthError::Storage(_) | AuthError::Serialization(_)),
            Self::Unauthenticated | Self::NotFound(_) => false,
        }
    }

    /// Capture server-class errors to Sentry and log them.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Catalog error"
            );
        }
    }

    /// Message to show the user. Internal details are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::NoActiveSession => "Session expired, please log in again".to_string(),
                _ => "Authentication error".to_string(),
            },
            Self::Load(err) => err.to_string(),
            Self::Swapi(_) => "External service error".to_string(),
            Self::Config(err) => err.to_string(),
            Self::Unauthenticated => "Please log in first".to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after a successful login.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
