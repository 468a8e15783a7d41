//! Session error types.

use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password pair does not match the demo account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Refresh requested while nobody is logged in.
    #[error("no active session to refresh")]
    NoActiveSession,

    /// Durable session storage failed.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),

    /// Session record could not be encoded.
    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by a [`SessionStorage`](super::SessionStorage) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding in-memory storage was poisoned.
    #[error("storage lock poisoned")]
    Poisoned,
}
