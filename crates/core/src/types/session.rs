//! Locally held login record.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::email::Email;

/// Proof-of-login record kept in durable client storage.
///
/// The tokens are opaque mock values. They are never verified and carry no
/// security guarantee. `Debug` redacts them anyway so they stay out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub email: Email,
    /// Access token.
    pub token: String,
    /// Token used to obtain the next access token.
    pub refresh_token: String,
}

impl Session {
    /// Returns a copy with both tokens replaced, keeping the same identity.
    #[must_use]
    pub fn with_tokens(&self, token: String, refresh_token: String) -> Self {
        Self {
            email: self.email.clone(),
            token,
            refresh_token,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("email", &self.email)
            .field("token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}
