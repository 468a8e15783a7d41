//! Mock credential check and token synthesis.
//!
//! NOT a security boundary. There is exactly one hard-coded demo account.
//! Tokens carry an `HS256` header but a fixed placeholder signature, and
//! nothing ever verifies them.
//! Replacing this with real authentication changes the contract of the
//! session store; do not upgrade it piecemeal.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use holocron_core::Email;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use uuid::Uuid;

/// Email of the demo account.
pub const DEMO_EMAIL: &str = "demo@starwars.com";

/// Password of the demo account.
pub const DEMO_PASSWORD: &str = "demo123";

const MOCK_SIGNATURE: &str = "mock-signature";

#[derive(Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

#[derive(Serialize)]
struct Claims<'a> {
    email: &'a str,
    /// Expiry, milliseconds since the Unix epoch.
    exp: i64,
    /// Random nonce making every token distinct.
    jti: Uuid,
}

/// Exact, case-sensitive match against the demo account.
#[must_use]
pub fn credentials_match(email: &str, password: &SecretString) -> bool {
    email == DEMO_EMAIL && password.expose_secret() == DEMO_PASSWORD
}

/// Synthesize a placeholder-signed token for `email`, expiring in one hour.
///
/// Two calls never return the same string.
#[must_use]
pub fn issue_token(email: &Email) -> String {
    let header = Header {
        alg: "HS256",
        typ: "JWT",
    };
    let claims = Claims {
        email: email.as_str(),
        exp: (Utc::now() + Duration::hours(1)).timestamp_millis(),
        jti: Uuid::new_v4(),
    };

    format!(
        "{}.{}.{}",
        encode_json(&header),
        encode_json(&claims),
        URL_SAFE_NO_PAD.encode(MOCK_SIGNATURE)
    )
}

fn encode_json(value: &impl Serialize) -> String {
    // Serializing these plain structs cannot fail.
    let json = serde_json::to_vec(value).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_credentials_match_exactly() {
        assert!(credentials_match(DEMO_EMAIL, &SecretString::from(DEMO_PASSWORD)));
        assert!(!credentials_match("Demo@starwars.com", &SecretString::from(DEMO_PASSWORD)));
        assert!(!credentials_match(DEMO_EMAIL, &SecretString::from("demo1234")));
        assert!(!credentials_match("", &SecretString::from("")));
    }

    #[test]
    fn test_token_is_jwt_shaped() {
        let email = Email::parse(DEMO_EMAIL).unwrap();
        let token = issue_token(&email);

        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        let header: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[0]).unwrap()).unwrap();
        assert_eq!(header["alg"], "HS256");
        assert_eq!(header["typ"], "JWT");

        let claims: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        assert_eq!(claims["email"], DEMO_EMAIL);
        assert!(claims["exp"].as_i64().unwrap() > Utc::now().timestamp_millis());
    }

    #[test]
    fn test_tokens_are_distinct() {
        let email = Email::parse(DEMO_EMAIL).unwrap();
        let tokens: HashSet<String> = (0..100).map(|_| issue_token(&email)).collect();
        assert_eq!(tokens.len(), 100);
    }
}
