//! Core types for Holocron.
//!
//! This module provides the SWAPI record shapes and type-safe wrappers for
//! common domain concepts.

pub mod character;
pub mod email;
pub mod resources;
pub mod session;
pub mod url;

pub use character::{Character, DEFAULT_HOMEWORLD_NAME, DEFAULT_SPECIES_NAME, EnrichedCharacter};
pub use email::{Email, EmailError};
pub use resources::{Film, Homeworld, Page, Species};
pub use session::Session;
pub use url::*;
