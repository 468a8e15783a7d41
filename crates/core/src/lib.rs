//! Holocron Core - Shared types and query engine.
//!
//! This crate provides the pieces of Holocron that do no I/O. It is shared by:
//! - `holocron-catalog` - SWAPI gateway, enrichment pipeline, session store
//! - `holocron-cli` - Terminal front end for browsing the catalog
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no HTTP clients,
//! no storage access. This keeps it lightweight and trivially testable.
//!
//! # Modules
//!
//! - [`types`] - SWAPI records, reference URL newtypes, email and session
//! - [`query`] - Search, facet filters and client-side pagination
//! - [`format`] - Display formatting for raw attribute strings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod format;
pub mod query;
pub mod types;

pub use query::{Facets, Filter, QueryResult, QueryState, apply_query};
pub use types::*;
