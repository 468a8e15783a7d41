//! Holocron catalog library.
//!
//! Remote data gateway, enrichment pipeline, mock session store and the
//! browsing view built on top of them.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod enrichment;
pub mod error;
pub mod session;
pub mod state;
pub mod swapi;
pub mod view;

pub use error::{AppError, Result};
pub use state::AppState;
pub use view::CatalogView;
