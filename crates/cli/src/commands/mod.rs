//! Subcommand implementations.
//!
//! Output goes to stdout; logs go to stderr.

pub mod auth;
pub mod catalog;
