//! Search provider implementations.
//!
//! Each module provides a struct implementing [`crate::provider::SearchProvider`]
//! against a specific search API.

pub mod google_cse;

pub use google_cse::GoogleCseProvider;
