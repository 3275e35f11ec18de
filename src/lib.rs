//! Recipe Scout: date-windowed recipe search served over a stdio JSON bridge.
//!
//! The search and filtering logic lives in the `recipe_search` crate. This
//! crate adds what a running host needs around it:
//!
//! - **Config**: TOML settings with environment fallbacks for secrets
//! - **Service**: one [`RecipeService`] owning the provider and filter backend
//! - **Host bridge**: versioned command envelopes over newline-delimited JSON
//! - **Export**: CSV rendering of result titles

pub mod config;
pub mod error;
pub mod export;
pub mod host;
pub mod service;

pub use config::ScoutConfig;
pub use error::{Result, ScoutError};
pub use service::{RecipeService, RunOutcome, RunRequest};
