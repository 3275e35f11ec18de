//! Search orchestrator: per-window fan-out, ordered join, dedup.
//!
//! This module runs one paginated fetch per date window concurrently,
//! merges the window results in request order, and removes titles already
//! seen (ignoring case).

pub mod dedup;
pub mod search;

pub use search::aggregate_with;
