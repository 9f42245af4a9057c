//! Terminal UI helpers for manta-brew.
//!
//! Provides color detection and semantic styling for validation reports
//! and render summaries.

pub mod styles;
pub mod terminal;
