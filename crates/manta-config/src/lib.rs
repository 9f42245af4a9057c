//! Configuration management for manta-brew.
//!
//! This crate handles discovering and loading `.manta-brew.toml`, layering
//! `MANTA_BREW_*` environment variables on top, and writing a starter
//! configuration file.

pub mod config;
pub mod config_file;
