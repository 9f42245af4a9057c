//! Formula engine for Manta release packaging.
//!
//! A formula template describes how Homebrew fetches and installs a prebuilt
//! Manta binary. Templates carry `{{ VERSION }}`, `{{ SHA }}` and
//! `{{ ARTIFACT }}` placeholders that are materialized at release time into a
//! concrete [`types::FormulaRecord`], which is then validated and written out
//! as a Ruby formula.

pub mod digest;
pub mod engine;
pub mod parser;
pub mod types;
pub mod writer;

pub use engine::{render, render_release, validate};
pub use types::{FormulaError, FormulaRecord, FormulaTemplate, ValidationError, Violation};
