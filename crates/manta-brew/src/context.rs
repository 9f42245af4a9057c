//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds what every command handler needs: the
//! working directory, the loaded configuration and the global flags.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use manta_config::config::{BrewConfig, load_config};
use manta_config::config_file::find_config_file;
use manta_formula::parser;
use tracing::debug;

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Directory relative paths are resolved against.
    pub cwd: PathBuf,

    /// Configuration file in use, if any.
    pub config_path: Option<PathBuf>,

    /// Merged configuration (defaults, file, environment).
    pub config: BrewConfig,

    /// Whether to produce JSON output.
    pub json: bool,

    /// Quiet mode: suppress non-essential output.
    pub quiet: bool,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed global arguments.
    ///
    /// An explicit `--config` wins over discovery; `--json` wins over the
    /// `json` config key.
    pub fn from_global_args(global: &GlobalArgs) -> Result<Self> {
        let cwd = env::current_dir().context("cannot determine working directory")?;
        let config_path = global.config.clone().or_else(|| find_config_file(&cwd));
        let config = load_config(config_path.as_deref()).context("failed to load configuration")?;
        debug!(config = ?config_path, "configuration loaded");

        Ok(Self {
            json: global.json || config.json,
            cwd,
            config_path,
            config,
            quiet: global.quiet,
        })
    }

    /// Resolve a template argument, falling back to the configured template.
    pub fn resolve_template(&self, arg: Option<&str>) -> Result<PathBuf> {
        let name = arg.unwrap_or(&self.config.template);
        let path = parser::find_template(name, &self.cwd)?;
        debug!(template = %path.display(), "resolved template");
        Ok(path)
    }

    /// Resolve a path from the command line or config against the working directory.
    pub fn resolve_path(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}
