//! Configuration types and loading for manta-brew.
//!
//! The main entry point is [`BrewConfig`], assembled with [`load_config`]
//! from built-in defaults, an optional `.manta-brew.toml` file and
//! `MANTA_BREW_*` environment variables, in increasing priority.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "MANTA_BREW_";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("failed to access config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// The merged configuration could not be deserialized.
    #[error("failed to parse configuration: {0}")]
    ParseError(Box<figment::Error>),

    /// The configuration could not be serialized to TOML.
    #[error("failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// An explicitly requested configuration file does not exist.
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Settings for rendering formulas in a release repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrewConfig {
    /// Template name or path, resolved against the working directory.
    pub template: String,

    /// Directory rendered formulas are written into as `<name>.rb`.
    pub output_dir: PathBuf,

    /// Artifact variant to render when `--artifact` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,

    /// Produce JSON output by default.
    pub json: bool,
}

impl Default for BrewConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
            output_dir: default_output_dir(),
            artifact: None,
            json: false,
        }
    }
}

fn default_template() -> String {
    "manta".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("Formula")
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the layered figment: defaults, then the file (if any), then env.
pub fn figment(path: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(BrewConfig::default()));
    if let Some(path) = path {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
}

/// Load configuration, optionally from a specific file.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] if `path` is given but does not exist,
/// or [`ConfigError::ParseError`] if the file or environment holds values of
/// the wrong type.
pub fn load_config(path: Option<&Path>) -> Result<BrewConfig> {
    if let Some(p) = path {
        if !p.is_file() {
            return Err(ConfigError::NotFound(p.to_path_buf()));
        }
        debug!(path = %p.display(), "loading configuration");
    }
    figment(path)
        .extract()
        .map_err(|e| ConfigError::ParseError(Box::new(e)))
}

/// Write configuration as TOML to `path`, creating parent directories.
pub fn save_config(path: &Path, config: &BrewConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
