//! Discovery of the `.manta-brew.toml` configuration file.
//!
//! The file normally lives at the root of the tap or release repository. This
//! module finds it by walking up the directory tree from the working
//! directory, honouring an explicit override from the environment.

use std::path::{Path, PathBuf};

/// The name of the configuration file.
pub const CONFIG_FILE_NAME: &str = ".manta-brew.toml";

/// Environment variable that points directly at a configuration file.
pub const CONFIG_FILE_ENV: &str = "MANTA_BREW_CONFIG";

/// Walk up the directory tree from `start` looking for `.manta-brew.toml`.
///
/// The `MANTA_BREW_CONFIG` environment variable is checked first (highest
/// priority). Returns `None` if the filesystem root is reached without
/// finding a file.
///
/// # Examples
///
/// ```no_run
/// use manta_config::config_file::find_config_file;
/// use std::path::Path;
///
/// if let Some(path) = find_config_file(Path::new(".")) {
///     println!("Using config at {}", path.display());
/// }
/// ```
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var(CONFIG_FILE_ENV) {
        let env_path = PathBuf::from(env_path);
        if env_path.is_file() {
            return Some(env_path);
        }
    }

    let start = start.canonicalize().ok()?;
    let mut current = start.as_path();
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent,
            _ => break,
        }
    }

    None
}
