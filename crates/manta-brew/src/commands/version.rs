//! `manta-brew version` -- tool version and the template syntax it speaks.

use anyhow::Result;

use manta_formula::types::{ArchiveFormat, KNOWN_TOKENS};

use crate::context::RuntimeContext;
use crate::output::output_json;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build identifier, overridable at compile time.
const BUILD: &str = match option_env!("MANTA_BREW_BUILD") {
    Some(b) => b,
    None => "dev",
};

const FORMATS: [ArchiveFormat; 2] = [ArchiveFormat::TarXz, ArchiveFormat::TarGz];

/// Execute the `manta-brew version` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let placeholders: Vec<String> = KNOWN_TOKENS
        .iter()
        .map(|t| format!("{{{{ {} }}}}", t))
        .collect();
    let formats: Vec<&str> = FORMATS.iter().map(|f| f.extension()).collect();

    if ctx.json {
        output_json(&serde_json::json!({
            "version": VERSION,
            "build": BUILD,
            "placeholders": placeholders,
            "archive_formats": formats,
        }));
    } else {
        println!("manta-brew {} ({})", VERSION, BUILD);
        println!("placeholders: {}", placeholders.join(" "));
        println!("archives:     {}", formats.join(" "));
    }
    Ok(())
}
