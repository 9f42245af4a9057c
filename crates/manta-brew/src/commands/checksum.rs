//! `manta-brew checksum` -- SHA-256 of release artifacts.

use anyhow::{Context, Result};

use manta_formula::digest;

use crate::cli::ChecksumArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `manta-brew checksum` command.
///
/// Plain output matches `sha256sum`: `<digest>  <path>`. A path of `-`
/// hashes stdin.
pub fn run(ctx: &RuntimeContext, args: &ChecksumArgs) -> Result<()> {
    let mut entries = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let sha = if file.as_os_str() == "-" {
            digest::sha256_reader(std::io::stdin().lock()).context("failed to hash stdin")?
        } else {
            digest::sha256_file(&ctx.resolve_path(file))
                .with_context(|| format!("failed to hash {}", file.display()))?
        };
        entries.push((file.display().to_string(), sha));
    }

    if ctx.json {
        let items: Vec<serde_json::Value> = entries
            .iter()
            .map(|(path, sha)| serde_json::json!({ "path": path, "sha256": sha }))
            .collect();
        output_json(&items);
    } else {
        for (path, sha) in &entries {
            println!("{}  {}", sha, path);
        }
    }
    Ok(())
}
