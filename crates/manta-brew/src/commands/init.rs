//! `manta-brew init` -- write a starter template and configuration.
//!
//! The starter template models both published archives of the Manta CLI
//! (the `aarch64-apple-darwin` `.tar.xz` build and the generic `.tar.gz`)
//! as variants of a single template.

use anyhow::{Result, bail};

use manta_config::config::{BrewConfig, save_config};
use manta_config::config_file::CONFIG_FILE_NAME;

use crate::cli::InitArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, write_file};

/// Starter template written by `manta-brew init`.
pub const STARTER_TEMPLATE: &str = r#"# Homebrew formula template for Manta releases.
# Render with:
#   manta-brew render --release-version X.Y.Z --artifact-file <archive> --artifact <variant>
name = "manta"
desc = "Manta CLI"
homepage = "https://github.com/eth-cscs/manta"
url = "https://github.com/eth-cscs/manta/releases/download/v{{ VERSION }}/{{ ARTIFACT }}"
sha256 = "{{ SHA }}"
version = "{{ VERSION }}"

[[install]]
source = "manta"
destination = "bin"

[[artifacts]]
name = "darwin-arm64"
format = "tar.xz"
target = "aarch64-apple-darwin"

[[artifacts]]
name = "generic"
format = "tar.gz"
"#;

/// Execute the `manta-brew init` command.
pub fn run(ctx: &RuntimeContext, args: &InitArgs) -> Result<()> {
    let template_path = ctx.resolve_path(&args.path);
    if template_path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            template_path.display()
        );
    }
    write_file(&template_path, STARTER_TEMPLATE)?;

    let config_path = ctx.cwd.join(CONFIG_FILE_NAME);
    let wrote_config = if config_path.exists() && !args.force {
        false
    } else {
        let config = BrewConfig {
            template: args.path.display().to_string(),
            ..Default::default()
        };
        save_config(&config_path, &config)?;
        true
    };

    if ctx.json {
        output_json(&serde_json::json!({
            "template": template_path.display().to_string(),
            "config": config_path.display().to_string(),
            "config_written": wrote_config,
        }));
    } else if !ctx.quiet {
        println!("Wrote template {}", template_path.display());
        if wrote_config {
            println!("Wrote config   {}", config_path.display());
        } else {
            println!("Kept existing  {}", config_path.display());
        }
    }
    Ok(())
}
