//! `manta-brew completion` -- shell completion scripts.

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::{generate, generate_to};

use crate::cli::{Cli, CompletionArgs};
use crate::context::RuntimeContext;

const BIN_NAME: &str = "manta-brew";

/// Execute the `manta-brew completion` command.
///
/// Prints the script, or writes it into `--dir` under the file name the
/// shell expects (`manta-brew.bash`, `_manta-brew`, ...).
pub fn run(ctx: &RuntimeContext, args: &CompletionArgs) -> Result<()> {
    let mut cmd = Cli::command();

    let Some(dir) = &args.dir else {
        generate(args.shell, &mut cmd, BIN_NAME, &mut std::io::stdout());
        return Ok(());
    };

    let dir = ctx.resolve_path(dir);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;
    let path = generate_to(args.shell, &mut cmd, BIN_NAME, &dir)
        .with_context(|| format!("failed to write {} completions", args.shell))?;
    if !ctx.quiet {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
