//! `manta-brew validate` -- check a template or rendered formula.
//!
//! Reports every violation at once so a release can be fixed in one pass.
//! Exits non-zero when anything is wrong.

use anyhow::{Context, Result, bail};

use manta_formula::engine;
use manta_formula::parser;
use manta_ui::styles::{
    ICON_FAIL, ICON_PASS, render_fail, render_muted, render_pass, render_violation,
};

use crate::cli::ValidateArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `manta-brew validate` command.
pub fn run(ctx: &RuntimeContext, args: &ValidateArgs) -> Result<()> {
    let path = ctx.resolve_template(args.path.as_deref())?;
    let template = parser::load_template(&path)
        .with_context(|| format!("failed to load {}", path.display()))?;

    let record = template.to_record();
    let phase = engine::phase(&record);
    let violations = engine::violations(&record);

    if ctx.json {
        output_json(&serde_json::json!({
            "path": path.display().to_string(),
            "phase": phase,
            "valid": violations.is_empty(),
            "violations": violations,
        }));
    } else if violations.is_empty() {
        if !ctx.quiet {
            println!(
                "{} {} {}: no violations",
                render_pass(ICON_PASS),
                path.display(),
                render_muted(&format!("({})", phase))
            );
        }
    } else {
        println!(
            "{} {} {}: {} violation(s)",
            render_fail(ICON_FAIL),
            path.display(),
            render_muted(&format!("({})", phase)),
            violations.len()
        );
        for v in &violations {
            println!("{}", render_violation(v));
        }
    }

    if !violations.is_empty() {
        bail!("{} violation(s) in {}", violations.len(), path.display());
    }
    Ok(())
}
