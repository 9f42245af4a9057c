//! `manta-brew render` -- materialize a formula for a release.
//!
//! Loads the template, resolves the checksum (given or computed from the
//! artifact file), selects the artifact variant, renders and validates the
//! record, and writes the formula.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::info;

use manta_formula::digest;
use manta_formula::engine;
use manta_formula::parser;
use manta_formula::types::{FormulaTemplate, Release};
use manta_formula::writer;

use crate::cli::{OutputFormat, RenderArgs};
use crate::context::RuntimeContext;
use crate::output::{output_json, write_file};

/// Execute the `manta-brew render` command.
pub fn run(ctx: &RuntimeContext, args: &RenderArgs) -> Result<()> {
    // 1. Find and load the template
    let path = ctx.resolve_template(args.template.as_deref())?;
    let template = parser::load_template(&path)
        .with_context(|| format!("failed to load template {}", path.display()))?;

    // 2. Resolve the checksum
    let checksum = match (&args.sha256, &args.artifact_file) {
        (Some(sha), _) => sha.clone(),
        (None, Some(file)) => {
            let file = ctx.resolve_path(file);
            digest::sha256_file(&file)
                .with_context(|| format!("failed to hash artifact {}", file.display()))?
        }
        (None, None) => bail!("either --sha256 or --artifact-file is required"),
    };

    // 3. Select the artifact variant and render
    let mut release = Release::new(args.release_version.clone(), checksum);
    if let Some(name) = select_variant(ctx, args, &template) {
        let variant = template.variant(name).with_context(|| {
            format!(
                "unknown artifact variant '{}' (available: {})",
                name,
                variant_names(&template)
            )
        })?;
        release = release.with_artifact(variant.clone());
    }
    let record = engine::render_release(&template, &release)?;

    let rendered = match args.format {
        OutputFormat::Ruby => writer::to_ruby(&record),
        OutputFormat::Json => writer::to_json(&record)? + "\n",
    };

    // 4. Write the formula
    let destination = match &args.output {
        Some(p) if p.as_os_str() == "-" => None,
        Some(p) => Some(ctx.resolve_path(p)),
        None => Some(default_destination(ctx, &record.name, args.format)),
    };

    let Some(dest) = destination else {
        print!("{}", rendered);
        return Ok(());
    };

    write_file(&dest, &rendered)?;
    info!(path = %dest.display(), "wrote formula");

    if ctx.json {
        output_json(&serde_json::json!({
            "formula": record.name,
            "version": record.version,
            "url": record.artifact_url,
            "sha256": record.checksum,
            "artifact": release.artifact.as_ref().map(|v| v.name.as_str()),
            "path": dest.display().to_string(),
        }));
    } else if !ctx.quiet {
        println!(
            "Rendered {} {} -> {}",
            record.name,
            record.version,
            dest.display()
        );
    }
    Ok(())
}

/// `--artifact` wins; the configured default only applies to templates that
/// declare variants.
fn select_variant<'a>(
    ctx: &'a RuntimeContext,
    args: &'a RenderArgs,
    template: &FormulaTemplate,
) -> Option<&'a str> {
    if let Some(name) = args.artifact.as_deref() {
        return Some(name);
    }
    if template.artifacts.is_empty() {
        return None;
    }
    ctx.config.artifact.as_deref()
}

fn variant_names(template: &FormulaTemplate) -> String {
    if template.artifacts.is_empty() {
        return "none declared".to_string();
    }
    template
        .artifacts
        .iter()
        .map(|v| v.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn default_destination(ctx: &RuntimeContext, name: &str, format: OutputFormat) -> PathBuf {
    ctx.resolve_path(&ctx.config.output_dir)
        .join(format!("{}.{}", name, format.extension()))
}
