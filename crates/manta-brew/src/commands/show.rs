//! `manta-brew show` -- summarize a formula template.

use anyhow::{Context, Result};

use manta_formula::engine;
use manta_formula::parser;
use manta_formula::types::{ArchiveFormat, FormulaTemplate};
use manta_ui::styles::{render_accent, render_bold, render_fail, render_muted, render_pass};

use crate::cli::ShowArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `manta-brew show` command.
pub fn run(ctx: &RuntimeContext, args: &ShowArgs) -> Result<()> {
    let path = ctx.resolve_template(args.template.as_deref())?;
    let template = parser::load_template(&path)
        .with_context(|| format!("failed to load template {}", path.display()))?;

    let placeholders = placeholders(&template);
    let problem = engine::check_template(&template).err().map(|e| e.to_string());
    let name = template.name.as_deref().unwrap_or_default();
    let archive = url_archive(&template);

    if ctx.json {
        let artifacts: Vec<serde_json::Value> = template
            .artifacts
            .iter()
            .map(|v| {
                serde_json::json!({
                    "name": v.name,
                    "format": v.format,
                    "target": v.target,
                    "file_name": v.file_name(name),
                })
            })
            .collect();
        output_json(&serde_json::json!({
            "path": path.display().to_string(),
            "config": ctx.config_path.as_ref().map(|p| p.display().to_string()),
            "name": template.name,
            "desc": template.description,
            "homepage": template.homepage,
            "url": template.artifact_url,
            "sha256": template.checksum,
            "version": template.version,
            "install": template.install_steps,
            "artifacts": artifacts,
            "archive": archive,
            "placeholders": placeholders,
            "ready": problem.is_none(),
            "problem": problem,
        }));
        return Ok(());
    }

    println!("{} {}", render_bold("Template:"), path.display());
    if let Some(config) = &ctx.config_path {
        println!("{} {}", render_bold("Config:"), config.display());
    }
    let fields = [
        ("name", &template.name),
        ("desc", &template.description),
        ("homepage", &template.homepage),
        ("url", &template.artifact_url),
        ("sha256", &template.checksum),
        ("version", &template.version),
    ];
    for (label, value) in fields {
        let shown = match value.as_deref() {
            Some(v) => v.to_string(),
            None => render_muted("(missing)"),
        };
        println!("  {:<9} {}", label, shown);
    }

    println!("{}", render_bold("Install:"));
    for step in &template.install_steps {
        println!("  {}.install \"{}\"", step.destination, step.source);
    }

    if let Some(format) = archive {
        println!("{} {}", render_bold("Archive:"), format);
    }

    if !template.artifacts.is_empty() {
        println!("{} ({}):", render_bold("Artifacts"), template.artifacts.len());
        for v in &template.artifacts {
            println!(
                "  {:<14} {:<7} {}",
                render_accent(&v.name),
                v.format,
                render_muted(&v.file_name(name))
            );
        }
    }

    if !placeholders.is_empty() {
        println!("{} {}", render_bold("Placeholders:"), placeholders.join(" "));
    }

    match problem {
        None => println!("{} {}", render_bold("Status:"), render_pass("ready to render")),
        Some(msg) => println!("{} {}", render_bold("Status:"), render_fail(&msg)),
    }
    Ok(())
}

/// Archive format named by the url itself. Variant templates leave it to
/// the selected variant.
fn url_archive(template: &FormulaTemplate) -> Option<ArchiveFormat> {
    if !template.artifacts.is_empty() {
        return None;
    }
    template
        .artifact_url
        .as_deref()
        .and_then(ArchiveFormat::from_file_name)
}

/// Distinct placeholders across the templated fields, in order of appearance.
fn placeholders(template: &FormulaTemplate) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let fields = [&template.artifact_url, &template.checksum, &template.version];
    for value in fields.into_iter().flatten() {
        if let Ok(tokens) = engine::scan_tokens(value) {
            for t in tokens {
                if !found.iter().any(|f| f == t.raw) {
                    found.push(t.raw.to_string());
                }
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn placeholders_are_distinct_and_ordered() {
        let t = FormulaTemplate {
            artifact_url: Some("https://x/v{{ VERSION }}/{{ ARTIFACT }}".into()),
            checksum: Some("{{ SHA }}".into()),
            version: Some("{{ VERSION }}".into()),
            ..Default::default()
        };
        assert_eq!(
            placeholders(&t),
            vec!["{{ VERSION }}", "{{ ARTIFACT }}", "{{ SHA }}"]
        );
    }

    #[test]
    fn archive_comes_from_url_without_variants() {
        let mut t = FormulaTemplate {
            artifact_url: Some(
                "https://github.com/eth-cscs/manta/releases/download/v{{ VERSION }}/manta-aarch64-apple-darwin.tar.xz"
                    .into(),
            ),
            ..Default::default()
        };
        assert_eq!(url_archive(&t), Some(ArchiveFormat::TarXz));

        t.artifact_url = Some("https://x/v{{ VERSION }}/{{ ARTIFACT }}".into());
        assert_eq!(url_archive(&t), None);
    }
}
