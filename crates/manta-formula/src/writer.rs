//! Emit formula records as Homebrew Ruby or JSON.

use std::fmt::Write;

use crate::types::{FormulaError, FormulaRecord};

/// Ruby class name for a formula name: `manta` -> `Manta`, `manta-cli` -> `MantaCli`,
/// `manta@2` -> `MantaAT2`.
///
/// Follows Homebrew's own mapping: separators capitalize the next part, `+`
/// becomes `x` and `@` becomes `AT`.
pub fn class_name(name: &str) -> String {
    let joined: String = name
        .split(['-', '_', '.'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    joined.replace('+', "x").replace('@', "AT")
}

/// Whether `class` can stand as a Ruby constant (`[A-Z][A-Za-z0-9]*`).
pub fn is_ruby_constant(class: &str) -> bool {
    let mut chars = class.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

/// Render a record as a Homebrew formula.
///
/// The layout is fixed so that rendering the same record twice yields
/// byte-identical output.
pub fn to_ruby(record: &FormulaRecord) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "class {} < Formula", class_name(&record.name));
    let _ = writeln!(out, "  desc {}", quote(&record.description));
    let _ = writeln!(out, "  homepage {}", quote(&record.homepage));
    let _ = writeln!(out, "  url {}", quote(&record.artifact_url));
    let _ = writeln!(out, "  sha256 {}", quote(&record.checksum));
    let _ = writeln!(out, "  version {}", quote(&record.version));
    out.push('\n');
    out.push_str("  def install\n");
    for step in &record.install_steps {
        let _ = writeln!(
            out,
            "    {}.install {}",
            step.destination.as_str(),
            quote(&step.source)
        );
    }
    out.push_str("  end\n");
    out.push_str("end\n");
    out
}

/// Render a record as pretty-printed JSON.
pub fn to_json(record: &FormulaRecord) -> Result<String, FormulaError> {
    serde_json::to_string_pretty(record).map_err(|e| FormulaError::Parse(e.to_string()))
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '#' => out.push_str("\\#"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
