//! Parse formula templates (TOML, JSON, Homebrew Ruby) and resolve template paths.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::types::{FormulaError, FormulaTemplate, InstallDir, InstallStep};

/// Parse a template from a TOML string.
pub fn parse_toml(content: &str) -> Result<FormulaTemplate, FormulaError> {
    toml::from_str(content).map_err(|e| FormulaError::Parse(e.to_string()))
}

/// Parse a template from a JSON string.
pub fn parse_json(content: &str) -> Result<FormulaTemplate, FormulaError> {
    serde_json::from_str(content).map_err(|e| FormulaError::Parse(e.to_string()))
}

/// Parse a Homebrew Ruby formula.
///
/// Understands the subset a binary formula uses:
///
/// ```ruby
/// class Manta < Formula
///   desc "Manta CLI"
///   homepage "https://github.com/eth-cscs/manta"
///   url "https://.../v{{ VERSION }}/manta-aarch64-apple-darwin.tar.xz"
///   sha256 "{{ SHA }}"
///   version "{{ VERSION }}"
///
///   def install
///     bin.install "manta"
///   end
/// end
/// ```
///
/// Works for both templates and rendered formulas. Other lines are skipped.
pub fn parse_ruby(content: &str) -> Result<FormulaTemplate, FormulaError> {
    let mut template = FormulaTemplate::default();
    let mut seen_class = false;
    let mut in_install = false;

    for (idx, raw_line) in content.lines().enumerate() {
        let lineno = idx + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        if in_install {
            if line == "end" {
                in_install = false;
                continue;
            }
            match parse_install_line(line, lineno)? {
                Some(step) => template.install_steps.push(step),
                None => debug!(line = lineno, "skipping install line: {}", line),
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("class ") {
            let (class, parent) = rest
                .split_once('<')
                .ok_or_else(|| parse_err(lineno, "expected `class Name < Formula`"))?;
            if parent.trim() != "Formula" {
                return Err(parse_err(lineno, "class must inherit from Formula"));
            }
            template.name = Some(class_to_name(class.trim()));
            seen_class = true;
            continue;
        }

        if line == "def install" {
            in_install = true;
            continue;
        }

        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((k, r)) => (k, r.trim_start()),
            None => (line, ""),
        };
        let slot = match keyword {
            "desc" => &mut template.description,
            "homepage" => &mut template.homepage,
            "url" => &mut template.artifact_url,
            "sha256" => &mut template.checksum,
            "version" => &mut template.version,
            _ => {
                debug!(line = lineno, "skipping formula line: {}", line);
                continue;
            }
        };
        *slot = Some(parse_string_literal(rest, lineno)?);
    }

    if in_install {
        return Err(FormulaError::Parse("unterminated `def install` block".to_string()));
    }
    if !seen_class {
        return Err(FormulaError::Parse(
            "no `class ... < Formula` declaration found".to_string(),
        ));
    }
    Ok(template)
}

/// Load a template from a file path (auto-detect format by extension).
pub fn load_template(path: &Path) -> Result<FormulaTemplate, FormulaError> {
    let content = std::fs::read_to_string(path)?;
    let mut template = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => parse_toml(&content)?,
        Some("json") => parse_json(&content)?,
        Some("rb") => parse_ruby(&content)?,
        _ => {
            // Try Ruby first, then TOML
            parse_ruby(&content).or_else(|_| parse_toml(&content))?
        }
    };
    template.source = path.display().to_string();
    debug!(path = %template.source, "loaded formula template");
    Ok(template)
}

/// Extensions `load_template` recognizes.
const TEMPLATE_EXTENSIONS: [&str; 3] = ["toml", "json", "rb"];

fn is_template_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| TEMPLATE_EXTENSIONS.contains(&e))
}

/// Search for a template by name.
///
/// Search order:
/// 1. Exact path (absolute, or relative to `cwd`) with a template extension
/// 2. `cwd` with standard suffixes
/// 3. `Formula/` under `cwd` with standard suffixes
///
/// Extensionless files, such as the `manta` binary itself, are never picked.
pub fn find_template(name: &str, cwd: &Path) -> Result<PathBuf, FormulaError> {
    let exact = Path::new(name);
    if exact.is_absolute() && is_template_file(exact) {
        return Ok(exact.to_path_buf());
    }
    let relative = cwd.join(name);
    if is_template_file(&relative) {
        return Ok(relative);
    }

    let suffixes = [".formula.toml", ".formula.json", ".rb", ".toml", ".json"];
    for dir in [cwd.to_path_buf(), cwd.join("Formula")] {
        for suffix in &suffixes {
            let candidate = dir.join(format!("{}{}", name, suffix));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    Err(FormulaError::NotFound(format!(
        "'{}' (searched {} and its Formula/ directory)",
        name,
        cwd.display()
    )))
}

/// Convert a Ruby class name to a formula name: `MantaCli` -> `manta-cli`.
pub fn class_to_name(class: &str) -> String {
    let mut name = String::with_capacity(class.len() + 4);
    for (i, c) in class.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                name.push('-');
            }
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn parse_err(lineno: usize, msg: &str) -> FormulaError {
    FormulaError::Parse(format!("line {}: {}", lineno, msg))
}

/// Drop a trailing `# comment` that is not inside a string literal.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse a double-quoted Ruby string literal at the start of `s`.
fn parse_string_literal(s: &str, lineno: usize) -> Result<String, FormulaError> {
    let body = s
        .strip_prefix('"')
        .ok_or_else(|| parse_err(lineno, "expected a double-quoted string"))?;
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Ok(out),
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => break,
            },
            other => out.push(other),
        }
    }
    Err(parse_err(lineno, "unterminated string literal"))
}

/// Parse `<dir>.install "<source>"`.
fn parse_install_line(line: &str, lineno: usize) -> Result<Option<InstallStep>, FormulaError> {
    let Some((receiver, rest)) = line.split_once(".install") else {
        return Ok(None);
    };
    let destination: InstallDir = receiver
        .trim()
        .parse()
        .map_err(|e: FormulaError| parse_err(lineno, &e.to_string()))?;
    let source = parse_string_literal(rest.trim_start(), lineno)?;
    Ok(Some(InstallStep {
        source,
        destination,
    }))
}
