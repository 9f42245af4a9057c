//! Render formula templates: placeholder substitution, release-value checks,
//! and invariant validation of the resulting records.

use std::collections::{BTreeSet, HashMap};

use semver::Version;
use tracing::debug;
use url::Url;

use crate::types::{
    ARTIFACT_TOKEN, Field, FormulaError, FormulaRecord, FormulaTemplate, InstallStep,
    KNOWN_TOKENS, Phase, Release, SHA_TOKEN, VERSION_TOKEN, ValidationError, Violation,
    ViolationKind,
};
use crate::writer::{class_name, is_ruby_constant};

/// A `{{ NAME }}` placeholder located in a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Placeholder name with surrounding whitespace stripped.
    pub name: &'a str,
    /// The marker exactly as written, braces included.
    pub raw: &'a str,
    /// Byte offset of the opening `{{`.
    pub start: usize,
    /// Byte offset just past the closing `}}`.
    pub end: usize,
}

/// Find every placeholder in `text`.
///
/// Whitespace inside the braces is optional. An unterminated `{{` or a
/// marker whose name is not an identifier is a malformed template.
pub fn scan_tokens(text: &str) -> Result<Vec<Token<'_>>, FormulaError> {
    lex(text).map_err(FormulaError::MalformedTemplate)
}

/// Substitute placeholders in `text` with provided values.
/// Placeholders without a value are left as-is.
pub fn substitute_tokens(
    text: &str,
    values: &HashMap<&str, String>,
) -> Result<String, FormulaError> {
    let tokens = scan_tokens(text)?;
    let mut result = String::with_capacity(text.len());
    let mut cursor = 0;
    for token in tokens {
        result.push_str(&text[cursor..token.start]);
        match values.get(token.name) {
            Some(value) => result.push_str(value),
            None => result.push_str(token.raw),
        }
        cursor = token.end;
    }
    result.push_str(&text[cursor..]);
    Ok(result)
}

/// Returns `true` if `text` is exactly one `name` placeholder and nothing else.
pub fn is_placeholder(text: &str, name: &str) -> bool {
    match lex(text) {
        Ok(tokens) => {
            tokens.len() == 1
                && tokens[0].name == name
                && tokens[0].start == 0
                && tokens[0].end == text.len()
        }
        Err(_) => false,
    }
}

/// Returns `true` if `s` is a SHA-256 digest in 64 lowercase hex characters.
pub fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Parse a release version as SemVer 2.0 (no leading `v`).
pub fn parse_version(version: &str) -> Result<Version, FormulaError> {
    Version::parse(version).map_err(|e| FormulaError::InvalidVersion {
        version: version.to_string(),
        reason: e.to_string(),
    })
}

/// Lifecycle phase of a record, derived from its `version` field.
pub fn phase(record: &FormulaRecord) -> Phase {
    if is_placeholder(&record.version, VERSION_TOKEN) {
        Phase::Templated
    } else {
        Phase::Materialized
    }
}

/// Check that a template can be rendered at all.
///
/// All problems are collected into a single [`FormulaError::MalformedTemplate`].
pub fn check_template(template: &FormulaTemplate) -> Result<(), FormulaError> {
    let problems = template_problems(template);
    if problems.is_empty() {
        Ok(())
    } else {
        Err(FormulaError::MalformedTemplate(problems.join("; ")))
    }
}

/// Render a template with a release version and checksum.
pub fn render(
    template: &FormulaTemplate,
    version: &str,
    checksum: &str,
) -> Result<FormulaRecord, FormulaError> {
    render_release(template, &Release::new(version, checksum))
}

/// Render a template for a release, optionally selecting an artifact variant.
///
/// The rendered record is validated before it is returned, so an `Ok` value
/// always satisfies every formula invariant.
pub fn render_release(
    template: &FormulaTemplate,
    release: &Release,
) -> Result<FormulaRecord, FormulaError> {
    check_template(template)?;

    if !is_sha256_hex(&release.checksum) {
        return Err(FormulaError::InvalidChecksum(release.checksum.clone()));
    }
    parse_version(&release.version)?;

    let name = template.name.clone().unwrap_or_default();
    let url_template = template.artifact_url.as_deref().unwrap_or_default();

    let mut values: HashMap<&str, String> = HashMap::new();
    values.insert(VERSION_TOKEN, release.version.clone());
    values.insert(SHA_TOKEN, release.checksum.clone());

    let uses_artifact = scan_tokens(url_template)?
        .iter()
        .any(|t| t.name == ARTIFACT_TOKEN);
    if uses_artifact {
        let artifact = release.artifact.as_ref().ok_or_else(|| {
            let available: Vec<&str> = template.artifacts.iter().map(|v| v.name.as_str()).collect();
            FormulaError::MalformedTemplate(format!(
                "url contains {{{{ ARTIFACT }}}} but no artifact variant was selected (available: {})",
                available.join(", ")
            ))
        })?;
        values.insert(ARTIFACT_TOKEN, artifact.file_name(&name));
    } else if let Some(artifact) = &release.artifact {
        debug!(
            variant = %artifact.name,
            "url has no artifact placeholder, variant only recorded"
        );
    }

    let record = FormulaRecord {
        name,
        description: template.description.clone().unwrap_or_default(),
        homepage: template.homepage.clone().unwrap_or_default(),
        artifact_url: substitute_tokens(url_template, &values)?,
        checksum: substitute_tokens(template.checksum.as_deref().unwrap_or_default(), &values)?,
        version: substitute_tokens(template.version.as_deref().unwrap_or_default(), &values)?,
        install_steps: template.install_steps.clone(),
    };

    validate(&record)?;
    debug!(
        name = %record.name,
        version = %record.version,
        url = %record.artifact_url,
        "rendered formula"
    );
    Ok(record)
}

/// Validate a record against every formula invariant.
///
/// Returns all violations at once rather than stopping at the first.
pub fn validate(record: &FormulaRecord) -> Result<(), ValidationError> {
    let found = violations(record);
    if found.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(found))
    }
}

/// Collect every invariant violation in `record`, in field order.
pub fn violations(record: &FormulaRecord) -> Vec<Violation> {
    let phase = phase(record);
    let mut out = Vec::new();
    check_name(&record.name, &mut out);
    check_plain(Field::Description, &record.description, &mut out);
    check_homepage(&record.homepage, &mut out);
    check_url(record, phase, &mut out);
    check_checksum(&record.checksum, phase, &mut out);
    check_version(&record.version, phase, &mut out);
    check_install(&record.install_steps, &mut out);
    out
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn is_token_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_token_cont(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn lex(text: &str) -> Result<Vec<Token<'_>>, String> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i + 1 < len {
        if bytes[i] == b'{' && bytes[i + 1] == b'{' {
            let inner_start = i + 2;
            let close = text[inner_start..]
                .find("}}")
                .ok_or_else(|| format!("unterminated placeholder at byte {}", i))?;
            let inner_end = inner_start + close;
            let end = inner_end + 2;
            let name = text[inner_start..inner_end].trim();
            let valid = name
                .bytes()
                .next()
                .is_some_and(is_token_start)
                && name.bytes().all(is_token_cont);
            if !valid {
                return Err(format!("malformed placeholder '{}'", &text[i..end]));
            }
            tokens.push(Token {
                name,
                raw: &text[i..end],
                start: i,
                end,
            });
            i = end;
            continue;
        }
        i += 1;
    }
    Ok(tokens)
}

/// Problems that make a template unrenderable.
fn template_problems(template: &FormulaTemplate) -> Vec<String> {
    let mut problems = Vec::new();

    let required = [
        (Field::Name, &template.name),
        (Field::Description, &template.description),
        (Field::Homepage, &template.homepage),
        (Field::Url, &template.artifact_url),
        (Field::Sha256, &template.checksum),
        (Field::Version, &template.version),
    ];
    for (field, value) in required {
        match value.as_deref() {
            None => problems.push(format!("missing required field '{}'", field)),
            Some(v) if v.trim().is_empty() => {
                problems.push(format!("required field '{}' is empty", field))
            }
            Some(_) => {}
        }
    }
    if template.install_steps.is_empty() {
        problems.push("no install steps declared".to_string());
    }

    let plain = [
        (Field::Name, &template.name),
        (Field::Description, &template.description),
        (Field::Homepage, &template.homepage),
    ];
    for (field, value) in plain {
        if let Some(v) = value.as_deref() {
            match lex(v) {
                Ok(tokens) if !tokens.is_empty() => {
                    problems.push(format!("'{}' must not contain placeholders", field))
                }
                Err(msg) => problems.push(format!("{}: {}", field, msg)),
                Ok(_) => {}
            }
        }
    }

    let plain_name = template
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty() && lex(n).is_ok_and(|t| t.is_empty()));
    if let Some(problem) = plain_name.and_then(name_problem) {
        problems.push(format!("name: {}", problem));
    }

    let mut version_spellings = BTreeSet::new();

    if let Some(url) = template.artifact_url.as_deref().filter(|u| !u.trim().is_empty()) {
        match lex(url) {
            Err(msg) => problems.push(format!("url: {}", msg)),
            Ok(tokens) => {
                let versions = tokens.iter().filter(|t| t.name == VERSION_TOKEN).count();
                if versions != 1 {
                    problems.push(format!(
                        "url must contain exactly one {{{{ VERSION }}}} placeholder, found {}",
                        versions
                    ));
                }
                let artifacts = tokens.iter().filter(|t| t.name == ARTIFACT_TOKEN).count();
                if artifacts > 1 {
                    problems.push(format!(
                        "url contains {} {{{{ ARTIFACT }}}} placeholders, expected at most one",
                        artifacts
                    ));
                }
                if artifacts > 0 && template.artifacts.is_empty() {
                    problems.push(
                        "url uses {{ ARTIFACT }} but the template declares no artifact variants"
                            .to_string(),
                    );
                }
                for t in &tokens {
                    if t.name != VERSION_TOKEN && t.name != ARTIFACT_TOKEN {
                        problems.push(format!("url: unexpected placeholder '{}'", t.raw));
                    }
                    if t.name == VERSION_TOKEN {
                        version_spellings.insert(t.raw);
                    }
                }
            }
        }
    }

    if let Some(sha) = template.checksum.as_deref().filter(|s| !s.trim().is_empty()) {
        if !is_placeholder(sha, SHA_TOKEN) {
            problems.push(format!(
                "sha256 must be the {{{{ SHA }}}} placeholder, found '{}'",
                sha
            ));
        }
    }

    if let Some(version) = template.version.as_deref().filter(|v| !v.trim().is_empty()) {
        if is_placeholder(version, VERSION_TOKEN) {
            version_spellings.insert(version);
        } else {
            problems.push(format!(
                "version must be the {{{{ VERSION }}}} placeholder, found '{}'",
                version
            ));
        }
    }

    if version_spellings.len() > 1 {
        let spellings: Vec<String> = version_spellings.iter().map(|s| format!("'{}'", s)).collect();
        problems.push(format!(
            "version placeholder spelled inconsistently: {}",
            spellings.join(" vs ")
        ));
    }

    let mut seen = BTreeSet::new();
    for variant in &template.artifacts {
        if !seen.insert(variant.name.as_str()) {
            problems.push(format!("duplicate artifact variant '{}'", variant.name));
        }
    }

    problems
}

fn check_plain(field: Field, value: &str, out: &mut Vec<Violation>) {
    if value.trim().is_empty() {
        out.push(Violation::new(field, ViolationKind::MissingField, "field is empty"));
        return;
    }
    match lex(value) {
        Ok(tokens) if !tokens.is_empty() => out.push(Violation::new(
            field,
            ViolationKind::MalformedTemplate,
            format!("unexpected placeholder '{}'", tokens[0].raw),
        )),
        Err(msg) => out.push(Violation::new(field, ViolationKind::MalformedTemplate, msg)),
        Ok(_) => {}
    }
}

/// Problem with a formula name that would break the Ruby class line.
fn name_problem(name: &str) -> Option<String> {
    let class = class_name(name);
    if is_ruby_constant(&class) {
        None
    } else {
        Some(format!(
            "'{}' maps to class '{}', which is not a Ruby constant",
            name, class
        ))
    }
}

fn check_name(value: &str, out: &mut Vec<Violation>) {
    let before = out.len();
    check_plain(Field::Name, value, out);
    if out.len() > before {
        return;
    }
    if let Some(msg) = name_problem(value) {
        out.push(Violation::new(Field::Name, ViolationKind::InvalidName, msg));
    }
}

fn check_homepage(value: &str, out: &mut Vec<Violation>) {
    let before = out.len();
    check_plain(Field::Homepage, value, out);
    if out.len() > before {
        return;
    }
    if let Err(msg) = web_url(value) {
        out.push(Violation::new(Field::Homepage, ViolationKind::InvalidUrl, msg));
    }
}

fn check_url(record: &FormulaRecord, phase: Phase, out: &mut Vec<Violation>) {
    let url = record.artifact_url.as_str();
    if url.trim().is_empty() {
        out.push(Violation::new(Field::Url, ViolationKind::MissingField, "field is empty"));
        return;
    }
    let tokens = match lex(url) {
        Ok(tokens) => tokens,
        Err(msg) => {
            out.push(Violation::new(Field::Url, ViolationKind::MalformedTemplate, msg));
            return;
        }
    };

    match phase {
        Phase::Templated => {
            let mut malformed = false;
            for t in &tokens {
                if !KNOWN_TOKENS.contains(&t.name) || t.name == SHA_TOKEN {
                    malformed = true;
                    out.push(Violation::new(
                        Field::Url,
                        ViolationKind::MalformedTemplate,
                        format!("unexpected placeholder '{}'", t.raw),
                    ));
                }
            }
            let versions: Vec<&Token<'_>> =
                tokens.iter().filter(|t| t.name == VERSION_TOKEN).collect();
            if versions.len() != 1 {
                malformed = true;
                out.push(Violation::new(
                    Field::Url,
                    ViolationKind::MalformedTemplate,
                    format!(
                        "expected exactly one {{{{ VERSION }}}} placeholder, found {}",
                        versions.len()
                    ),
                ));
            } else if versions[0].raw != record.version {
                malformed = true;
                out.push(Violation::new(
                    Field::Url,
                    ViolationKind::MalformedTemplate,
                    format!(
                        "version placeholder spelled '{}' here but '{}' in version",
                        versions[0].raw, record.version
                    ),
                ));
            }
            if malformed {
                return;
            }
            // Probe well-formedness with representative values.
            let mut sample: HashMap<&str, String> = HashMap::new();
            sample.insert(VERSION_TOKEN, "0.0.0".to_string());
            sample.insert(ARTIFACT_TOKEN, "artifact.tar.gz".to_string());
            let probe = substitute_tokens(url, &sample).unwrap_or_default();
            if let Err(msg) = web_url(&probe) {
                out.push(Violation::new(Field::Url, ViolationKind::InvalidUrl, msg));
            }
        }
        Phase::Materialized => {
            if !tokens.is_empty() {
                let raw: Vec<&str> = tokens.iter().map(|t| t.raw).collect();
                out.push(Violation::new(
                    Field::Url,
                    ViolationKind::MalformedTemplate,
                    format!("unsubstituted placeholder(s): {}", raw.join(", ")),
                ));
                return;
            }
            if let Err(msg) = web_url(url) {
                out.push(Violation::new(Field::Url, ViolationKind::InvalidUrl, msg));
            }
        }
    }
}

fn check_checksum(value: &str, phase: Phase, out: &mut Vec<Violation>) {
    if value.trim().is_empty() {
        out.push(Violation::new(Field::Sha256, ViolationKind::MissingField, "field is empty"));
        return;
    }
    if is_sha256_hex(value) {
        return;
    }
    let placeholder = is_placeholder(value, SHA_TOKEN);
    match phase {
        Phase::Templated if placeholder => {}
        Phase::Materialized if placeholder => out.push(Violation::new(
            Field::Sha256,
            ViolationKind::InvalidChecksum,
            format!("placeholder '{}' was not substituted", value),
        )),
        _ => out.push(Violation::new(
            Field::Sha256,
            ViolationKind::InvalidChecksum,
            format!("'{}' is not 64 lowercase hex characters", value),
        )),
    }
}

fn check_version(value: &str, phase: Phase, out: &mut Vec<Violation>) {
    if value.trim().is_empty() {
        out.push(Violation::new(Field::Version, ViolationKind::MissingField, "field is empty"));
        return;
    }
    if phase == Phase::Materialized {
        if let Err(e) = parse_version(value) {
            out.push(Violation::new(Field::Version, ViolationKind::InvalidVersion, e.to_string()));
        }
    }
}

fn check_install(steps: &[InstallStep], out: &mut Vec<Violation>) {
    if steps.is_empty() {
        out.push(Violation::new(
            Field::Install,
            ViolationKind::MissingInstallSteps,
            "at least one install step is required",
        ));
        return;
    }
    for (idx, step) in steps.iter().enumerate() {
        if step.source.trim().is_empty() {
            out.push(Violation::new(
                Field::Install,
                ViolationKind::MissingField,
                format!("install step {} has an empty source", idx + 1),
            ));
        } else if step.source.starts_with('/') {
            out.push(Violation::new(
                Field::Install,
                ViolationKind::MalformedTemplate,
                format!(
                    "install step {} source '{}' must be relative to the artifact",
                    idx + 1,
                    step.source
                ),
            ));
        }
    }
}

/// Parse an absolute `http`/`https` URL with a host.
fn web_url(value: &str) -> Result<Url, String> {
    let url = Url::parse(value).map_err(|e| format!("'{}' is not a valid URL: {}", value, e))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(format!("'{}' must use http or https", value));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(format!("'{}' has no host", value));
    }
    Ok(url)
}
