//! Formula data model.
//!
//! Covers: the authoring-time template (optional fields, artifact variants),
//! the materialized record, install steps, and the error/violation types
//! reported by rendering and validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Placeholder replaced with the release version.
pub const VERSION_TOKEN: &str = "VERSION";

/// Placeholder replaced with the artifact SHA-256 digest.
pub const SHA_TOKEN: &str = "SHA";

/// Placeholder replaced with the selected artifact file name.
pub const ARTIFACT_TOKEN: &str = "ARTIFACT";

/// All placeholder names understood by the engine.
pub const KNOWN_TOKENS: &[&str] = &[VERSION_TOKEN, SHA_TOKEN, ARTIFACT_TOKEN];

// ---------------------------------------------------------------------------
// Install steps
// ---------------------------------------------------------------------------

/// Homebrew prefix directory an install step copies into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallDir {
    /// `bin` -- user-facing executables.
    #[default]
    Bin,
    /// `sbin` -- administrative executables.
    Sbin,
    /// `libexec` -- helpers not linked into the prefix.
    Libexec,
}

impl InstallDir {
    /// The Ruby DSL receiver for this directory.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallDir::Bin => "bin",
            InstallDir::Sbin => "sbin",
            InstallDir::Libexec => "libexec",
        }
    }
}

impl FromStr for InstallDir {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bin" => Ok(InstallDir::Bin),
            "sbin" => Ok(InstallDir::Sbin),
            "libexec" => Ok(InstallDir::Libexec),
            other => Err(FormulaError::Parse(format!(
                "unsupported install directory '{}' (expected bin, sbin or libexec)",
                other
            ))),
        }
    }
}

impl fmt::Display for InstallDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single copy instruction: `<destination>.install "<source>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallStep {
    /// Path of the file inside the unpacked artifact.
    pub source: String,

    /// Prefix directory the file is installed into.
    #[serde(default)]
    pub destination: InstallDir,
}

impl InstallStep {
    /// Install `source` into `bin`.
    pub fn bin(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: InstallDir::Bin,
        }
    }
}

// ---------------------------------------------------------------------------
// Artifact variants
// ---------------------------------------------------------------------------

/// Archive format of a published release artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveFormat {
    #[serde(rename = "tar.xz")]
    TarXz,
    #[serde(rename = "tar.gz")]
    TarGz,
}

impl ArchiveFormat {
    /// File extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::TarXz => "tar.xz",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }

    /// Detect the format from a file name or URL path.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(".tar.xz") {
            Some(ArchiveFormat::TarXz)
        } else if name.ends_with(".tar.gz") {
            Some(ArchiveFormat::TarGz)
        } else {
            None
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One published flavour of the release archive.
///
/// A template lists its variants once; which one a formula is rendered for is
/// decided by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactVariant {
    /// Selector used on the command line, e.g. `darwin-arm64`.
    pub name: String,

    /// Archive format.
    pub format: ArchiveFormat,

    /// Target triple baked into the file name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl ArtifactVariant {
    /// Archive file name for `package`: `<package>-<target>.<ext>` or
    /// `<package>.<ext>` when the variant has no target.
    pub fn file_name(&self, package: &str) -> String {
        match self.target.as_deref() {
            Some(target) if !target.is_empty() => {
                format!("{}-{}.{}", package, target, self.format.extension())
            }
            _ => format!("{}.{}", package, self.format.extension()),
        }
    }
}

// ---------------------------------------------------------------------------
// Template and record
// ---------------------------------------------------------------------------

/// Root structure of `.formula.toml` / `.formula.json` / `.rb` templates.
///
/// Every scalar is optional so that a missing field is reported as a
/// malformed template rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaTemplate {
    /// Package name, e.g. `manta`.
    #[serde(default)]
    pub name: Option<String>,

    /// One-line description (`desc`).
    #[serde(default, alias = "desc")]
    pub description: Option<String>,

    /// Project homepage.
    #[serde(default)]
    pub homepage: Option<String>,

    /// Download URL with a `{{ VERSION }}` placeholder.
    #[serde(default, rename = "url", alias = "artifact_url")]
    pub artifact_url: Option<String>,

    /// Checksum field, normally `{{ SHA }}`.
    #[serde(default, rename = "sha256", alias = "checksum")]
    pub checksum: Option<String>,

    /// Version field, normally `{{ VERSION }}`.
    #[serde(default)]
    pub version: Option<String>,

    /// Install routine.
    #[serde(default, rename = "install", alias = "install_steps")]
    pub install_steps: Vec<InstallStep>,

    /// Artifact variants selectable at render time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ArtifactVariant>,

    /// Where this template was loaded from (set by the parser).
    #[serde(skip)]
    pub source: String,
}

impl FormulaTemplate {
    /// Look up an artifact variant by name.
    pub fn variant(&self, name: &str) -> Option<&ArtifactVariant> {
        self.artifacts.iter().find(|v| v.name == name)
    }

    /// View the template as a record, using empty strings for missing fields.
    ///
    /// Used to run [`crate::engine::validate`] over templates and over
    /// formulas read back from disk.
    pub fn to_record(&self) -> FormulaRecord {
        FormulaRecord {
            name: self.name.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            homepage: self.homepage.clone().unwrap_or_default(),
            artifact_url: self.artifact_url.clone().unwrap_or_default(),
            checksum: self.checksum.clone().unwrap_or_default(),
            version: self.version.clone().unwrap_or_default(),
            install_steps: self.install_steps.clone(),
        }
    }
}

/// A formula with every field present, templated or materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaRecord {
    pub name: String,
    pub description: String,
    pub homepage: String,
    #[serde(rename = "url")]
    pub artifact_url: String,
    #[serde(rename = "sha256")]
    pub checksum: String,
    pub version: String,
    #[serde(rename = "install")]
    pub install_steps: Vec<InstallStep>,
}

/// Concrete release values supplied by the release pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: String,
    pub checksum: String,
    pub artifact: Option<ArtifactVariant>,
}

impl Release {
    pub fn new(version: impl Into<String>, checksum: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            checksum: checksum.into(),
            artifact: None,
        }
    }

    pub fn with_artifact(mut self, artifact: ArtifactVariant) -> Self {
        self.artifact = Some(artifact);
        self
    }
}

/// Lifecycle phase of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Placeholders still present (authoring time).
    Templated,
    /// All placeholders substituted (release time).
    Materialized,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Templated => f.write_str("templated"),
            Phase::Materialized => f.write_str("materialized"),
        }
    }
}

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// Formula field a violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Description,
    Homepage,
    Url,
    Sha256,
    Version,
    Install,
}

impl Field {
    /// Name of the field as it appears in the Ruby formula.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "desc",
            Field::Homepage => "homepage",
            Field::Url => "url",
            Field::Sha256 => "sha256",
            Field::Version => "version",
            Field::Install => "install",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of an invariant violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    MissingField,
    InvalidName,
    MalformedTemplate,
    InvalidChecksum,
    InvalidVersion,
    InvalidUrl,
    MissingInstallSteps,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::MissingField => "missing-field",
            ViolationKind::InvalidName => "invalid-name",
            ViolationKind::MalformedTemplate => "malformed-template",
            ViolationKind::InvalidChecksum => "invalid-checksum",
            ViolationKind::InvalidVersion => "invalid-version",
            ViolationKind::InvalidUrl => "invalid-url",
            ViolationKind::MissingInstallSteps => "missing-install-steps",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single broken invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: Field,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(field: Field, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            field,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.field, self.kind, self.message)
    }
}

/// Every violation found in a record. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{} violation(s){}", .violations.len(), bulleted(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Number of violations of the given kind.
    pub fn count(&self, kind: ViolationKind) -> usize {
        self.violations.iter().filter(|v| v.kind == kind).count()
    }
}

fn bulleted(violations: &[Violation]) -> String {
    violations.iter().map(|v| format!("\n  - {}", v)).collect()
}

/// Errors that can occur during template parsing, rendering and validation.
#[derive(Debug, thiserror::Error)]
pub enum FormulaError {
    #[error("malformed template: {0}")]
    MalformedTemplate(String),

    #[error("invalid checksum '{0}': expected 64 lowercase hex characters")]
    InvalidChecksum(String),

    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("template not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
