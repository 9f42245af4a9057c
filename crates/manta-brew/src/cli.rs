//! Clap CLI definitions for the `manta-brew` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// manta-brew -- Homebrew formulas for Manta releases.
///
/// Renders a formula template with a release version and artifact checksum,
/// and validates templates and rendered formulas before they are published.
#[derive(Parser, Debug)]
#[command(
    name = "manta-brew",
    about = "Render and validate Homebrew formulas for Manta releases",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Configuration file (default: nearest .manta-brew.toml, or $MANTA_BREW_CONFIG).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a formula template for a release.
    Render(RenderArgs),

    /// Validate a template or rendered formula and list every violation.
    #[command(alias = "check")]
    Validate(ValidateArgs),

    /// Print SHA-256 digests of release artifacts.
    Checksum(ChecksumArgs),

    /// Summarize a template: fields, placeholders and artifact variants.
    Show(ShowArgs),

    /// Write a starter template and configuration file.
    Init(InitArgs),

    /// Generate shell completion scripts.
    Completion(CompletionArgs),

    /// Print version information.
    Version,
}

/// Output format for rendered formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Homebrew Ruby formula.
    Ruby,
    /// JSON record.
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Ruby => "rb",
            OutputFormat::Json => "json",
        }
    }
}

/// Arguments for `manta-brew render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Release version (semver, without a leading `v`).
    #[arg(long = "release-version", value_name = "VERSION")]
    pub release_version: String,

    /// SHA-256 of the release artifact (64 lowercase hex characters).
    #[arg(long, conflicts_with = "artifact_file", required_unless_present = "artifact_file")]
    pub sha256: Option<String>,

    /// Compute the checksum from this artifact file instead of --sha256.
    #[arg(long, value_name = "FILE")]
    pub artifact_file: Option<PathBuf>,

    /// Artifact variant to render (default: `artifact` from the config).
    #[arg(long, short = 'a')]
    pub artifact: Option<String>,

    /// Template name or path (default: `template` from the config).
    #[arg(long, short = 't')]
    pub template: Option<String>,

    /// Output file, or `-` for stdout (default: <output_dir>/<name>.rb).
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Ruby)]
    pub format: OutputFormat,
}

/// Arguments for `manta-brew validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Template or formula name or path (default: `template` from the config).
    pub path: Option<String>,
}

/// Arguments for `manta-brew checksum`.
#[derive(Args, Debug)]
pub struct ChecksumArgs {
    /// Artifact files to hash (`-` for stdin).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for `manta-brew show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Template name or path (default: `template` from the config).
    #[arg(long, short = 't')]
    pub template: Option<String>,
}

/// Arguments for `manta-brew init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the starter template.
    #[arg(long, default_value = "manta.formula.toml")]
    pub path: PathBuf,

    /// Overwrite existing files.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `manta-brew completion`.
#[derive(Args, Debug)]
pub struct CompletionArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script into this directory instead of stdout.
    #[arg(long)]
    pub dir: Option<PathBuf>,
}
