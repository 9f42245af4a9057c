//! `manta-brew` -- Homebrew formula generator for Manta releases.
//!
//! Parses CLI arguments with clap, resolves the runtime context (including
//! `.manta-brew.toml`), and dispatches to command handlers.

mod cli;
mod commands;
mod context;
mod output;

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use context::RuntimeContext;

const VERBOSE_FILTER: &str = "manta_brew=debug,manta_formula=debug,manta_config=debug";

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let json = cli.global.json;
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e, json);
            ExitCode::FAILURE
        }
    }
}

/// `-v` turns on debug logs for the workspace crates. `RUST_LOG` overrides it.
fn init_tracing(verbose: bool) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new(VERBOSE_FILTER),
        Err(_) => return,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = RuntimeContext::from_global_args(&cli.global)?;
    match cli.command {
        Some(Commands::Render(args)) => commands::render::run(&ctx, &args),
        Some(Commands::Validate(args)) => commands::validate::run(&ctx, &args),
        Some(Commands::Checksum(args)) => commands::checksum::run(&ctx, &args),
        Some(Commands::Show(args)) => commands::show::run(&ctx, &args),
        Some(Commands::Init(args)) => commands::init::run(&ctx, &args),
        Some(Commands::Completion(args)) => commands::completion::run(&ctx, &args),
        Some(Commands::Version) => commands::version::run(&ctx),
        None => {
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    }
}

/// Errors go to stderr, as a JSON object in `--json` mode.
fn report(err: &anyhow::Error, json: bool) {
    if !json {
        eprintln!("Error: {:#}", err);
        return;
    }
    let body = serde_json::json!({ "error": format!("{:#}", err) });
    if let Ok(s) = serde_json::to_string_pretty(&body) {
        eprintln!("{}", s);
    }
}
