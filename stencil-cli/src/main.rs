//! Stencil: apply cookiecutter templates and fold project changes back in.
//!
//! # Usage
//!
//! ```text
//! stencil [--debug] apply [--project-path P] [--replay-file F] [--template-path T]
//! stencil [--debug] integrate [--project-path P] [--replay-file F] [--template-path T]
//!                             [--ignore-unstaged-changes]
//! ```

mod commands;
mod terminal;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{apply::ApplyArgs, integrate::IntegrateArgs};

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "STENCIL_LOG";

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "stencil",
    version,
    about = "Apply cookiecutter templates and reintegrate project changes into them",
    long_about = None,
)]
struct Cli {
    /// Enable debug logging (overrides STENCIL_LOG).
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Re-render the template over the project using its replay file.
    Apply(ApplyArgs),

    /// Reintegrate project changes into the template, file by file.
    Integrate(IntegrateArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("{} {}", "error:".red().bold(), one_line(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Apply(args) => args.run(),
        Commands::Integrate(args) => args.run(),
    }
}

/// Flatten the error chain into one line, dropping causes whose text the
/// outer message already contains.
fn one_line(err: &anyhow::Error) -> String {
    let mut line = String::new();
    for cause in err.chain() {
        let text = cause.to_string();
        if line.contains(&text) {
            continue;
        }
        if !line.is_empty() {
            line.push_str(": ");
        }
        line.push_str(&text);
    }
    line
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .with_file(debug)
        .with_line_number(debug)
        .try_init();
}
