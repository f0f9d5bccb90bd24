use clap::Parser;
use colored::Colorize;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use ssh_exec::cli::{self, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse_from(cli::normalize_args(std::env::args_os()));

    init_logging(cli.verbose);

    let strict = cli.strict;
    let result = cli.into_params().and_then(cli::exec::run);

    match result {
        Ok(outcome) => ExitCode::from(outcome.exit_code(strict)),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; RUST_LOG overrides the level picked by --verbose
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}
