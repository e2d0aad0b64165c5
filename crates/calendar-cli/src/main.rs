//! calendar CLI entry point.

use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;

use anyhow::{Context, Result};
use calendar_cli::{Cli, Mode, Outcome, Renderer, Session};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let renderer = Renderer::new(cli.format);
    let mut session = Session::new(renderer);
    let stdout = io::stdout().lock();

    let outcome = match (cli.mode, cli.file) {
        (Mode::Headless, Some(path)) => {
            let file = File::open(&path)
                .with_context(|| format!("failed to open command file {}", path.display()))?;
            tracing::info!(path = %path.display(), "running headless");
            session.run(BufReader::new(file), stdout, false)?
        }
        (Mode::Headless, None) => anyhow::bail!("headless mode requires a command file"),
        (Mode::Interactive, _) => session.run(io::stdin().lock(), stdout, true)?,
    };

    if cli.mode == Mode::Headless && outcome == Outcome::EndOfInput {
        renderer.error(&mut io::stdout(), &"command file ended without 'exit'")?;
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Logs go to stderr so stdout carries only command results.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("CALENDAR_LOG").unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
