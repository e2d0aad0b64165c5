//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::view::OutputFormat;

/// Single-user weekly calendar.
#[derive(Debug, Parser)]
#[command(name = "calendar", version)]
#[command(about = "Create, edit and query calendar events from a prompt or a command file", long_about = None)]
pub struct Cli {
    /// Read commands from the terminal or from FILE.
    #[arg(long, value_enum, env = "CALENDAR_MODE")]
    pub mode: Mode,

    /// Command file, one command per line. Required in headless mode.
    #[arg(required_if_eq("mode", "headless"))]
    pub file: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, env = "CALENDAR_FORMAT", default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log engine decisions to stderr (overridden by CALENDAR_LOG).
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Prompt for commands on stdin.
    Interactive,
    /// Run the commands in FILE, which must end with `exit`.
    Headless,
}
