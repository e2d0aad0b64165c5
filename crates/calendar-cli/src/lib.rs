//! # calendar-cli
//!
//! Command-line front end for [`calendar_engine`]. Commands arrive one per
//! line, either typed at a prompt or read from a file, and each result is
//! written to stdout as text or JSON.
//!
//! - [`cli`]: process arguments
//! - [`command`]: the command language
//! - [`session`]: the read-parse-execute loop
//! - [`view`]: text and JSON rendering

pub mod cli;
pub mod command;
pub mod session;
pub mod view;

pub use cli::{Cli, Mode};
pub use command::{parse, Command, ParseError};
pub use session::{Outcome, Session};
pub use view::{OutputFormat, Renderer};
