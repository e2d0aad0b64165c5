//! Presentation of command results.
//!
//! Text output reproduces the phrases users see at the prompt; JSON output
//! writes one compact document per line so a headless run can be piped into
//! other tools.

use std::fmt::Display;
use std::io::{self, Write};

use calendar_engine::{format_date, format_date_time, format_time, EditRejection, Event};
use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::Serialize;

use crate::command::ParseError;

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable sentences.
    #[default]
    Text,
    /// One JSON document per command.
    Json,
}

/// Result of a mutating command in JSON form.
#[derive(Debug, Serialize)]
struct Outcome<'a> {
    ok: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
}

#[derive(Debug, Serialize)]
struct DayListing<'a> {
    date: String,
    events: &'a [&'a Event],
}

#[derive(Debug, Serialize)]
struct RangeListing<'a> {
    from: String,
    to: String,
    events: &'a [&'a Event],
}

#[derive(Debug, Serialize)]
struct StatusReport {
    at: String,
    busy: bool,
}

#[derive(Debug, Serialize)]
struct Failure<'a> {
    ok: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    format: OutputFormat,
}

impl Renderer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    // ── session chrome ──────────────────────────────────────────────────

    pub fn welcome(&self, out: &mut impl Write) -> io::Result<()> {
        self.text_only(out, "Welcome to Calendar App! Type 'exit' to quit.\n")
    }

    pub fn prompt(&self, out: &mut impl Write) -> io::Result<()> {
        self.text_only(out, "> ")?;
        out.flush()
    }

    pub fn goodbye(&self, out: &mut impl Write) -> io::Result<()> {
        self.text_only(out, "Goodbye!\n")
    }

    // ── mutations ───────────────────────────────────────────────────────

    pub fn event_created(&self, out: &mut impl Write, created: bool) -> io::Result<()> {
        let message = if created {
            "Event created successfully."
        } else {
            "Failed to create event. Event already exists."
        };
        self.outcome(out, created, message, None)
    }

    pub fn series_created(&self, out: &mut impl Write, created: bool) -> io::Result<()> {
        let message = if created {
            "Event series created successfully."
        } else {
            "Failed to create event series. No occurrences or one already exists."
        };
        self.outcome(out, created, message, None)
    }

    pub fn edited(
        &self,
        out: &mut impl Write,
        result: &Result<usize, EditRejection>,
    ) -> io::Result<()> {
        match result {
            Ok(count) => self.outcome(out, true, "Event(s) edited successfully.", Some(*count)),
            Err(reason) => {
                let message = format!("Failed to edit event(s): {reason}.");
                self.outcome(out, false, &message, None)
            }
        }
    }

    fn outcome(
        &self,
        out: &mut impl Write,
        ok: bool,
        message: &str,
        count: Option<usize>,
    ) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(out, "{message}"),
            OutputFormat::Json => write_json(
                out,
                &Outcome {
                    ok,
                    message,
                    count,
                },
            ),
        }
    }

    // ── queries ─────────────────────────────────────────────────────────

    pub fn events_on(
        &self,
        out: &mut impl Write,
        date: NaiveDate,
        events: &[&Event],
    ) -> io::Result<()> {
        let date = format_date(date);
        match self.format {
            OutputFormat::Json => write_json(out, &DayListing { date, events }),
            OutputFormat::Text if events.is_empty() => {
                writeln!(out, "No events found on {date}.")
            }
            OutputFormat::Text => {
                writeln!(out, "Events on {date}:")?;
                for event in events {
                    write_bullet(out, event, format_time(event.start()), format_time(event.end()))?;
                }
                Ok(())
            }
        }
    }

    pub fn events_in_range(
        &self,
        out: &mut impl Write,
        from: NaiveDateTime,
        to: NaiveDateTime,
        events: &[&Event],
    ) -> io::Result<()> {
        let (from, to) = (format_date_time(from), format_date_time(to));
        match self.format {
            OutputFormat::Json => write_json(out, &RangeListing { from, to, events }),
            OutputFormat::Text if events.is_empty() => {
                writeln!(out, "No events found in the specified range.")
            }
            OutputFormat::Text => {
                writeln!(out, "Events from {from} to {to}:")?;
                for event in events {
                    write_bullet(
                        out,
                        event,
                        format_date_time(event.start()),
                        format_date_time(event.end()),
                    )?;
                }
                Ok(())
            }
        }
    }

    pub fn status(&self, out: &mut impl Write, at: NaiveDateTime, busy: bool) -> io::Result<()> {
        let at = format_date_time(at);
        match self.format {
            OutputFormat::Json => write_json(out, &StatusReport { at, busy }),
            OutputFormat::Text => {
                let status = if busy { "busy" } else { "available" };
                writeln!(out, "Status on {at}: {status}")
            }
        }
    }

    // ── failures ────────────────────────────────────────────────────────

    pub fn malformed(&self, out: &mut impl Write, line: &str, err: &ParseError) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(out, "Unknown or malformed command: {line} ({err})"),
            OutputFormat::Json => write_json(
                out,
                &Failure {
                    ok: false,
                    error: err.to_string(),
                    line: Some(line),
                },
            ),
        }
    }

    pub fn error(&self, out: &mut impl Write, message: &dyn Display) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(out, "Error: {message}"),
            OutputFormat::Json => write_json(
                out,
                &Failure {
                    ok: false,
                    error: message.to_string(),
                    line: None,
                },
            ),
        }
    }

    fn text_only(&self, out: &mut impl Write, text: &str) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => out.write_all(text.as_bytes()),
            OutputFormat::Json => Ok(()),
        }
    }
}

fn write_bullet(
    out: &mut impl Write,
    event: &Event,
    start: String,
    end: String,
) -> io::Result<()> {
    write!(out, "• {} ({start} - {end})", event.subject())?;
    if let Some(location) = event.location() {
        write!(out, " at {location}")?;
    }
    writeln!(out)
}

fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)
}

// ── Tests ───────────────────────────────────────────────────────────────────
