//! The read-parse-execute loop shared by both modes.

use std::io::{BufRead, Write};
use std::ops::ControlFlow;

use anyhow::{Context, Result};
use calendar_engine::Calendar;

use crate::command::{self, Command, Repeat, RepeatBound};
use crate::view::Renderer;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// An `exit` command was read.
    Exited,
    /// The input ran out first.
    EndOfInput,
}

/// One calendar plus the renderer its results are written with.
#[derive(Debug, Default)]
pub struct Session {
    calendar: Calendar,
    renderer: Renderer,
}

impl Session {
    pub fn new(renderer: Renderer) -> Self {
        Self {
            calendar: Calendar::new(),
            renderer,
        }
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Process `input` line by line until `exit` or end of input.
    ///
    /// Interactive runs print the welcome banner and a prompt before every
    /// line. Blank lines are skipped.
    pub fn run(
        &mut self,
        input: impl BufRead,
        mut output: impl Write,
        interactive: bool,
    ) -> Result<Outcome> {
        if interactive {
            self.renderer.welcome(&mut output)?;
            self.renderer.prompt(&mut output)?;
        }
        for line in input.lines() {
            let line = line.context("failed to read command")?;
            if !line.trim().is_empty() && self.execute(&line, &mut output)?.is_break() {
                output.flush()?;
                return Ok(Outcome::Exited);
            }
            if interactive {
                self.renderer.prompt(&mut output)?;
            }
        }
        output.flush()?;
        Ok(Outcome::EndOfInput)
    }

    /// Parse and execute one command line, writing its result to `output`.
    ///
    /// Malformed lines and engine errors are rendered and the session goes on;
    /// only output failures are returned as errors. Breaks on `exit`.
    pub fn execute(&mut self, line: &str, output: &mut impl Write) -> Result<ControlFlow<()>> {
        let command = match command::parse(line) {
            Ok(command) => command,
            Err(err) => {
                tracing::debug!(%line, error = %err, "malformed command");
                self.renderer.malformed(output, line.trim(), &err)?;
                return Ok(ControlFlow::Continue(()));
            }
        };
        let renderer = self.renderer;
        let calendar = &mut self.calendar;

        match command {
            Command::CreateEvent { draft, repeat: None } => {
                match calendar.create_event(draft) {
                    Ok(created) => renderer.event_created(output, created)?,
                    Err(err) => renderer.error(output, &err)?,
                }
            }
            Command::CreateEvent {
                draft,
                repeat: Some(Repeat { weekdays, bound }),
            } => {
                let result = match bound {
                    RepeatBound::Times(count) => {
                        calendar.create_series_by_count(&draft, &weekdays, count)
                    }
                    RepeatBound::Until(last_date) => {
                        calendar.create_series_until(&draft, &weekdays, last_date)
                    }
                };
                match result {
                    Ok(created) => renderer.series_created(output, created)?,
                    Err(err) => renderer.error(output, &err)?,
                }
            }
            Command::Edit(request) => renderer.edited(output, &calendar.try_edit(&request))?,
            Command::PrintOn(date) => {
                renderer.events_on(output, date, &calendar.events_on_date(date))?
            }
            Command::PrintRange { from, to } => {
                renderer.events_in_range(output, from, to, &calendar.events_in_range(from, to))?
            }
            Command::ShowStatus(at) => renderer.status(output, at, calendar.is_busy_at(at))?,
            Command::Exit => {
                renderer.goodbye(output)?;
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::OutputFormat;

    fn run(script: &str, interactive: bool) -> (Outcome, String, Session) {
        let mut session = Session::new(Renderer::new(OutputFormat::Text));
        let mut out = Vec::new();
        let outcome = session.run(script.as_bytes(), &mut out, interactive).unwrap();
        (outcome, String::from_utf8(out).unwrap(), session)
    }

    // ── run tests ───────────────────────────────────────────────────────

    #[test]
    fn test_headless_script_runs_to_exit() {
        let script = "\
create event Standup from 2025-06-02T09:00 to 2025-06-02T09:15 repeats MWF for 3 times

print events on 2025-06-04
exit
print events on 2025-06-02
";
        let (outcome, out, session) = run(script, false);
        assert_eq!(outcome, Outcome::Exited);
        assert_eq!(
            out,
            "Event series created successfully.\n\
             Events on 2025-06-04:\n\
             • Standup (09:00 - 09:15)\n\
             Goodbye!\n"
        );
        assert_eq!(session.calendar().len(), 3);
    }

    #[test]
    fn test_missing_exit_reports_end_of_input() {
        let (outcome, out, _) = run("create event Lunch on 2025-06-11\n", false);
        assert_eq!(outcome, Outcome::EndOfInput);
        assert_eq!(out, "Event created successfully.\n");
    }

    #[test]
    fn test_interactive_prints_banner_and_prompts() {
        let (outcome, out, _) = run("show status on 2025-06-11T09:00\nexit\n", true);
        assert_eq!(outcome, Outcome::Exited);
        assert_eq!(
            out,
            "Welcome to Calendar App! Type 'exit' to quit.\n\
             > Status on 2025-06-11T09:00: available\n\
             > Goodbye!\n"
        );
    }

    // ── execute tests ───────────────────────────────────────────────────

    #[test]
    fn test_malformed_line_does_not_stop_the_session() {
        let (_, out, _) = run("frobnicate\nshow status on 2025-06-11T09:00\n", false);
        assert_eq!(
            out,
            "Unknown or malformed command: frobnicate (unknown command \"frobnicate\")\n\
             Status on 2025-06-11T09:00: available\n"
        );
    }

    #[test]
    fn test_engine_errors_are_rendered() {
        let (_, out, session) = run(
            "create event X from 2025-06-11T10:00 to 2025-06-11T09:00\n\
             create event X on 2025-06-11 repeats M for 0 times\n",
            false,
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.starts_with("Error: Invalid argument")), "{out}");
        assert!(session.calendar().is_empty());
    }

    #[test]
    fn test_series_too_long_for_the_calendar_is_rejected() {
        let (_, out, session) = run(
            "create event X on 2025-06-11 repeats MTWRFSU for 4294967295 times\n",
            false,
        );
        assert_eq!(
            out,
            "Error: Invalid argument: series runs past the supported date range\n"
        );
        assert!(session.calendar().is_empty());
    }

    #[test]
    fn test_duplicates_and_edits() {
        let script = "\
create event Standup from 2025-06-02T09:00 to 2025-06-02T09:15 repeats M for 2 times
create event Standup from 2025-06-09T09:00 to 2025-06-09T09:15
edit series location Standup from 2025-06-09T09:00 with virtual
edit events start Nobody from 2025-06-09T09:00 with 2025-06-09T10:00
print events from 2025-06-02T00:00 to 2025-06-10T00:00
";
        let (_, out, _) = run(script, false);
        assert_eq!(
            out,
            "Event series created successfully.\n\
             Failed to create event. Event already exists.\n\
             Event(s) edited successfully.\n\
             Failed to edit event(s): no unique event matches that subject and time.\n\
             Events from 2025-06-02T00:00 to 2025-06-10T00:00:\n\
             • Standup (2025-06-02T09:00 - 2025-06-02T09:15) at virtual\n\
             • Standup (2025-06-09T09:00 - 2025-06-09T09:15) at virtual\n"
        );
    }

    #[test]
    fn test_until_without_occurrences_fails_softly() {
        let (_, out, _) = run(
            "create event X on 2025-06-11 repeats M until 2025-06-12\n",
            false,
        );
        assert_eq!(
            out,
            "Failed to create event series. No occurrences or one already exists.\n"
        );
    }
}
