//! Line-oriented command language.
//!
//! One line is one command. Tokens are separated by whitespace; a token in
//! double quotes may contain spaces. Keywords are case-sensitive except for
//! `exit`.

use calendar_engine::{
    parse_date, parse_date_time, parse_weekdays, EditRequest, EditScope, EventDraft, DAY_START,
};
use chrono::{NaiveDate, NaiveDateTime, Weekday};
use thiserror::Error;

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateEvent {
        draft: EventDraft,
        repeat: Option<Repeat>,
    },
    Edit(EditRequest),
    PrintOn(NaiveDate),
    PrintRange {
        from: NaiveDateTime,
        to: NaiveDateTime,
    },
    ShowStatus(NaiveDateTime),
    Exit,
}

/// The `repeats <days> ...` clause of a create command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repeat {
    pub weekdays: Vec<Weekday>,
    pub bound: RepeatBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatBound {
    Times(u32),
    Until(NaiveDate),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error("expected {expected}, found {found:?}")]
    Expected {
        expected: &'static str,
        found: String,
    },

    #[error("expected {0}, found end of line")]
    Missing(&'static str),

    #[error("invalid date-time {0:?}, expected YYYY-MM-DDThh:mm")]
    InvalidDateTime(String),

    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid weekdays {0:?}, expected letters from MTWRFSU")]
    InvalidWeekdays(String),

    #[error("invalid occurrence count {0:?}")]
    InvalidCount(String),

    #[error("unexpected {0:?} after end of command")]
    Trailing(String),

    #[error("unterminated quote")]
    UnterminatedQuote,
}

/// Parse one non-blank command line.
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let tokens = tokenize(line)?;
    let mut cursor = Cursor::new(&tokens);
    let command = match cursor.peek() {
        Some(word) if word.eq_ignore_ascii_case("exit") => {
            cursor.advance();
            Command::Exit
        }
        Some("create") => {
            cursor.advance();
            parse_create(&mut cursor)?
        }
        Some("edit") => {
            cursor.advance();
            parse_edit(&mut cursor)?
        }
        Some("print") => {
            cursor.advance();
            parse_print(&mut cursor)?
        }
        Some("show") => {
            cursor.advance();
            cursor.keyword("status")?;
            cursor.keyword("on")?;
            Command::ShowStatus(cursor.date_time()?)
        }
        Some(other) => return Err(ParseError::UnknownCommand(other.to_string())),
        None => return Err(ParseError::Missing("a command")),
    };
    cursor.finish()?;
    Ok(command)
}

fn parse_create(cursor: &mut Cursor<'_>) -> Result<Command, ParseError> {
    cursor.keyword("event")?;
    let subject = cursor.token("subject")?;
    let draft = match cursor.token("'from' or 'on'")? {
        "from" => {
            let start = cursor.date_time()?;
            cursor.keyword("to")?;
            EventDraft::new(subject, start).with_end(cursor.date_time()?)
        }
        "on" => EventDraft::new(subject, cursor.date()?.and_time(DAY_START)),
        other => {
            return Err(ParseError::Expected {
                expected: "'from' or 'on'",
                found: other.to_string(),
            })
        }
    };
    let repeat = if cursor.peek() == Some("repeats") {
        cursor.advance();
        Some(parse_repeat(cursor)?)
    } else {
        None
    };
    Ok(Command::CreateEvent { draft, repeat })
}

fn parse_repeat(cursor: &mut Cursor<'_>) -> Result<Repeat, ParseError> {
    let symbols = cursor.token("weekdays")?;
    let weekdays =
        parse_weekdays(symbols).ok_or_else(|| ParseError::InvalidWeekdays(symbols.to_string()))?;
    let bound = match cursor.token("'for' or 'until'")? {
        "for" => {
            let raw = cursor.token("occurrence count")?;
            let count = raw
                .parse()
                .map_err(|_| ParseError::InvalidCount(raw.to_string()))?;
            cursor.keyword("times")?;
            RepeatBound::Times(count)
        }
        "until" => RepeatBound::Until(cursor.date()?),
        other => {
            return Err(ParseError::Expected {
                expected: "'for' or 'until'",
                found: other.to_string(),
            })
        }
    };
    Ok(Repeat { weekdays, bound })
}

fn parse_edit(cursor: &mut Cursor<'_>) -> Result<Command, ParseError> {
    let scope = match cursor.token("'event', 'events' or 'series'")? {
        "event" => EditScope::Single,
        "events" => EditScope::Forward,
        "series" => EditScope::Entire,
        other => {
            return Err(ParseError::Expected {
                expected: "'event', 'events' or 'series'",
                found: other.to_string(),
            })
        }
    };
    let property = cursor.token("property")?;
    let subject = cursor.token("subject")?;
    cursor.keyword("from")?;
    let start = cursor.date_time()?;
    let end = if scope == EditScope::Single {
        cursor.keyword("to")?;
        Some(cursor.date_time()?)
    } else {
        None
    };
    cursor.keyword("with")?;
    let value = cursor.rest("new value")?;

    let request = EditRequest::new(scope, property, subject, start, value);
    Ok(Command::Edit(match end {
        Some(end) => request.with_end(end),
        None => request,
    }))
}

fn parse_print(cursor: &mut Cursor<'_>) -> Result<Command, ParseError> {
    cursor.keyword("events")?;
    match cursor.token("'on' or 'from'")? {
        "on" => Ok(Command::PrintOn(cursor.date()?)),
        "from" => {
            let from = cursor.date_time()?;
            cursor.keyword("to")?;
            let to = cursor.date_time()?;
            Ok(Command::PrintRange { from, to })
        }
        other => Err(ParseError::Expected {
            expected: "'on' or 'from'",
            found: other.to_string(),
        }),
    }
}

// ── Tokens ──────────────────────────────────────────────────────────────────

/// Split on whitespace, keeping double-quoted runs together. Quotes are
/// stripped; `""` is an empty token.
fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if quoted {
        return Err(ParseError::UnterminatedQuote);
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

struct Cursor<'a> {
    tokens: &'a [String],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [String]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn token(&mut self, expected: &'static str) -> Result<&'a str, ParseError> {
        let token = self.peek().ok_or(ParseError::Missing(expected))?;
        self.advance();
        Ok(token)
    }

    fn keyword(&mut self, keyword: &'static str) -> Result<(), ParseError> {
        match self.token(keyword)? {
            found if found == keyword => Ok(()),
            found => Err(ParseError::Expected {
                expected: keyword,
                found: found.to_string(),
            }),
        }
    }

    fn date_time(&mut self) -> Result<NaiveDateTime, ParseError> {
        let raw = self.token("a date-time")?;
        parse_date_time(raw).ok_or_else(|| ParseError::InvalidDateTime(raw.to_string()))
    }

    fn date(&mut self) -> Result<NaiveDate, ParseError> {
        let raw = self.token("a date")?;
        parse_date(raw).ok_or_else(|| ParseError::InvalidDate(raw.to_string()))
    }

    /// Every remaining token, joined by single spaces.
    fn rest(&mut self, expected: &'static str) -> Result<String, ParseError> {
        let rest = &self.tokens[self.pos.min(self.tokens.len())..];
        if rest.is_empty() {
            return Err(ParseError::Missing(expected));
        }
        self.pos = self.tokens.len();
        Ok(rest.join(" "))
    }

    fn finish(&self) -> Result<(), ParseError> {
        match self.peek() {
            Some(extra) => Err(ParseError::Trailing(extra.to_string())),
            None => Ok(()),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
