//! The immutable calendar event and the value types it carries.
//!
//! An [`Event`] is never mutated once it exists. Edits build a replacement
//! value and swap it into the [`Calendar`](crate::calendar::Calendar); the
//! constructor in this module re-checks every invariant on the way in.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};
use crate::format;

/// Start of the default working day applied when no explicit end is given.
pub const DAY_START: NaiveTime = match NaiveTime::from_hms_opt(8, 0, 0) {
    Some(t) => t,
    None => panic!("08:00 is a valid time"),
};

/// End of the default working day applied when no explicit end is given.
pub const DAY_END: NaiveTime = match NaiveTime::from_hms_opt(17, 0, 0) {
    Some(t) => t,
    None => panic!("17:00 is a valid time"),
};

// ── Location / Status ───────────────────────────────────────────────────────

/// Where an event takes place. Absence is modelled as `Option<Location>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Virtual,
    Physical,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Virtual => "virtual",
            Location::Physical => "physical",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "virtual" => Ok(Location::Virtual),
            "physical" => Ok(Location::Physical),
            _ => Err(CalendarError::invalid_value("location", s)),
        }
    }
}

/// Visibility of an event. Absence is modelled as `Option<Status>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Public,
    Private,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Public => "public",
            Status::Private => "private",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Status::Public),
            "private" => Ok(Status::Private),
            _ => Err(CalendarError::invalid_value("status", s)),
        }
    }
}

// ── SeriesId ────────────────────────────────────────────────────────────────

/// Shared tag of every occurrence generated by one recurrence request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(u64);

impl SeriesId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for SeriesId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── EventDraft ──────────────────────────────────────────────────────────────

/// Caller-supplied fields for a new event or series, before validation.
///
/// `end` is optional: when absent the event becomes an 08:00–17:00 block on
/// the date of `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub subject: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub location: Option<Location>,
    pub status: Option<Status>,
}

impl EventDraft {
    pub fn new(subject: impl Into<String>, start: NaiveDateTime) -> Self {
        Self {
            subject: subject.into(),
            description: String::new(),
            start,
            end: None,
            location: None,
            status: None,
        }
    }

    pub fn with_end(mut self, end: NaiveDateTime) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Effective `(start, end)` after the default working-day rule.
    pub fn bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        match self.end {
            Some(end) => (self.start, end),
            None => {
                let date = self.start.date();
                (date.and_time(DAY_START), date.and_time(DAY_END))
            }
        }
    }
}

// ── EventKey ────────────────────────────────────────────────────────────────

/// The identity triple. Two events with equal keys are duplicates regardless
/// of their other fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKey<'a> {
    pub subject: &'a str,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

// ── Event ───────────────────────────────────────────────────────────────────

/// One calendar occurrence.
///
/// `PartialEq` compares every field; use [`Event::key`] or
/// [`Event::same_identity`] for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub(crate) subject: String,
    #[serde(serialize_with = "format::serialize_date_time")]
    pub(crate) start: NaiveDateTime,
    #[serde(serialize_with = "format::serialize_date_time")]
    pub(crate) end: NaiveDateTime,
    pub(crate) description: String,
    pub(crate) location: Option<Location>,
    pub(crate) status: Option<Status>,
    pub(crate) series_id: Option<SeriesId>,
}

impl Event {
    /// Build a standalone event from a draft.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidArgument`] if the subject is blank or the
    /// effective end precedes the start.
    pub fn single(draft: EventDraft) -> Result<Event> {
        let (start, end) = draft.bounds();
        Event {
            subject: draft.subject,
            start,
            end,
            description: draft.description,
            location: draft.location,
            status: draft.status,
            series_id: None,
        }
        .validated()
    }

    /// Build one occurrence of a series on `date`, copying the times of day
    /// from `start`/`end`.
    pub(crate) fn occurrence(
        draft: &EventDraft,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        series_id: SeriesId,
    ) -> Result<Event> {
        Event {
            subject: draft.subject.clone(),
            start: date.and_time(start),
            end: date.and_time(end),
            description: draft.description.clone(),
            location: draft.location,
            status: draft.status,
            series_id: Some(series_id),
        }
        .validated()
    }

    /// Check every construction invariant, returning the event unchanged on
    /// success. Replacements built during an edit go through here too.
    pub(crate) fn validated(self) -> Result<Event> {
        if self.subject.trim().is_empty() {
            return Err(CalendarError::invalid_argument("subject must not be empty"));
        }
        if self.end < self.start {
            return Err(CalendarError::invalid_argument(format!(
                "end {} precedes start {}",
                self.end, self.start
            )));
        }
        if self.series_id.is_some() && self.start.date() != self.end.date() {
            return Err(CalendarError::invalid_argument(
                "series occurrences must start and end on the same date",
            ));
        }
        Ok(self)
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn status(&self) -> Option<Status> {
        self.status
    }

    pub fn series_id(&self) -> Option<SeriesId> {
        self.series_id
    }

    pub fn is_series_member(&self) -> bool {
        self.series_id.is_some()
    }

    pub fn key(&self) -> EventKey<'_> {
        EventKey {
            subject: &self.subject,
            start: self.start,
            end: self.end,
        }
    }

    pub fn same_identity(&self, other: &Event) -> bool {
        self.key() == other.key()
    }

    pub fn matches(&self, subject: &str, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.subject == subject && self.start == start && self.end == end
    }

    /// 08:00–17:00 on a single date.
    pub fn is_all_day(&self) -> bool {
        self.start.time() == DAY_START
            && self.end.time() == DAY_END
            && self.start.date() == self.end.date()
    }

    /// Strict interval overlap: touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Event) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether the inclusive date span `[start.date, end.date]` covers `date`.
    pub fn spans_date(&self, date: NaiveDate) -> bool {
        self.start.date() <= date && date <= self.end.date()
    }

    /// Whether `instant` falls in the half-open interval `[start, end)`.
    pub fn occupies(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Ordering key used by the calendar: start first, then end and subject so
    /// ties resolve the same way every run.
    pub(crate) fn sort_key(&self) -> (NaiveDateTime, NaiveDateTime, &str) {
        (self.start, self.end, &self.subject)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
