//! Series-aware editing.
//!
//! An edit names a target event, a property, a new literal value and a scope.
//! The engine computes the complete replacement set, validates it against the
//! rest of the calendar, and only then swaps it in. Any failure along the way
//! leaves the calendar exactly as it was.
//!
//! ```text
//! located ──► computed ──► validated ──► committed
//!    │            │             │
//!    └────────────┴─────────────┴──► rejected (no mutation)
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::calendar::Calendar;
use crate::error::CalendarError;
use crate::event::{Event, Location, Status};
use crate::format::parse_date_time;

// ── Request types ───────────────────────────────────────────────────────────

/// The event field an edit changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditProperty {
    Subject,
    Start,
    End,
    Description,
    Location,
    Status,
}

impl EditProperty {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditProperty::Subject => "subject",
            EditProperty::Start => "start",
            EditProperty::End => "end",
            EditProperty::Description => "description",
            EditProperty::Location => "location",
            EditProperty::Status => "status",
        }
    }
}

impl fmt::Display for EditProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditProperty {
    type Err = EditRejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subject" => Ok(EditProperty::Subject),
            "start" => Ok(EditProperty::Start),
            "end" => Ok(EditProperty::End),
            "description" => Ok(EditProperty::Description),
            "location" => Ok(EditProperty::Location),
            "status" => Ok(EditProperty::Status),
            other => Err(EditRejection::InvalidProperty(other.to_string())),
        }
    }
}

/// Which members of the target's series an edit reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditScope {
    /// The target only.
    Single,
    /// The target and every later member of its series.
    Forward,
    /// Every member of the target's series.
    Entire,
}

/// A structured edit as produced by the command layer.
///
/// `property` and `new_value` stay textual: the engine owns their parsing so
/// an unknown property or malformed value is an ordinary rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub property: String,
    pub subject: String,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub new_value: String,
    pub scope: EditScope,
}

impl EditRequest {
    pub fn new(
        scope: EditScope,
        property: impl Into<String>,
        subject: impl Into<String>,
        start: NaiveDateTime,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            property: property.into(),
            subject: subject.into(),
            start,
            end: None,
            new_value: new_value.into(),
            scope,
        }
    }

    pub fn with_end(mut self, end: NaiveDateTime) -> Self {
        self.end = Some(end);
        self
    }
}

/// Why an edit was not applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditRejection {
    #[error("unknown property {0:?}")]
    InvalidProperty(String),

    #[error("editing a single event needs both its start and end")]
    MissingEnd,

    #[error("no unique event matches that subject and time")]
    NotFound,

    #[error("the event is not part of a series")]
    NotASeries,

    #[error(transparent)]
    Invalid(#[from] CalendarError),

    #[error("the edit would duplicate an existing event")]
    Conflict,
}

// ── New values ──────────────────────────────────────────────────────────────

/// A new value parsed for its property.
#[derive(Debug, Clone, PartialEq, Eq)]
enum NewValue {
    Subject(String),
    Start(NaiveDateTime),
    End(NaiveDateTime),
    Description(String),
    Location(Location),
    Status(Status),
}

impl NewValue {
    fn parse(property: EditProperty, raw: &str) -> Result<Self, CalendarError> {
        let invalid = || CalendarError::invalid_value(property.as_str(), raw);
        match property {
            EditProperty::Subject => {
                let subject = raw.trim();
                if subject.is_empty() {
                    return Err(invalid());
                }
                Ok(NewValue::Subject(subject.to_string()))
            }
            EditProperty::Start => parse_date_time(raw).map(NewValue::Start).ok_or_else(invalid),
            EditProperty::End => parse_date_time(raw).map(NewValue::End).ok_or_else(invalid),
            EditProperty::Description => Ok(NewValue::Description(raw.to_string())),
            EditProperty::Location => raw.parse().map(NewValue::Location),
            EditProperty::Status => raw.parse().map(NewValue::Status),
        }
    }

    /// Build the replacement for `event`. Time edits move `target` to the new
    /// value and shift every other selected member by the same amount.
    fn apply(&self, event: &Event, target: &Event) -> Result<Event, CalendarError> {
        let mut next = event.clone();
        match self {
            NewValue::Subject(subject) => next.subject = subject.clone(),
            NewValue::Start(start) => {
                next.start = shift(event.start, *start - target.start)?;
            }
            NewValue::End(end) => {
                next.end = shift(event.end, *end - target.end)?;
            }
            NewValue::Description(description) => next.description = description.clone(),
            NewValue::Location(location) => next.location = Some(*location),
            NewValue::Status(status) => next.status = Some(*status),
        }
        next.validated()
    }
}

fn shift(value: NaiveDateTime, delta: chrono::Duration) -> Result<NaiveDateTime, CalendarError> {
    value
        .checked_add_signed(delta)
        .ok_or_else(|| CalendarError::invalid_argument("shifted time is out of range"))
}

// ── Calendar::edit ──────────────────────────────────────────────────────────

impl Calendar {
    /// Apply `request`, returning whether anything changed.
    ///
    /// See [`Calendar::try_edit`] for the rejection reasons.
    pub fn edit(&mut self, request: &EditRequest) -> bool {
        self.try_edit(request).is_ok()
    }

    /// Apply `request` as one transaction and return the number of events
    /// replaced.
    ///
    /// A `start` edit with [`EditScope::Forward`] or [`EditScope::Entire`]
    /// moves the edited members into a new series id; every other edit keeps
    /// the ids it found.
    ///
    /// # Errors
    ///
    /// Every error leaves the calendar unchanged:
    /// - [`EditRejection::InvalidProperty`] for an unknown property name
    /// - [`EditRejection::MissingEnd`] for a single-event edit without `end`
    /// - [`EditRejection::NotFound`] when zero or several events match
    /// - [`EditRejection::NotASeries`] for a series scope on a standalone event
    /// - [`EditRejection::Invalid`] when the value does not parse or a
    ///   replacement breaks an event invariant
    /// - [`EditRejection::Conflict`] when a replacement duplicates another
    ///   replacement or an event outside the edit
    pub fn try_edit(&mut self, request: &EditRequest) -> Result<usize, EditRejection> {
        let result = self.apply_edit(request);
        match &result {
            Ok(count) => tracing::debug!(
                subject = %request.subject,
                property = %request.property,
                scope = ?request.scope,
                count,
                "edit committed"
            ),
            Err(reason) => tracing::debug!(
                subject = %request.subject,
                property = %request.property,
                scope = ?request.scope,
                %reason,
                "edit rejected"
            ),
        }
        result
    }

    fn apply_edit(&mut self, request: &EditRequest) -> Result<usize, EditRejection> {
        let property: EditProperty = request.property.parse()?;
        if request.scope == EditScope::Single && request.end.is_none() {
            return Err(EditRejection::MissingEnd);
        }

        // located
        let target_index = self
            .locate(&request.subject, request.start, request.end)
            .ok_or(EditRejection::NotFound)?;
        let target = self.events[target_index].clone();
        let selected = self.select(target_index, &target, request.scope)?;

        // computed
        let value = NewValue::parse(property, &request.new_value)?;
        let mut replacements = selected
            .iter()
            .map(|&index| value.apply(&self.events[index], &target))
            .collect::<Result<Vec<_>, _>>()?;

        // validated
        self.check_conflicts(&selected, &replacements)?;

        // committed
        if property == EditProperty::Start && request.scope != EditScope::Single {
            let series_id = self.series_ids.allocate();
            for replacement in &mut replacements {
                replacement.series_id = Some(series_id);
            }
        }
        let count = replacements.len();
        let mut index = 0;
        self.events.retain(|_| {
            let keep = selected.binary_search(&index).is_err();
            index += 1;
            keep
        });
        self.events.extend(replacements);
        self.sort();
        Ok(count)
    }

    /// Indices of the events an edit of `target` reaches, ascending.
    fn select(
        &self,
        target_index: usize,
        target: &Event,
        scope: EditScope,
    ) -> Result<Vec<usize>, EditRejection> {
        if scope == EditScope::Single {
            return Ok(vec![target_index]);
        }
        let series_id = target.series_id().ok_or(EditRejection::NotASeries)?;
        Ok(self
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.series_id() == Some(series_id))
            .filter(|(_, e)| scope == EditScope::Entire || e.start() >= target.start())
            .map(|(index, _)| index)
            .collect())
    }

    fn check_conflicts(
        &self,
        selected: &[usize],
        replacements: &[Event],
    ) -> Result<(), EditRejection> {
        let mut keys = HashSet::with_capacity(replacements.len());
        if !replacements.iter().all(|r| keys.insert(r.key())) {
            return Err(EditRejection::Conflict);
        }
        let collides = self
            .events
            .iter()
            .enumerate()
            .filter(|(index, _)| selected.binary_search(index).is_err())
            .any(|(_, e)| keys.contains(&e.key()));
        if collides {
            return Err(EditRejection::Conflict);
        }
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
