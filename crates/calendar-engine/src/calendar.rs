//! The calendar store: an ordered, duplicate-free collection of events.
//!
//! Events are kept sorted by start at all times, so every query returns its
//! results in ascending start order without re-sorting. Two events are
//! duplicates when their `(subject, start, end)` triples match; every
//! insertion path enforces that, and batch insertions are all-or-nothing.
//!
//! Mutation goes through `&mut self`. A caller that shares one calendar
//! across threads must wrap it in a lock: the check-then-insert sequences
//! below are not atomic with respect to other writers.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, Weekday};

use crate::error::{CalendarError, Result};
use crate::event::{Event, EventDraft, EventKey};
use crate::recurrence::{self, SeriesIdAllocator};

#[derive(Debug, Clone, Default)]
pub struct Calendar {
    pub(crate) events: Vec<Event>,
    pub(crate) series_ids: SeriesIdAllocator,
}

impl Calendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored event, ascending by start.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains(&self, key: EventKey<'_>) -> bool {
        self.events.iter().any(|e| e.key() == key)
    }

    // ── insertion / removal ─────────────────────────────────────────────

    /// Insert `event` in start order. Returns `false` and leaves the calendar
    /// untouched if an event with the same identity is already stored.
    pub fn add(&mut self, event: Event) -> bool {
        if self.contains(event.key()) {
            tracing::debug!(subject = %event.subject(), start = %event.start(), "duplicate event rejected");
            return false;
        }
        tracing::debug!(subject = %event.subject(), start = %event.start(), "event added");
        self.insert_sorted(event);
        true
    }

    /// Insert every event or none of them. The batch is rejected if any member
    /// duplicates a stored event or another member of the same batch.
    pub fn add_all(&mut self, events: Vec<Event>) -> bool {
        let mut batch = HashSet::with_capacity(events.len());
        for event in &events {
            if !batch.insert(event.key()) {
                tracing::debug!(subject = %event.subject(), start = %event.start(), "batch repeats an event");
                return false;
            }
        }
        if self.events.iter().any(|e| batch.contains(&e.key())) {
            tracing::debug!(size = events.len(), "batch collides with stored events");
            return false;
        }

        self.events.extend(events);
        self.sort();
        true
    }

    /// Remove the event with the same identity as `event`.
    pub fn remove(&mut self, event: &Event) -> bool {
        match self.events.iter().position(|e| e.same_identity(event)) {
            Some(index) => {
                self.events.remove(index);
                true
            }
            None => false,
        }
    }

    // ── creation ────────────────────────────────────────────────────────

    /// Build a standalone event from `draft` and add it.
    ///
    /// Returns `Ok(false)` when the event duplicates a stored one.
    ///
    /// # Errors
    ///
    /// Propagates [`CalendarError::InvalidArgument`] from construction.
    pub fn create_event(&mut self, draft: EventDraft) -> Result<bool> {
        let event = Event::single(draft)?;
        Ok(self.add(event))
    }

    /// Expand a series of `count` occurrences and add it atomically.
    ///
    /// Returns `Ok(false)` when any occurrence duplicates a stored event; no
    /// occurrence is added in that case.
    pub fn create_series_by_count(
        &mut self,
        draft: &EventDraft,
        weekdays: &[Weekday],
        count: u32,
    ) -> Result<bool> {
        let mut ids = self.series_ids.clone();
        let occurrences = recurrence::expand_by_count(draft, weekdays, count, &mut ids)?;
        Ok(self.commit_series(occurrences, ids))
    }

    /// Expand a series through `last_date` and add it atomically.
    ///
    /// A request that produces no occurrences returns `Ok(false)`.
    pub fn create_series_until(
        &mut self,
        draft: &EventDraft,
        weekdays: &[Weekday],
        last_date: NaiveDate,
    ) -> Result<bool> {
        let mut ids = self.series_ids.clone();
        match recurrence::expand_until(draft, weekdays, last_date, &mut ids) {
            Ok(occurrences) => Ok(self.commit_series(occurrences, ids)),
            Err(CalendarError::NoOccurrences) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// The allocator copy is only kept when the occurrences were stored, so a
    /// rejected series leaves the calendar exactly as it was.
    fn commit_series(&mut self, occurrences: Vec<Event>, ids: SeriesIdAllocator) -> bool {
        let count = occurrences.len();
        let series_id = occurrences.first().and_then(Event::series_id);
        if !self.add_all(occurrences) {
            return false;
        }
        self.series_ids = ids;
        tracing::debug!(count, series_id = ?series_id, "series created");
        true
    }

    // ── queries ─────────────────────────────────────────────────────────

    /// The event with exactly this identity, or `None` when zero or several
    /// stored events match.
    pub fn find_unique(
        &self,
        subject: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Option<&Event> {
        self.locate(subject, start, Some(end))
            .map(|index| &self.events[index])
    }

    /// Index of the single event matching `subject` and `start` (and `end`
    /// when given).
    pub(crate) fn locate(
        &self,
        subject: &str,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
    ) -> Option<usize> {
        let mut matches = self.events.iter().enumerate().filter(|(_, e)| {
            e.subject() == subject && e.start() == start && end.is_none_or(|end| e.end() == end)
        });
        match (matches.next(), matches.next()) {
            (Some((index, _)), None) => Some(index),
            _ => None,
        }
    }

    /// Events whose inclusive date span covers `date`.
    pub fn events_on_date(&self, date: NaiveDate) -> Vec<&Event> {
        self.events.iter().filter(|e| e.spans_date(date)).collect()
    }

    /// Events overlapping the window: `event.start < end && event.end > start`.
    /// Events that merely touch either boundary are excluded.
    pub fn events_in_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.start() < end && e.end() > start)
            .collect()
    }

    /// Whether any event occupies `instant` (`start <= instant < end`).
    pub fn is_busy_at(&self, instant: NaiveDateTime) -> bool {
        self.events.iter().any(|e| e.occupies(instant))
    }

    // ── ordering ────────────────────────────────────────────────────────

    fn insert_sorted(&mut self, event: Event) {
        let index = self
            .events
            .partition_point(|e| e.sort_key() <= event.sort_key());
        self.events.insert(index, event);
    }

    pub(crate) fn sort(&mut self) {
        self.events.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
