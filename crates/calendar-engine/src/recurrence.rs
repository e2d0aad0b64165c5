//! Weekly recurrence expansion.
//!
//! A series request names a first date, a time-of-day window and a set of
//! weekdays. Expansion walks forward one week at a time from the first date
//! and emits, for each requested weekday in the order given, the next date on
//! or after the week cursor that falls on that weekday.
//!
//! The walk emits weekdays in request order within each week, so the raw
//! sequence can be out of date order (e.g. `{W, M}`); both expanders return
//! their output sorted by start.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};

use crate::error::{CalendarError, Result};
use crate::event::{Event, EventDraft, SeriesId};

// ── Weekday symbols ─────────────────────────────────────────────────────────

/// Map a single-letter weekday code (`M T W R F S U`) to a weekday.
pub fn weekday_from_symbol(symbol: char) -> Option<Weekday> {
    match symbol {
        'M' => Some(Weekday::Mon),
        'T' => Some(Weekday::Tue),
        'W' => Some(Weekday::Wed),
        'R' => Some(Weekday::Thu),
        'F' => Some(Weekday::Fri),
        'S' => Some(Weekday::Sat),
        'U' => Some(Weekday::Sun),
        _ => None,
    }
}

pub fn weekday_symbol(weekday: Weekday) -> char {
    match weekday {
        Weekday::Mon => 'M',
        Weekday::Tue => 'T',
        Weekday::Wed => 'W',
        Weekday::Thu => 'R',
        Weekday::Fri => 'F',
        Weekday::Sat => 'S',
        Weekday::Sun => 'U',
    }
}

/// Parse a string of weekday codes such as `"MWF"`. Returns `None` for an
/// empty string or any unknown code.
pub fn parse_weekdays(symbols: &str) -> Option<Vec<Weekday>> {
    if symbols.is_empty() {
        return None;
    }
    symbols.chars().map(weekday_from_symbol).collect()
}

// ── Series id allocation ────────────────────────────────────────────────────

/// Hands out series ids for one calendar. Ids are never reused.
#[derive(Debug, Clone)]
pub struct SeriesIdAllocator {
    next: u64,
}

impl Default for SeriesIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl SeriesIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> SeriesId {
        let id = SeriesId::from(self.next);
        self.next += 1;
        id
    }
}

// ── expand_by_count ─────────────────────────────────────────────────────────

/// Expand a series into exactly `count` occurrences.
///
/// A fresh [`SeriesId`] is taken from `ids` once the arguments have been
/// validated; failed calls do not consume an id. A weekday repeated in
/// `weekdays` is only used once.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidArgument`] if `weekdays` is empty, `count`
/// is zero, the subject is blank, the draft's time window is not a
/// same-day, non-negative interval, or the series would run past the last
/// representable date.
pub fn expand_by_count(
    draft: &EventDraft,
    weekdays: &[Weekday],
    count: u32,
    ids: &mut SeriesIdAllocator,
) -> Result<Vec<Event>> {
    let weekdays = normalize_weekdays(weekdays)?;
    if count == 0 {
        return Err(CalendarError::invalid_argument(
            "occurrence count must be positive",
        ));
    }
    let (start, end) = series_window(draft)?;
    let weeks = u64::from(count).div_ceil(weekdays.len() as u64) - 1;
    start
        .date()
        .checked_add_days(Days::new(weeks * 7))
        .ok_or_else(out_of_range)?;

    let series_id = ids.allocate();
    let mut occurrences = Vec::new();
    let mut cursor = start.date();

    'weeks: loop {
        for &weekday in &weekdays {
            let date = next_or_same(cursor, weekday).ok_or_else(out_of_range)?;
            occurrences.push(Event::occurrence(
                draft,
                date,
                start.time(),
                end.time(),
                series_id,
            )?);
            if occurrences.len() == count as usize {
                break 'weeks;
            }
        }
        cursor = cursor.checked_add_days(Days::new(7)).ok_or_else(out_of_range)?;
    }

    occurrences.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    tracing::debug!(
        subject = %draft.subject,
        count,
        series_id = %series_id,
        "expanded series by count"
    );
    Ok(occurrences)
}

// ── expand_until ────────────────────────────────────────────────────────────

/// Expand a series through `last_date` inclusive.
///
/// # Errors
///
/// Returns [`CalendarError::NoOccurrences`] when no requested weekday falls
/// between the start date and `last_date`, and the same
/// [`CalendarError::InvalidArgument`] cases as [`expand_by_count`].
pub fn expand_until(
    draft: &EventDraft,
    weekdays: &[Weekday],
    last_date: NaiveDate,
    ids: &mut SeriesIdAllocator,
) -> Result<Vec<Event>> {
    let weekdays = normalize_weekdays(weekdays)?;
    series_window(draft)?;
    let count = count_until(draft.start.date(), &weekdays, last_date);
    if count == 0 {
        tracing::debug!(subject = %draft.subject, %last_date, "series has no occurrences");
        return Err(CalendarError::NoOccurrences);
    }
    let count = u32::try_from(count)
        .map_err(|_| CalendarError::invalid_argument("series is too long"))?;
    expand_by_count(draft, &weekdays, count, ids)
}

/// Number of occurrences the weekly walk produces between `first` and
/// `last_date` inclusive.
fn count_until(first: NaiveDate, weekdays: &[Weekday], last_date: NaiveDate) -> usize {
    let mut count = 0;
    let mut cursor = first;
    while cursor <= last_date {
        count += weekdays
            .iter()
            .filter(|&&weekday| next_or_same(cursor, weekday).is_some_and(|d| d <= last_date))
            .count();
        match cursor.checked_add_days(Days::new(7)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    count
}

// ── Internal helpers ────────────────────────────────────────────────────────

/// The first date on or after `from` that falls on `weekday`, or `None` past
/// the last representable date.
fn next_or_same(from: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let ahead = (7 + weekday.num_days_from_monday() - from.weekday().num_days_from_monday()) % 7;
    from.checked_add_days(Days::new(u64::from(ahead)))
}

fn out_of_range() -> CalendarError {
    CalendarError::invalid_argument("series runs past the supported date range")
}

fn normalize_weekdays(weekdays: &[Weekday]) -> Result<Vec<Weekday>> {
    if weekdays.is_empty() {
        return Err(CalendarError::invalid_argument(
            "a series needs at least one weekday",
        ));
    }
    let mut unique = Vec::with_capacity(weekdays.len());
    for &weekday in weekdays {
        if !unique.contains(&weekday) {
            unique.push(weekday);
        }
    }
    Ok(unique)
}

/// Effective start/end of the first occurrence, checked against the
/// single-date rule for series members.
fn series_window(draft: &EventDraft) -> Result<(NaiveDateTime, NaiveDateTime)> {
    if draft.subject.trim().is_empty() {
        return Err(CalendarError::invalid_argument("subject must not be empty"));
    }
    let (start, end) = draft.bounds();
    if start.date() != end.date() {
        return Err(CalendarError::invalid_argument(
            "series occurrences must start and end on the same date",
        ));
    }
    if end < start {
        return Err(CalendarError::invalid_argument(format!(
            "end {end} precedes start {start}"
        )));
    }
    Ok((start, end))
}

// ── Tests ───────────────────────────────────────────────────────────────────
