//! # calendar-engine
//!
//! In-memory engine for a single-user weekly calendar.
//!
//! Events are identified by `(subject, start, end)` and kept in a
//! [`Calendar`] ordered by start time. Weekly recurrences expand into
//! concrete occurrences that share a [`SeriesId`]; edits can target one
//! occurrence, an occurrence and everything after it, or a whole series, and
//! are applied all-or-nothing.
//!
//! ## Modules
//!
//! - [`event`]: the immutable [`Event`] and its value types
//! - [`recurrence`]: weekly expansion by count or until a date
//! - [`calendar`]: the ordered store and its queries
//! - [`edit`]: series-aware transactional edits
//! - [`format`]: the date and date-time literals shared with callers
//! - [`error`]: error types

pub mod calendar;
pub mod edit;
pub mod error;
pub mod event;
pub mod format;
pub mod recurrence;

pub use calendar::Calendar;
pub use edit::{EditProperty, EditRejection, EditRequest, EditScope};
pub use error::{CalendarError, Result};
pub use event::{Event, EventDraft, EventKey, Location, SeriesId, Status, DAY_END, DAY_START};
pub use format::{format_date, format_date_time, format_time, parse_date, parse_date_time};
pub use recurrence::{
    expand_by_count, expand_until, parse_weekdays, weekday_from_symbol, weekday_symbol,
    SeriesIdAllocator,
};
