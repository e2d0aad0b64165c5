//! Error types for calendar-engine operations.

use thiserror::Error;

/// Hard failures: the caller handed the engine structurally invalid input.
///
/// Ordinary business outcomes (duplicates, lookups that find nothing, rejected
/// edits) are never reported through this type; they surface as `false`,
/// `None`, or an [`EditRejection`](crate::edit::EditRejection).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid value for {property}: {value:?}")]
    InvalidValue { property: String, value: String },

    #[error("Series request produces no occurrences")]
    NoOccurrences,
}

impl CalendarError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_value(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            property: property.into(),
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CalendarError>;
