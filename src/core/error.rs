//! Timeline errors.
//!
//! Only `EmptyInput` and `InvalidDate` are fatal (index build). `UnknownRide`
//! is recovered by the highlight layer, `OutOfRange` only reaches callers that
//! bypass the selector's clamping.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    #[error("ride list is empty, no timeline can be built")]
    EmptyInput,
    #[error("unknown ride: {0}")]
    UnknownRide(String),
    #[error("date {date} outside timeline [{first}, {last}]")]
    OutOfRange {
        date: NaiveDate,
        first: NaiveDate,
        last: NaiveDate,
    },
    #[error("ride {ride:?} has malformed date {value:?}")]
    InvalidDate { ride: String, value: String },
}

pub type Result<T> = std::result::Result<T, TimelineError>;
