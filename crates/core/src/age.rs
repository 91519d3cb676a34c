//! Age computation against a frozen reference instant.
//!
//! Ages are measured against one instant captured when the store is created,
//! not against the wall clock at query time. Age filters therefore give the
//! same answer for the whole lifetime of a process.

use chrono::{DateTime, Datelike, Utc};

/// The fixed "now" used for every age computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceInstant(DateTime<Utc>);

impl ReferenceInstant {
    /// Capture the current time.
    pub fn now() -> Self {
        ReferenceInstant(Utc::now())
    }

    /// Build from epoch seconds; `None` if outside the calendar range.
    pub fn from_epoch_seconds(secs: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp(secs, 0).map(ReferenceInstant)
    }

    /// Epoch seconds of the reference instant.
    pub fn epoch_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    /// Whole calendar years between `birth_date` (epoch seconds) and the
    /// reference instant, in UTC.
    ///
    /// Returns `None` when `birth_date` is outside the calendar range.
    pub fn age_of(&self, birth_date: i64) -> Option<i64> {
        let born = DateTime::<Utc>::from_timestamp(birth_date, 0)?;
        let mut years = i64::from(self.0.year()) - i64::from(born.year());
        if (born.month(), born.day()) > (self.0.month(), self.0.day()) {
            years -= 1;
        }
        Some(years)
    }
}

/// True if `birth_date` can be placed on the calendar.
pub fn representable(birth_date: i64) -> bool {
    DateTime::<Utc>::from_timestamp(birth_date, 0).is_some()
}
