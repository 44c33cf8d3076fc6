//! Calendar-day helpers shared by the conflict builder, the balance
//! validator and the statistics aggregator.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Inclusive `[from, to]` window of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.from.iter_days().take_while(move |d| *d <= self.to)
    }
}

/// Every calendar day from `from` to `to`, both ends included.
/// An inverted range yields nothing.
pub fn expand_inclusive(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    if to < from {
        warn!(%from, %to, "Ignoring inverted date range");
        return Vec::new();
    }
    DateRange::new(from, to).days().collect()
}

/// Monday to Friday inside `[from, to]`, independent of any work schedule.
pub fn count_weekdays(from: NaiveDate, to: NaiveDate) -> i64 {
    if to < from {
        return 0;
    }
    DateRange::new(from, to)
        .days()
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as i64
}

/// January 1st of the year `date` belongs to.
pub fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}
