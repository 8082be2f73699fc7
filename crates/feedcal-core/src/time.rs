//! Entry times and query ranges, plus the timestamp shapes the feeds use.
//!
//! `gd:when` carries either a full timestamp or a bare date for all-day
//! entries; [`EventTime`] keeps that distinction. Query parameters use a
//! second-precision form, entry bodies a millisecond one.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Day-only wire format used for all-day entries.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Start or end of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// An instant, normalized to UTC.
    DateTime(DateTime<Utc>),
    /// A calendar day with no time of day.
    AllDay(NaiveDate),
}

impl EventTime {
    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        Self::DateTime(instant)
    }

    pub fn from_date(day: NaiveDate) -> Self {
        Self::AllDay(day)
    }

    /// Reads `YYYY-MM-DD` or an RFC 3339 timestamp. Offsets are folded into UTC.
    pub fn parse_wire(value: &str) -> Option<Self> {
        let value = value.trim();
        match NaiveDate::parse_from_str(value, DATE_FORMAT) {
            Ok(day) => Some(Self::AllDay(day)),
            Err(_) => DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|stamped| Self::DateTime(stamped.to_utc())),
        }
    }

    /// The `gd:when` attribute form.
    pub fn to_wire(&self) -> String {
        match *self {
            Self::AllDay(day) => day.format(DATE_FORMAT).to_string(),
            Self::DateTime(instant) => format_entry_timestamp(instant),
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// The instant this time stands for; all-day values map to UTC midnight.
    pub fn to_utc_datetime(&self) -> DateTime<Utc> {
        match *self {
            Self::AllDay(day) => day.and_time(NaiveTime::MIN).and_utc(),
            Self::DateTime(instant) => instant,
        }
    }
}

impl Ord for EventTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_utc_datetime().cmp(&other.to_utc_datetime())
    }
}

impl PartialOrd for EventTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `2007-04-17T15:00:00.000Z`
pub fn format_entry_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `2007-04-17T15:00:00Z`
pub fn format_query_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// A `[start, end)` range for `start-min` / `start-max` queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// `None` when `end` precedes `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        if end < start {
            return None;
        }
        Some(Self { start, end })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        (self.start..self.end).contains(&instant)
    }
}
