//! Calendar arithmetic: timestamps, month keys and quarters.
//!
//! Calendar fields are always read from the date as written in the source
//! record. Offsets on RFC 3339 timestamps are kept as-is, so a deal closed
//! on `2025-12-31T23:00:00-05:00` belongs to December.

use super::AnalysisError;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::str::FromStr;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Parse an ISO-8601 date or date-time.
///
/// Accepts `2025-12-01`, `2025-12-01T09:30:00` (fractional seconds allowed)
/// and RFC 3339 with an offset.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Parse a record timestamp, naming the record on failure.
pub fn record_timestamp(
    entity: &'static str,
    id: &str,
    raw: &str,
) -> Result<NaiveDateTime, AnalysisError> {
    parse_timestamp(raw).ok_or_else(|| AnalysisError::InvalidTimestamp {
        entity,
        id: id.to_string(),
        value: raw.to_string(),
    })
}

/// Fractional days from `from` to `to` (negative if `to` is earlier).
pub fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_milliseconds() as f64 / 86_400_000.0
}

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based month number.
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, AnalysisError> {
        if !(1..=12).contains(&month) {
            return Err(AnalysisError::InvalidMonth(format!("{}-{}", year, month)));
        }
        Ok(Self { year, month })
    }

    /// Month containing the given timestamp.
    pub fn of(dt: NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
        }
    }

    /// Quarter number 1..=4, i.e. `ceil(month / 3)`.
    pub fn quarter(&self) -> u32 {
        (self.month + 2) / 3
    }

    /// The month `n` months before this one.
    pub fn months_back(&self, n: u32) -> Self {
        let index = self.year * 12 + self.month as i32 - 1 - n as i32;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Same month, one year earlier.
    pub fn previous_year(&self) -> Self {
        Self {
            year: self.year - 1,
            month: self.month,
        }
    }

    /// Short English month name, e.g. `Aug`.
    pub fn label(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AnalysisError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

/// A calendar quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quarter {
    pub year: i32,
    /// Quarter number 1..=4.
    pub number: u32,
}

impl Quarter {
    pub fn new(year: i32, number: u32) -> Result<Self, AnalysisError> {
        if !(1..=4).contains(&number) {
            return Err(AnalysisError::InvalidPeriod(format!(
                "quarter must be between 1 and 4, got {}",
                number
            )));
        }
        Ok(Self { year, number })
    }

    /// The quarter before this one; Q1 rolls back to Q4 of the prior year.
    pub fn previous(&self) -> Self {
        if self.number == 1 {
            Self {
                year: self.year - 1,
                number: 4,
            }
        } else {
            Self {
                year: self.year,
                number: self.number - 1,
            }
        }
    }

    /// The three months of this quarter.
    pub fn months(&self) -> [YearMonth; 3] {
        let start = (self.number - 1) * 3 + 1;
        [0, 1, 2].map(|offset| YearMonth {
            year: self.year,
            month: start + offset,
        })
    }

    pub fn contains(&self, dt: NaiveDateTime) -> bool {
        let month = YearMonth::of(dt);
        month.year == self.year && month.quarter() == self.number
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Q{}", self.year, self.number)
    }
}

/// The fixed "now" every relative computation is measured against.
///
/// Reports are reproducible because nothing here reads the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingClock {
    /// Reference date for stale-deal and inactivity checks.
    pub anchor_date: NaiveDate,
    /// Quarter reported by the summary.
    pub quarter: Quarter,
    /// Last month of the six-month trend.
    pub trend_end: YearMonth,
}

impl ReportingClock {
    /// Anchor date at midnight.
    pub fn anchor(&self) -> NaiveDateTime {
        self.anchor_date.and_time(NaiveTime::MIN)
    }
}

impl Default for ReportingClock {
    fn default() -> Self {
        Self {
            anchor_date: NaiveDate::from_ymd_opt(2026, 2, 3).unwrap_or_default(),
            quarter: Quarter {
                year: 2026,
                number: 1,
            },
            trend_end: YearMonth {
                year: 2026,
                month: 1,
            },
        }
    }
}
