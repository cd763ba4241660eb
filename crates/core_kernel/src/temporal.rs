//! Billing calendar types
//!
//! This module provides the date handling used by invoicing:
//! - Billing periods: the inclusive date range an invoice covers
//! - Fiscal years: the `YYYY-YYYY` span printed in invoice numbers
//! - Timezone: the jurisdiction used to resolve "today" for issue dates

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: end {end} precedes start {start}")]
    InvalidPeriod {
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Invalid fiscal year start month: {0}")]
    InvalidFiscalStartMonth(u32),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Timezone wrapper for the billing jurisdiction
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Timezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s.trim())
            .map(Timezone)
            .map_err(|_| TemporalError::UnknownTimezone(s.to_string()))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Returns the current calendar date in this timezone
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.0).date_naive()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::Asia::Kolkata)
    }
}

/// The inclusive date range covered by one invoice
///
/// A single-day period (start == end) is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    /// First day covered (inclusive)
    pub start: NaiveDate,
    /// Last day covered (inclusive)
    pub end: NaiveDate,
}

impl BillingPeriod {
    /// Creates a new billing period
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeriod` if `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        let period = Self { start, end };
        period.validate()?;
        Ok(period)
    }

    /// Creates the period spanning the whole calendar month of `date`
    pub fn calendar_month(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let next_month = if date.month() == 12 {
            NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
        };
        let end = next_month
            .and_then(|d| d.pred_opt())
            .unwrap_or(date);
        Self { start, end }
    }

    /// Re-checks the ordering invariant
    ///
    /// Periods can be deserialized without going through [`BillingPeriod::new`],
    /// so consumers validate before relying on the ordering.
    pub fn validate(&self) -> Result<(), TemporalError> {
        if self.end < self.start {
            return Err(TemporalError::InvalidPeriod {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Checks if a date falls within the period
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days covered, counting both ends
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%d/%m/%Y"),
            self.end.format("%d/%m/%Y")
        )
    }
}

/// A fiscal year identified by the calendar year it starts in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FiscalYear {
    start_year: i32,
}

impl FiscalYear {
    /// Returns the fiscal year containing `date`
    ///
    /// # Arguments
    ///
    /// * `date` - Any date inside the fiscal year
    /// * `start_month` - Month (1-12) the fiscal year begins in; 4 for the
    ///   April-March year
    pub fn containing(date: NaiveDate, start_month: u32) -> Result<Self, TemporalError> {
        if !(1..=12).contains(&start_month) {
            return Err(TemporalError::InvalidFiscalStartMonth(start_month));
        }

        let start_year = if date.month() >= start_month {
            date.year()
        } else {
            date.year() - 1
        };
        Ok(Self { start_year })
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.start_year + 1
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_year, self.end_year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_rejects_reversed_range() {
        let err = BillingPeriod::new(date(2024, 5, 31), date(2024, 5, 1)).unwrap_err();
        assert!(matches!(err, TemporalError::InvalidPeriod { .. }));
        assert!(BillingPeriod::new(date(2024, 5, 1), date(2024, 5, 1)).is_ok());
    }

    #[test]
    fn test_calendar_month() {
        let feb = BillingPeriod::calendar_month(date(2024, 2, 17));
        assert_eq!(feb.start, date(2024, 2, 1));
        assert_eq!(feb.end, date(2024, 2, 29));

        let dec = BillingPeriod::calendar_month(date(2023, 12, 5));
        assert_eq!(dec.end, date(2023, 12, 31));
        assert_eq!(dec.days(), 31);
    }

    #[test]
    fn test_fiscal_year_span() {
        assert_eq!(FiscalYear::containing(date(2024, 4, 1), 4).unwrap().to_string(), "2024-2025");
        assert_eq!(FiscalYear::containing(date(2024, 3, 31), 4).unwrap().to_string(), "2023-2024");
        assert_eq!(FiscalYear::containing(date(2024, 1, 15), 1).unwrap().to_string(), "2024-2025");
        assert!(FiscalYear::containing(date(2024, 1, 15), 13).is_err());
    }

    #[test]
    fn test_timezone_parse() {
        let tz: Timezone = "Asia/Kolkata".parse().unwrap();
        assert_eq!(tz, Timezone::default());
        assert!("Mars/Olympus".parse::<Timezone>().is_err());
    }
}
