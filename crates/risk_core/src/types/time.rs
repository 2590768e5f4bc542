//! Time types and day count conventions.
//!
//! This module provides:
//! - `Date`: type-safe date wrapper around `chrono::NaiveDate`
//! - `DayCountConvention`: year-fraction conventions for fixed income
//! - `CouponFrequency`: coupon schedule frequencies
//!
//! # Examples
//!
//! ```
//! use risk_core::types::time::{Date, DayCountConvention};
//!
//! let start = Date::from_ymd(2026, 1, 1).unwrap();
//! let end = Date::from_ymd(2026, 7, 1).unwrap();
//!
//! let yf = DayCountConvention::Act360.year_fraction(start, end);
//! assert!((yf - 181.0 / 360.0).abs() < 1e-12);
//! ```

use chrono::{Datelike, Local, Months, NaiveDate};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use super::error::DateError;

/// Type-safe date wrapper around `chrono::NaiveDate`.
///
/// Provides ISO 8601 serialisation and the date arithmetic the engine needs.
///
/// # Examples
///
/// ```
/// use risk_core::types::time::Date;
///
/// let date = Date::from_ymd(2026, 6, 15).unwrap();
/// assert_eq!(date.year(), 2026);
///
/// let parsed: Date = "2026-06-15".parse().unwrap();
/// assert_eq!(date, parsed);
///
/// let start = Date::from_ymd(2026, 1, 1).unwrap();
/// assert_eq!(date - start, 165);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a `Date` from year, month and day components.
    ///
    /// Returns `DateError::InvalidDate` for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or(DateError::InvalidDate { year, month, day })
    }

    /// Returns today's date based on local system time.
    ///
    /// Provided for host convenience; the engine itself never calls this,
    /// every calculation date comes in through its inputs.
    pub fn today() -> Self {
        Date(Local::now().date_naive())
    }

    /// Parses a date from an ISO 8601 string (`YYYY-MM-DD`).
    pub fn parse(s: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Date)
            .map_err(|e| DateError::ParseError(e.to_string()))
    }

    /// Returns the underlying `NaiveDate` for access to chrono's full API.
    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// Returns the year component.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Returns the date shifted backwards by a number of whole months.
    ///
    /// Day-of-month clamps to the end of shorter months, matching coupon
    /// schedule rolls (e.g. 31 Jul minus 1 month is 30 Jun).
    pub fn minus_months(&self, months: u32) -> Self {
        Date(self.0 - Months::new(months))
    }

    /// Returns the date shifted forwards by a number of whole months.
    pub fn plus_months(&self, months: u32) -> Self {
        Date(self.0 + Months::new(months))
    }
}

impl Sub for Date {
    type Output = i64;

    /// Returns the number of days between two dates (positive when `self`
    /// is the later date).
    fn sub(self, other: Self) -> i64 {
        (self.0 - other.0).num_days()
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, DateError> {
        Date::parse(s)
    }
}

impl fmt::Display for Date {
    /// Formats the date as ISO 8601 (`YYYY-MM-DD`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Day count convention (year fraction convention).
///
/// # Variants
/// - `Act365`: actual days / 365 (derivatives, UK gilts)
/// - `Act360`: actual days / 360 (money markets)
/// - `ActAct`: actual days / 365.25 (simplified ACT/ACT)
/// - `Thirty360`: 30/360 bond basis (US corporate bonds)
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DayCountConvention {
    /// Actual/365 Fixed: `actual_days / 365.0`
    Act365,
    /// Actual/360: `actual_days / 360.0`
    Act360,
    /// Simplified Actual/Actual: `actual_days / 365.25`
    ActAct,
    /// 30/360 bond basis: months count 30 days, years 360.
    Thirty360,
}

impl DayCountConvention {
    /// Computes the year fraction between two dates under this convention.
    ///
    /// Negative when `end` precedes `start`.
    pub fn year_fraction(&self, start: Date, end: Date) -> f64 {
        let days = (end - start) as f64;
        match self {
            DayCountConvention::Act365 => days / 365.0,
            DayCountConvention::Act360 => days / 360.0,
            DayCountConvention::ActAct => days / 365.25,
            DayCountConvention::Thirty360 => {
                let (y1, m1, d1) = (start.year(), start.month() as i64, start.day().min(30) as i64);
                let (y2, m2, d2) = (end.year(), end.month() as i64, end.day().min(30) as i64);
                (((y2 - y1) as i64 * 360 + (m2 - m1) * 30 + (d2 - d1)) as f64) / 360.0
            }
        }
    }
}

/// Coupon payment frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CouponFrequency {
    /// One coupon per year.
    Annual,
    /// Two coupons per year.
    SemiAnnual,
    /// Four coupons per year.
    Quarterly,
}

impl CouponFrequency {
    /// Number of coupon periods per year.
    pub fn per_year(&self) -> u32 {
        match self {
            CouponFrequency::Annual => 1,
            CouponFrequency::SemiAnnual => 2,
            CouponFrequency::Quarterly => 4,
        }
    }

    /// Number of whole months between consecutive coupons.
    pub fn months_between(&self) -> u32 {
        12 / self.per_year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_ymd_valid() {
        let d = Date::from_ymd(2026, 2, 28).unwrap();
        assert_eq!(d.year(), 2026);
        assert_eq!(d.month(), 2);
        assert_eq!(d.day(), 28);
    }

    #[test]
    fn test_from_ymd_invalid() {
        let result = Date::from_ymd(2026, 2, 30);
        assert_eq!(
            result.unwrap_err(),
            DateError::InvalidDate {
                year: 2026,
                month: 2,
                day: 30
            }
        );
    }

    #[test]
    fn test_parse_roundtrip() {
        let d = Date::parse("2026-06-15").unwrap();
        assert_eq!(d.to_string(), "2026-06-15");
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Date::parse("not-a-date").is_err());
    }

    #[test]
    fn test_day_difference() {
        let a = Date::from_ymd(2026, 1, 1).unwrap();
        let b = Date::from_ymd(2026, 1, 11).unwrap();
        assert_eq!(b - a, 10);
        assert_eq!(a - b, -10);
    }

    #[test]
    fn test_minus_months_clamps() {
        let d = Date::from_ymd(2026, 7, 31).unwrap();
        assert_eq!(d.minus_months(1), Date::from_ymd(2026, 6, 30).unwrap());
    }

    #[test]
    fn test_act365() {
        let a = Date::from_ymd(2026, 1, 1).unwrap();
        let b = Date::from_ymd(2027, 1, 1).unwrap();
        assert_relative_eq!(
            DayCountConvention::Act365.year_fraction(a, b),
            365.0 / 365.0
        );
    }

    #[test]
    fn test_act360() {
        let a = Date::from_ymd(2026, 1, 1).unwrap();
        let b = Date::from_ymd(2026, 7, 1).unwrap();
        assert_relative_eq!(
            DayCountConvention::Act360.year_fraction(a, b),
            181.0 / 360.0
        );
    }

    #[test]
    fn test_thirty360() {
        let a = Date::from_ymd(2026, 1, 15).unwrap();
        let b = Date::from_ymd(2026, 7, 15).unwrap();
        assert_relative_eq!(DayCountConvention::Thirty360.year_fraction(a, b), 0.5);
    }

    #[test]
    fn test_year_fraction_negative() {
        let a = Date::from_ymd(2026, 7, 1).unwrap();
        let b = Date::from_ymd(2026, 1, 1).unwrap();
        assert!(DayCountConvention::Act365.year_fraction(a, b) < 0.0);
    }

    #[test]
    fn test_coupon_frequency() {
        assert_eq!(CouponFrequency::SemiAnnual.per_year(), 2);
        assert_eq!(CouponFrequency::SemiAnnual.months_between(), 6);
        assert_eq!(CouponFrequency::Quarterly.months_between(), 3);
    }
}
