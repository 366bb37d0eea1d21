//! Reporting windows.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use storefront_core::{DomainError, DomainResult};

/// Days covered when a report is requested without explicit dates.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Inclusive calendar-date window, evaluated in UTC.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Rejects inverted windows, and windows whose day after `end` is not a
    /// representable date.
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if start > end {
            return Err(DomainError::validation("start_date must not be after end_date"));
        }
        if end.succ_opt().is_none() {
            return Err(DomainError::validation("end_date is out of range"));
        }
        Ok(Self { start, end })
    }

    /// Build from optional `YYYY-MM-DD` query values.
    ///
    /// A missing end means today; a missing start means `DEFAULT_WINDOW_DAYS`
    /// before the end.
    pub fn from_query(start: Option<&str>, end: Option<&str>, now: DateTime<Utc>) -> DomainResult<Self> {
        let end = match end {
            Some(s) => parse_date("end_date", s)?,
            None => now.date_naive(),
        };
        let start = match start {
            Some(s) => parse_date("start_date", s)?,
            None => end
                .checked_sub_signed(Duration::days(DEFAULT_WINDOW_DAYS))
                .ok_or_else(|| DomainError::validation("end_date is out of range"))?,
        };
        Self::new(start, end)
    }

    /// A listing filter from optional `YYYY-MM-DD` bounds. `None` when both
    /// are absent; a missing side is open-ended.
    pub fn bounded(start: Option<&str>, end: Option<&str>) -> DomainResult<Option<Self>> {
        if start.is_none() && end.is_none() {
            return Ok(None);
        }
        let start = match start {
            Some(s) => parse_date("start_date", s)?,
            None => ymd(1900, 1, 1)?,
        };
        let end = match end {
            Some(s) => parse_date("end_date", s)?,
            None => ymd(9999, 12, 31)?,
        };
        Self::new(start, end).map(Some)
    }

    /// A full calendar year.
    pub fn year(year: i32) -> DomainResult<Self> {
        let start = ymd(year, 1, 1)?;
        let end = ymd(year, 12, 31)?;
        Self::new(start, end)
    }

    /// A calendar quarter with fixed boundaries (Q1 Jan–Mar ... Q4 Oct–Dec).
    pub fn quarter(year: i32, quarter: u32) -> DomainResult<Self> {
        let (start, end) = match quarter {
            1 => ((1, 1), (3, 31)),
            2 => ((4, 1), (6, 30)),
            3 => ((7, 1), (9, 30)),
            4 => ((10, 1), (12, 31)),
            _ => return Err(DomainError::validation("quarter must be between 1 and 4")),
        };
        Self::new(ymd(year, start.0, start.1)?, ymd(year, end.0, end.1)?)
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.contains_date(at.date_naive())
    }

    /// First instant inside the window.
    pub fn start_instant(&self) -> DateTime<Utc> {
        self.start.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// First instant after the window. Saturates at the last representable
    /// day, which `new` never admits as `end`.
    pub fn end_instant_exclusive(&self) -> DateTime<Utc> {
        self.end
            .succ_opt()
            .unwrap_or(NaiveDate::MAX)
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
    }
}

/// Parse a `YYYY-MM-DD` value, naming `field` in the error.
pub fn parse_date(field: &str, raw: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::validation(format!("{field} must be a date in YYYY-MM-DD format")))
}

fn ymd(year: i32, month: u32, day: u32) -> DomainResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DomainError::validation(format!("year {year} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn default_window_is_last_thirty_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 15, 0, 0).unwrap();
        let r = DateRange::from_query(None, None, now).unwrap();
        assert_eq!(r.end, d(2024, 3, 31));
        assert_eq!(r.start, d(2024, 3, 1));
    }

    #[test]
    fn end_day_is_inclusive() {
        let r = DateRange::from_query(Some("2024-01-01"), Some("2024-01-31"), Utc::now()).unwrap();
        assert!(r.contains(Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap()));
        assert!(!r.contains(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()));
        assert_eq!(r.end_instant_exclusive(), Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn inverted_and_malformed_ranges_are_rejected() {
        assert!(DateRange::from_query(Some("2024-02-01"), Some("2024-01-01"), Utc::now()).is_err());
        assert!(DateRange::from_query(Some("01/02/2024"), None, Utc::now()).is_err());
    }

    #[test]
    fn bounded_filter_is_open_ended_on_missing_side() {
        assert_eq!(DateRange::bounded(None, None).unwrap(), None);
        let r = DateRange::bounded(Some("2024-03-01"), None).unwrap().unwrap();
        assert!(r.contains_date(d(2030, 1, 1)));
        assert!(!r.contains_date(d(2024, 2, 29)));
        let r = DateRange::bounded(None, Some("2024-03-01")).unwrap().unwrap();
        assert!(r.contains_date(d(2001, 1, 1)));
        assert!(DateRange::bounded(Some("2024-03-02"), Some("2024-03-01")).is_err());
    }

    #[test]
    fn quarters_have_fixed_boundaries() {
        let q1 = DateRange::quarter(2024, 1).unwrap();
        assert_eq!((q1.start, q1.end), (d(2024, 1, 1), d(2024, 3, 31)));
        let q4 = DateRange::quarter(2023, 4).unwrap();
        assert_eq!((q4.start, q4.end), (d(2023, 10, 1), d(2023, 12, 31)));
        assert!(DateRange::quarter(2024, 5).is_err());
    }

    #[test]
    fn default_start_before_earliest_date_is_rejected() {
        let near_min = (NaiveDate::MIN + Duration::days(4)).format("%Y-%m-%d").to_string();
        let err = DateRange::from_query(None, Some(&near_min), Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::validation("end_date is out of range"));
    }

    #[test]
    fn last_representable_year_is_rejected() {
        let last = NaiveDate::MAX.year();
        assert!(DateRange::year(last).is_err());
        assert!(DateRange::quarter(last, 4).is_err());
        let r = DateRange::year(last - 1).unwrap();
        assert_eq!(r.end_instant_exclusive().date_naive(), d(last, 1, 1));
    }

    #[test]
    fn leap_day_falls_inside_q1_and_year() {
        let leap = d(2024, 2, 29);
        assert!(DateRange::quarter(2024, 1).unwrap().contains_date(leap));
        assert!(DateRange::year(2024).unwrap().contains_date(leap));
    }
}
