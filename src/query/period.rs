use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::Serialize;

use crate::date_util::{iso_week_monday, last_day_of_month, quarter_of};
use crate::error::{Error, Result};

static RE_WEEK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-W(\d{1,2})$").unwrap());
static RE_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})$").unwrap());

/// Symbolic time window a score is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Week,
    Month,
    Quarter,
    Year,
    All,
}

impl PeriodKind {
    /// Map a period name to a kind. Unrecognized names mean "all time".
    pub fn from_name(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "week" => PeriodKind::Week,
            "month" => PeriodKind::Month,
            "quarter" => PeriodKind::Quarter,
            "year" => PeriodKind::Year,
            _ => PeriodKind::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Week => "week",
            PeriodKind::Month => "month",
            PeriodKind::Quarter => "quarter",
            PeriodKind::Year => "year",
            PeriodKind::All => "all",
        }
    }
}

impl std::fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete bounds of a period. `None` on either side means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeriodRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl PeriodRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Both bounds, with an open side replaced by a far-past or far-future
    /// sentinel. Used by the "completed or still active in range" filter.
    pub fn closed_bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        let floor = NaiveDate::from_ymd_opt(1970, 1, 1)
            .map(|d| d.and_time(NaiveTime::MIN))
            .unwrap_or(NaiveDateTime::MIN);
        let ceiling = NaiveDate::from_ymd_opt(2099, 12, 31)
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .unwrap_or(NaiveDateTime::MAX);
        (self.start.unwrap_or(floor), self.end.unwrap_or(ceiling))
    }
}

/// A period request: the kind plus optional explicit week/year, resolved
/// against an explicit reference time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodQuery {
    pub kind: PeriodKind,
    pub week: Option<u32>,
    pub year: Option<i32>,
    pub as_of: NaiveDateTime,
}

impl PeriodQuery {
    /// A query resolved against the current local time.
    pub fn new(kind: PeriodKind) -> Self {
        Self::as_of(kind, chrono::Local::now().naive_local())
    }

    pub fn as_of(kind: PeriodKind, as_of: NaiveDateTime) -> Self {
        Self {
            kind,
            week: None,
            year: None,
            as_of,
        }
    }

    pub fn with_week(mut self, week: Option<u32>) -> Self {
        self.week = week;
        self
    }

    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    /// Parse a textual period.
    ///
    /// Supported formats:
    /// - `week`, `month`, `quarter`, `year`, `all` — relative to `as_of`
    /// - `2025` — that calendar year
    /// - `2025-W05` — that ISO week
    pub fn parse(s: &str, as_of: NaiveDateTime) -> Result<Self> {
        let s = s.trim();

        match s.to_lowercase().as_str() {
            "week" | "month" | "quarter" | "year" | "all" => {
                return Ok(Self::as_of(PeriodKind::from_name(s), as_of));
            }
            _ => {}
        }

        if let Some(caps) = RE_YEAR.captures(s) {
            let year: i32 = caps[1].parse().unwrap();
            return Ok(Self::as_of(PeriodKind::Year, as_of).with_year(Some(year)));
        }

        if let Some(caps) = RE_WEEK.captures(s) {
            let year: i32 = caps[1].parse().unwrap();
            let week: u32 = caps[2].parse().unwrap();
            if (1..=53).contains(&week) {
                return Ok(Self::as_of(PeriodKind::Week, as_of)
                    .with_week(Some(week))
                    .with_year(Some(year)));
            }
        }

        Err(Error::PeriodParse(format!("unrecognized period: {s}")))
    }

    /// The week/year a week-kind query resolves to. Missing values come from
    /// the ISO week of `as_of`; an explicit week without a year uses the
    /// calendar year of `as_of`.
    pub fn week_and_year(&self) -> (u32, i32) {
        let iso = self.as_of.date().iso_week();
        match (self.week, self.year) {
            (Some(w), Some(y)) => (w, y),
            (Some(w), None) => (w, self.as_of.year()),
            (None, Some(y)) => (iso.week(), y),
            (None, None) => (iso.week(), iso.year()),
        }
    }

    /// Resolve to concrete bounds.
    ///
    /// `month` and `quarter` always describe the month/quarter containing
    /// `as_of`; an explicit week or year does not move them.
    pub fn resolve(&self) -> Result<PeriodRange> {
        let range = match self.kind {
            PeriodKind::Week => {
                let (week, year) = self.week_and_year();
                let monday = iso_week_monday(year, week as i64).ok_or_else(|| {
                    Error::PeriodParse(format!("week {week} of {year} is out of range"))
                })?;
                day_span(monday, monday + Duration::days(6))
            }
            PeriodKind::Month => {
                let today = self.as_of.date();
                let first = today.with_day(1).unwrap_or(today);
                let last = last_day_of_month(today.year(), today.month()).unwrap_or(today);
                day_span(first, last)
            }
            PeriodKind::Quarter => {
                let today = self.as_of.date();
                let q = quarter_of(today) as u32;
                let start_month = (q - 1) * 3 + 1;
                let first = NaiveDate::from_ymd_opt(today.year(), start_month, 1).unwrap_or(today);
                let last = last_day_of_month(today.year(), start_month + 2).unwrap_or(today);
                day_span(first, last)
            }
            PeriodKind::Year => {
                let year = self.year.unwrap_or_else(|| self.as_of.year());
                let first = NaiveDate::from_ymd_opt(year, 1, 1);
                let last = NaiveDate::from_ymd_opt(year, 12, 31);
                match (first, last) {
                    (Some(first), Some(last)) => day_span(first, last),
                    _ => return Err(Error::PeriodParse(format!("year {year} is out of range"))),
                }
            }
            PeriodKind::All => PeriodRange::unbounded(),
        };
        log::trace!("resolved {} period to {:?}", self.kind, range);
        Ok(range)
    }
}

/// 00:00:00 on `first` through 23:59:59 on `last`.
fn day_span(first: NaiveDate, last: NaiveDate) -> PeriodRange {
    let end = last
        .and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| last.and_time(NaiveTime::MIN));
    PeriodRange::new(first.and_time(NaiveTime::MIN), end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_kind_from_name() {
        assert_eq!(PeriodKind::from_name("week"), PeriodKind::Week);
        assert_eq!(PeriodKind::from_name("Month"), PeriodKind::Month);
        assert_eq!(PeriodKind::from_name("quarter"), PeriodKind::Quarter);
        assert_eq!(PeriodKind::from_name("year"), PeriodKind::Year);
        assert_eq!(PeriodKind::from_name("all"), PeriodKind::All);
        assert_eq!(PeriodKind::from_name("fortnight"), PeriodKind::All);
    }

    #[test]
    fn test_parse_keywords() {
        let now = at("2025-03-05 12:00:00");
        let q = PeriodQuery::parse("quarter", now).unwrap();
        assert_eq!(q.kind, PeriodKind::Quarter);
        assert_eq!(q.as_of, now);
    }

    #[test]
    fn test_parse_year_and_week() {
        let now = at("2025-03-05 12:00:00");
        let y = PeriodQuery::parse("2024", now).unwrap();
        assert_eq!((y.kind, y.year), (PeriodKind::Year, Some(2024)));

        let w = PeriodQuery::parse("2025-W10", now).unwrap();
        assert_eq!(w.kind, PeriodKind::Week);
        assert_eq!(w.week_and_year(), (10, 2025));
    }

    #[test]
    fn test_parse_invalid() {
        let now = at("2025-03-05 12:00:00");
        assert!(PeriodQuery::parse("garbage", now).is_err());
        assert!(PeriodQuery::parse("2025-W60", now).is_err());
    }

    #[test]
    fn test_week_range() {
        let q = PeriodQuery::as_of(PeriodKind::Week, at("2025-01-01 00:00:00"))
            .with_week(Some(10))
            .with_year(Some(2025));
        let range = q.resolve().unwrap();
        assert_eq!(range.start, Some(at("2025-03-03 00:00:00")));
        assert_eq!(range.end, Some(at("2025-03-09 23:59:59")));
        assert_eq!(range.start.unwrap().weekday(), Weekday::Mon);
    }

    #[test]
    fn test_week_defaults_to_as_of_iso_week() {
        // 2027-01-01 is a Friday in ISO week 53 of 2026.
        let q = PeriodQuery::as_of(PeriodKind::Week, at("2027-01-01 09:00:00"));
        assert_eq!(q.week_and_year(), (53, 2026));
        let range = q.resolve().unwrap();
        assert_eq!(range.start, Some(at("2026-12-28 00:00:00")));
        assert_eq!(range.end, Some(at("2027-01-03 23:59:59")));
    }

    #[test]
    fn test_invalid_week_rolls_over() {
        let q = PeriodQuery::as_of(PeriodKind::Week, at("2025-06-01 00:00:00"))
            .with_week(Some(54))
            .with_year(Some(2025));
        let range = q.resolve().unwrap();
        // 2025 has 52 ISO weeks, so week 54 is 2026-W02.
        assert_eq!(range.start, Some(at("2026-01-05 00:00:00")));
    }

    #[test]
    fn test_month_range_uses_as_of() {
        let q = PeriodQuery::as_of(PeriodKind::Month, at("2024-02-14 10:00:00"))
            .with_year(Some(2020));
        let range = q.resolve().unwrap();
        assert_eq!(range.start, Some(at("2024-02-01 00:00:00")));
        assert_eq!(range.end, Some(at("2024-02-29 23:59:59")));
    }

    #[test]
    fn test_quarter_range() {
        let range = PeriodQuery::as_of(PeriodKind::Quarter, at("2025-08-20 10:00:00"))
            .resolve()
            .unwrap();
        assert_eq!(range.start, Some(at("2025-07-01 00:00:00")));
        assert_eq!(range.end, Some(at("2025-09-30 23:59:59")));

        let range = PeriodQuery::as_of(PeriodKind::Quarter, at("2025-12-31 23:00:00"))
            .resolve()
            .unwrap();
        assert_eq!(range.start, Some(at("2025-10-01 00:00:00")));
        assert_eq!(range.end, Some(at("2025-12-31 23:59:59")));
    }

    #[test]
    fn test_year_range() {
        let range = PeriodQuery::as_of(PeriodKind::Year, at("2025-08-20 10:00:00"))
            .with_year(Some(2023))
            .resolve()
            .unwrap();
        assert_eq!(range.start, Some(at("2023-01-01 00:00:00")));
        assert_eq!(range.end, Some(at("2023-12-31 23:59:59")));

        let range = PeriodQuery::as_of(PeriodKind::Year, at("2025-08-20 10:00:00"))
            .resolve()
            .unwrap();
        assert_eq!(range.start, Some(at("2025-01-01 00:00:00")));
    }

    #[test]
    fn test_all_is_unbounded() {
        let range = PeriodQuery::as_of(PeriodKind::All, at("2025-08-20 10:00:00"))
            .resolve()
            .unwrap();
        assert!(range.is_unbounded());
        assert_eq!(range.start, None);
        assert_eq!(range.end, None);
    }

    #[test]
    fn test_closed_bounds_fill_open_side() {
        let (s, e) = PeriodRange::unbounded().closed_bounds();
        assert_eq!(s, at("1970-01-01 00:00:00"));
        assert_eq!(e, at("2099-12-31 23:59:59"));
    }
}
