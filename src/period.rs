use crate::error::{Error, Result};
use chrono::{Days, Months, NaiveDate};
use serde::Serialize;

/// Longest span accepted by [`Period::new`].
pub const MAX_SPAN_MONTHS: u32 = 120;

/// An inclusive date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidPeriod {
                start,
                end,
                reason: "start date is after end date",
            });
        }
        if let Some(limit) = start.checked_add_months(Months::new(MAX_SPAN_MONTHS)) {
            if end > limit {
                return Err(Error::InvalidPeriod {
                    start,
                    end,
                    reason: "period spans more than 10 years",
                });
            }
        }
        if checked_previous(start, end).is_none() {
            return Err(Error::InvalidPeriod {
                start,
                end,
                reason: "no preceding period fits in the calendar",
            });
        }
        Ok(Self { start, end })
    }

    /// Parse two ISO `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_iso(start)?, parse_iso(end)?)
    }

    /// `end - start` in whole days; a single-day period has zero duration.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The equal-length period ending the day before this one starts.
    pub fn previous(&self) -> Self {
        let (start, end) = previous_period(self.start, self.end);
        Self { start, end }
    }
}

fn parse_iso(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_string()))
}

/// Resolve the period immediately preceding `start..=end` with the same
/// duration: `(start - duration - 1 day, start - 1 day)`.
///
/// Callers are expected to pass `start <= end`. Dates that would fall before
/// the calendar minimum clamp to `NaiveDate::MIN`; [`Period::new`] never lets
/// such a period through.
pub fn previous_period(start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    checked_previous(start, end).unwrap_or_else(|| {
        let previous_end = start.checked_sub_days(Days::new(1)).unwrap_or(NaiveDate::MIN);
        (NaiveDate::MIN, previous_end)
    })
}

fn checked_previous(start: NaiveDate, end: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let duration = (end - start).num_days().unsigned_abs();
    let previous_end = start.checked_sub_days(Days::new(1))?;
    let previous_start = previous_end.checked_sub_days(Days::new(duration))?;
    Some((previous_start, previous_end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_window_maps_to_preceding_window() {
        let (ps, pe) = previous_period(d(2024, 3, 1), d(2024, 3, 31));
        assert_eq!(pe, d(2024, 2, 29));
        assert_eq!(ps, d(2024, 1, 30));
    }

    #[test]
    fn single_day_maps_to_day_before() {
        let (ps, pe) = previous_period(d(2024, 1, 1), d(2024, 1, 1));
        assert_eq!((ps, pe), (d(2023, 12, 31), d(2023, 12, 31)));
    }

    #[test]
    fn rejects_inverted_and_oversized_periods() {
        assert!(matches!(
            Period::new(d(2024, 2, 1), d(2024, 1, 1)),
            Err(Error::InvalidPeriod { .. })
        ));
        assert!(Period::new(d(2010, 1, 1), d(2020, 1, 1)).is_ok());
        assert!(Period::new(d(2010, 1, 1), d(2020, 1, 2)).is_err());
    }

    #[test]
    fn parses_iso_strings() {
        let p = Period::parse("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(p.days(), 30);
        assert!(p.contains(d(2024, 1, 31)));
        assert!(!p.contains(d(2024, 2, 1)));
        assert!(matches!(
            Period::parse("2024-13-01", "2024-12-31"),
            Err(Error::InvalidDate(_))
        ));
    }

    #[test]
    fn rejects_periods_without_a_preceding_window() {
        let floor = NaiveDate::MIN;
        assert!(matches!(
            Period::new(floor, floor + Days::new(4)),
            Err(Error::InvalidPeriod { .. })
        ));
        assert!(Period::parse("-262143-01-01", "-262143-01-05").is_err());

        // the earliest period that still has a predecessor
        let first = Period::new(floor + Days::new(5), floor + Days::new(9)).unwrap();
        assert_eq!(first.previous(), Period { start: floor, end: floor + Days::new(4) });
    }

    #[test]
    fn previous_period_clamps_at_the_calendar_floor() {
        let floor = NaiveDate::MIN;
        assert_eq!(previous_period(floor, floor), (floor, floor));
        assert_eq!(
            previous_period(floor + Days::new(2), floor + Days::new(9)),
            (floor, floor + Days::new(1))
        );
    }

    proptest! {
        #[test]
        fn previous_period_is_contiguous_and_equal_length(
            offset in 0i64..20_000,
            len in 0i64..4_000,
        ) {
            let start = d(1990, 1, 1) + chrono::Duration::days(offset);
            let end = start + chrono::Duration::days(len);
            let (ps, pe) = previous_period(start, end);
            prop_assert_eq!(pe + chrono::Duration::days(1), start);
            prop_assert_eq!((pe - ps).num_days(), (end - start).num_days());
        }
    }
}
