// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Calendar arithmetic for charts and the month view. Dates are plain
//! calendar values; no time zone conversion happens here.

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::models::TransactionType;
use crate::stats::DailyTotals;

pub const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const WEEKDAY_ABBR: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const WEEK_LABELS: [&str; 4] = ["Week 1", "Week 2", "Week 3", "Week 4"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Weekly,
    Monthly,
    Yearly,
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" | "week" => Ok(Period::Weekly),
            "monthly" | "month" => Ok(Period::Monthly),
            "yearly" | "year" => Ok(Period::Yearly),
            other => Err(anyhow!(
                "Unknown period '{}', expected weekly|monthly|yearly",
                other
            )),
        }
    }
}

impl Period {
    /// Bucket labels; label `i` names bucket `i` of [`period_index`].
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Period::Weekly => &WEEKDAY_ABBR,
            Period::Monthly => &WEEK_LABELS,
            Period::Yearly => &MONTH_ABBR,
        }
    }

    /// The period that contains `today`: a Sunday-to-Saturday week, the
    /// calendar month, or the calendar year.
    pub fn date_range(&self, today: NaiveDate) -> DateRange {
        match self {
            Period::Weekly => {
                let back = u64::from(today.weekday().num_days_from_sunday());
                let start = today - Days::new(back);
                DateRange {
                    start,
                    end: start + Days::new(6),
                }
            }
            Period::Monthly => {
                let cursor = MonthCursor::from_date(today);
                DateRange {
                    start: cursor.first_day(),
                    end: cursor.last_day(),
                }
            }
            Period::Yearly => DateRange {
                start: today.with_ordinal(1).unwrap_or(today),
                end: NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today),
            },
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
        })
    }
}

/// Bucket of `date` within `period`.
///
/// Monthly buckets are four fixed seven-day slices; days 29 and later fold
/// into the last one.
pub fn period_index(date: NaiveDate, period: Period) -> usize {
    match period {
        Period::Weekly => date.weekday().num_days_from_sunday() as usize,
        Period::Monthly => (((date.day() - 1) / 7) as usize).min(3),
        Period::Yearly => date.month0() as usize,
    }
}

/// Fold per-day totals of one type into chart buckets.
pub fn bucket_series(
    daily: &BTreeMap<NaiveDate, DailyTotals>,
    period: Period,
    kind: TransactionType,
) -> Vec<Decimal> {
    let mut data = vec![Decimal::ZERO; period.labels().len()];
    for (date, totals) in daily {
        let idx = period_index(*date, period);
        if let Some(slot) = data.get_mut(idx) {
            *slot += totals.get(kind);
        }
    }
    data
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(anyhow!("Range start {} is after end {}", start, end));
        }
        Ok(DateRange { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// `[today - n, today]`, starting at the earliest representable date when
/// `n` reaches past it.
pub fn last_n_days(today: NaiveDate, n: u32) -> DateRange {
    DateRange {
        start: today
            .checked_sub_days(Days::new(u64::from(n)))
            .unwrap_or(NaiveDate::MIN),
        end: today,
    }
}

/// A month being viewed, with a zero-based month index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MonthCursor {
    pub year: i32,
    pub month0: u32,
}

impl MonthCursor {
    /// Years with a four-digit `YYYY-MM` key.
    pub const YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

    pub fn new(year: i32, month0: u32) -> Result<Self> {
        if month0 > 11 {
            return Err(anyhow!("Month index {} out of range 0..=11", month0));
        }
        if !Self::YEARS.contains(&year) {
            return Err(anyhow!("Year {} out of range 1..=9999", year));
        }
        Ok(MonthCursor { year, month0 })
    }

    pub fn from_date(d: NaiveDate) -> Self {
        MonthCursor {
            year: d.year(),
            month0: d.month0(),
        }
    }

    /// Parse a `YYYY-MM` key.
    pub fn parse(s: &str) -> Result<Self> {
        let key = crate::utils::parse_month(s)?;
        let invalid = || format!("Invalid month '{}', expected YYYY-MM", key);
        let (year, month) = key.split_once('-').with_context(invalid)?;
        let year: i32 = year.parse().with_context(invalid)?;
        let month: u32 = month.parse().with_context(invalid)?;
        Self::new(year, month - 1)
    }

    pub fn previous(&self) -> Self {
        if self.month0 == 0 {
            MonthCursor {
                year: self.year - 1,
                month0: 11,
            }
        } else {
            MonthCursor {
                year: self.year,
                month0: self.month0 - 1,
            }
        }
    }

    pub fn next(&self) -> Self {
        if self.month0 == 11 {
            MonthCursor {
                year: self.year + 1,
                month0: 0,
            }
        } else {
            MonthCursor {
                year: self.year,
                month0: self.month0 + 1,
            }
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Day 0 of the following month.
    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// 0 = Sunday.
    pub fn first_weekday(&self) -> u32 {
        self.first_day().weekday().num_days_from_sunday()
    }

    /// `YYYY-MM`, the budget key format.
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month0 + 1)
    }

    pub fn title(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.month0 as usize], self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub date: NaiveDate,
    pub day: u32,
    pub other_month: bool,
    pub is_today: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_label: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid {
    pub cursor: MonthCursor,
    pub title: String,
    pub first_weekday: u32,
    pub days_in_month: u32,
    pub cells: Vec<GridCell>,
}

impl MonthGrid {
    pub const CELLS: usize = 42;

    pub fn rows(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(7)
    }
}

/// Six weeks of seven days starting on the Sunday on or before the first of
/// the month. The first of any month shown carries that month's label.
pub fn month_grid(cursor: MonthCursor, today: NaiveDate) -> MonthGrid {
    let first_weekday = cursor.first_weekday();
    let days_in_month = cursor.days_in_month();
    let start = cursor.first_day() - Days::new(u64::from(first_weekday));

    let cells = start
        .iter_days()
        .take(MonthGrid::CELLS)
        .map(|date| {
            let other_month = MonthCursor::from_date(date) != cursor;
            GridCell {
                date,
                day: date.day(),
                other_month,
                is_today: !other_month && date == today,
                month_label: (date.day() == 1).then(|| MONTH_ABBR[date.month0() as usize]),
            }
        })
        .collect();

    MonthGrid {
        cursor,
        title: cursor.title(),
        first_weekday,
        days_in_month,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn monthly_buckets_clamp_late_days() {
        let idx = |s| period_index(day(s), Period::Monthly);
        assert_eq!(idx("2024-01-01"), 0);
        assert_eq!(idx("2024-01-07"), 0);
        assert_eq!(idx("2024-01-08"), 1);
        assert_eq!(idx("2024-01-22"), 3);
        assert_eq!(idx("2024-01-29"), 3);
        assert_eq!(idx("2024-01-31"), 3);
    }

    #[test]
    fn weekly_buckets_start_on_sunday() {
        assert_eq!(period_index(day("2024-01-07"), Period::Weekly), 0);
        assert_eq!(period_index(day("2024-01-08"), Period::Weekly), 1);
        assert_eq!(period_index(day("2024-01-13"), Period::Weekly), 6);
        assert_eq!(Period::Weekly.labels()[0], "Sun");
    }

    #[test]
    fn yearly_buckets_are_month_indexes() {
        assert_eq!(period_index(day("2024-01-15"), Period::Yearly), 0);
        assert_eq!(period_index(day("2024-12-31"), Period::Yearly), 11);
        assert_eq!(Period::Yearly.labels().len(), 12);
    }

    #[test]
    fn series_folds_days_into_buckets() {
        let mut daily = BTreeMap::new();
        let amt = |s: &str| s.parse::<Decimal>().unwrap();
        daily.insert(
            day("2024-03-01"),
            DailyTotals {
                income: amt("100"),
                expenses: amt("10"),
            },
        );
        daily.insert(
            day("2024-03-30"),
            DailyTotals {
                income: Decimal::ZERO,
                expenses: amt("5"),
            },
        );
        daily.insert(
            day("2024-03-31"),
            DailyTotals {
                income: Decimal::ZERO,
                expenses: amt("7"),
            },
        );
        let exp = bucket_series(&daily, Period::Monthly, TransactionType::Expense);
        assert_eq!(exp, vec![amt("10"), amt("0"), amt("0"), amt("12")]);
        let inc = bucket_series(&daily, Period::Yearly, TransactionType::Income);
        assert_eq!(inc[2], amt("100"));
        assert_eq!(inc.iter().copied().sum::<Decimal>(), amt("100"));
    }

    #[test]
    fn period_ranges_contain_today() {
        let today = day("2024-03-13"); // Wednesday
        let w = Period::Weekly.date_range(today);
        assert_eq!(w.start, day("2024-03-10"));
        assert_eq!(w.end, day("2024-03-16"));
        let m = Period::Monthly.date_range(today);
        assert_eq!((m.start, m.end), (day("2024-03-01"), day("2024-03-31")));
        let y = Period::Yearly.date_range(today);
        assert_eq!((y.start, y.end), (day("2024-01-01"), day("2024-12-31")));
        assert!(y.contains(today));
        assert_eq!(last_n_days(today, 7).start, day("2024-03-06"));
        assert_eq!(last_n_days(today, u32::MAX).start, NaiveDate::MIN);
    }

    #[test]
    fn month_lengths_follow_leap_years() {
        assert_eq!(MonthCursor::new(2024, 1).unwrap().days_in_month(), 29);
        assert_eq!(MonthCursor::new(2023, 1).unwrap().days_in_month(), 28);
        assert_eq!(MonthCursor::new(1900, 1).unwrap().days_in_month(), 28);
        assert_eq!(MonthCursor::new(2000, 1).unwrap().days_in_month(), 29);
        assert_eq!(MonthCursor::new(2024, 3).unwrap().days_in_month(), 30);
        assert!(MonthCursor::new(2024, 12).is_err());
        assert!(MonthCursor::new(262_143, 0).is_err());
        assert!(MonthCursor::new(0, 0).is_err());
    }

    #[test]
    fn cursor_navigation_wraps_years() {
        let jan = MonthCursor::new(2024, 0).unwrap();
        assert_eq!(jan.previous(), MonthCursor::new(2023, 11).unwrap());
        assert_eq!(jan.previous().next(), jan);
        assert_eq!(MonthCursor::parse("2024-12").unwrap().next().key(), "2025-01");
        assert!(MonthCursor::parse("2024-13").is_err());
        assert!(MonthCursor::parse("262143-01").is_err());
        assert!(MonthCursor::parse("2024-1").is_err());
        assert!(MonthCursor::parse("+2024-01").is_err());
        assert_eq!(MonthCursor::parse(" 2024-03 ").unwrap().key(), "2024-03");
    }

    #[test]
    fn march_2024_grid() {
        let cursor = MonthCursor::new(2024, 2).unwrap();
        let grid = month_grid(cursor, day("2024-03-17"));
        assert_eq!(grid.cells.len(), 42);
        assert_eq!(grid.first_weekday, 5);
        assert_eq!(grid.days_in_month, 31);

        let lead: Vec<u32> = grid.cells[..5].iter().map(|c| c.day).collect();
        assert_eq!(lead, vec![25, 26, 27, 28, 29]);
        assert!(grid.cells[..5].iter().all(|c| c.other_month));

        let march = &grid.cells[5..36];
        assert!(march.iter().all(|c| !c.other_month));
        assert_eq!(march[0].month_label, Some("Mar"));
        assert!(march[1..].iter().all(|c| c.month_label.is_none()));
        let today: Vec<u32> = march.iter().filter(|c| c.is_today).map(|c| c.day).collect();
        assert_eq!(today, vec![17]);

        let tail = &grid.cells[36..];
        assert_eq!(tail.len(), 6);
        assert!(tail.iter().all(|c| c.other_month && !c.is_today));
        assert_eq!(tail[0].day, 1);
        assert_eq!(tail[0].month_label, Some("Apr"));
        assert_eq!(grid.rows().count(), 6);
    }

    #[test]
    fn grid_for_month_starting_sunday_has_no_leading_days() {
        // September 2024 starts on a Sunday.
        let grid = month_grid(MonthCursor::new(2024, 8).unwrap(), day("2000-01-01"));
        assert_eq!(grid.first_weekday, 0);
        assert_eq!(grid.cells[0].day, 1);
        assert!(!grid.cells[0].other_month);
        assert!(grid.cells.iter().all(|c| !c.is_today));
    }

    #[test]
    fn today_outside_month_is_not_flagged() {
        // 2024-02-29 is shown as a trailing cell of March.
        let grid = month_grid(MonthCursor::new(2024, 2).unwrap(), day("2024-02-29"));
        assert!(grid.cells.iter().all(|c| !c.is_today));
    }
}
