#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Day-range, partition window, and run report types.
//!
//! A [`DayRange`] is the caller-selected `[start, end)` span of calendar
//! days. Iterating it yields one [`PartitionWindow`] per day; each window
//! is the half-open interval `[day 00:00, next day 00:00)` and maps to
//! exactly one output file (see [`output_file_name`]).

use chrono::{Datelike as _, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Default first day (inclusive) of the partition range.
pub const DEFAULT_START: &str = "2023-01-01";

/// Default last day (exclusive) of the partition range.
pub const DEFAULT_END: &str = "2023-01-05";

/// Default file name prefix for daily output files.
pub const DEFAULT_FILE_PREFIX: &str = "la_crime";

/// A half-open span of calendar days, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRange {
    /// First day, inclusive.
    pub start: NaiveDate,
    /// Last day, exclusive.
    pub end: NaiveDate,
}

impl DayRange {
    /// Creates a new range. `start >= end` is allowed and yields no days.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of days in the range (zero when `start >= end`).
    #[must_use]
    pub fn day_count(&self) -> u64 {
        u64::try_from((self.end - self.start).num_days()).unwrap_or(0)
    }

    /// Returns `true` if the range contains no days.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Iterates the daily windows of this range in chronological order.
    #[must_use]
    pub const fn windows(&self) -> DayWindows {
        DayWindows {
            next: Some(self.start),
            end: self.end,
        }
    }
}

impl std::fmt::Display for DayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Iterator over the [`PartitionWindow`]s of a [`DayRange`].
#[derive(Debug, Clone)]
pub struct DayWindows {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for DayWindows {
    type Item = PartitionWindow;

    fn next(&mut self) -> Option<Self::Item> {
        let day = self.next.filter(|day| *day < self.end)?;
        self.next = day.succ_opt();
        Some(PartitionWindow::new(day))
    }
}

/// One calendar day, viewed as the half-open interval
/// `[day 00:00, next day 00:00)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionWindow {
    day: NaiveDate,
}

impl PartitionWindow {
    /// Creates the window covering `day`.
    #[must_use]
    pub const fn new(day: NaiveDate) -> Self {
        Self { day }
    }

    /// The calendar day this window covers.
    #[must_use]
    pub const fn day(&self) -> NaiveDate {
        self.day
    }

    /// Inclusive lower bound (midnight of the day).
    #[must_use]
    pub fn start(&self) -> NaiveDateTime {
        NaiveDateTime::new(self.day, NaiveTime::MIN)
    }

    /// Exclusive upper bound (midnight of the following day).
    ///
    /// Saturates at the maximum representable date-time for the last day
    /// chrono can represent.
    #[must_use]
    pub fn end(&self) -> NaiveDateTime {
        self.day
            .succ_opt()
            .map_or(NaiveDateTime::MAX, |next| NaiveDateTime::new(next, NaiveTime::MIN))
    }

    /// Returns `true` if `at` falls in `[start, end)`.
    #[must_use]
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start() && at < self.end()
    }
}

/// Builds the output file name for a day, e.g. `la_crime-2023-1-5.csv`.
///
/// Year, month and day are written without zero padding.
#[must_use]
pub fn output_file_name(prefix: &str, day: NaiveDate) -> String {
    format!("{prefix}-{}-{}-{}.csv", day.year(), day.month(), day.day())
}

/// One daily file written during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionReport {
    /// The day the file covers.
    pub day: NaiveDate,
    /// File name (no directory).
    pub file_name: String,
    /// Number of incident rows written.
    pub rows: u64,
}

/// A single failed upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFailureReport {
    /// File name (no directory).
    pub file_name: String,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Aggregate upload status for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    /// Files uploaded successfully.
    pub uploaded: u64,
    /// Files whose upload failed.
    pub failed: u64,
    /// Details for each failed file.
    pub failures: Vec<UploadFailureReport>,
}

/// Summary of a complete split run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// The day range that was partitioned.
    pub range: DayRange,
    /// Number of stale output files removed before partitioning.
    pub cleaned: u64,
    /// Daily files written, in chronological order.
    pub partitions: Vec<PartitionReport>,
    /// Upload results, `None` when uploads were not requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploads: Option<UploadReport>,
}

impl RunReport {
    /// Total number of incident rows written across all daily files.
    #[must_use]
    pub fn total_rows(&self) -> u64 {
        self.partitions.iter().map(|p| p.rows).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn default_range_has_four_days() {
        let range = DayRange::new(date(DEFAULT_START), date(DEFAULT_END));
        assert_eq!(range.day_count(), 4);
        let days: Vec<_> = range.windows().map(|w| w.day()).collect();
        assert_eq!(
            days,
            vec![
                date("2023-01-01"),
                date("2023-01-02"),
                date("2023-01-03"),
                date("2023-01-04"),
            ]
        );
    }

    #[test]
    fn equal_bounds_yield_no_windows() {
        let range = DayRange::new(date("2023-01-01"), date("2023-01-01"));
        assert!(range.is_empty());
        assert_eq!(range.day_count(), 0);
        assert_eq!(range.windows().count(), 0);
    }

    #[test]
    fn reversed_bounds_yield_no_windows() {
        let range = DayRange::new(date("2023-01-05"), date("2023-01-01"));
        assert!(range.is_empty());
        assert_eq!(range.day_count(), 0);
        assert_eq!(range.windows().count(), 0);
    }

    #[test]
    fn windows_cross_month_and_year_boundaries() {
        let range = DayRange::new(date("2022-12-30"), date("2023-01-02"));
        let days: Vec<_> = range.windows().map(|w| w.day()).collect();
        assert_eq!(
            days,
            vec![date("2022-12-30"), date("2022-12-31"), date("2023-01-01")]
        );
    }

    #[test]
    fn window_is_half_open() {
        let window = PartitionWindow::new(date("2023-01-05"));
        let midnight = date("2023-01-05").and_hms_opt(0, 0, 0).unwrap();
        let last_second = date("2023-01-05").and_hms_opt(23, 59, 59).unwrap();
        let next_midnight = date("2023-01-06").and_hms_opt(0, 0, 0).unwrap();

        assert!(window.contains(midnight));
        assert!(window.contains(last_second));
        assert!(!window.contains(next_midnight));
        assert_eq!(window.end(), next_midnight);
    }

    #[test]
    fn consecutive_windows_are_disjoint() {
        let range = DayRange::new(date("2023-01-01"), date("2023-01-03"));
        let windows: Vec<_> = range.windows().collect();
        assert_eq!(windows[0].end(), windows[1].start());
        let boundary = windows[1].start();
        assert!(!windows[0].contains(boundary));
        assert!(windows[1].contains(boundary));
    }

    #[test]
    fn file_names_are_unpadded() {
        assert_eq!(
            output_file_name(DEFAULT_FILE_PREFIX, date("2023-01-05")),
            "la_crime-2023-1-5.csv"
        );
        assert_eq!(
            output_file_name("x", date("2023-11-25")),
            "x-2023-11-25.csv"
        );
    }

    #[test]
    fn report_serializes_without_uploads() {
        let report = RunReport {
            range: DayRange::new(date("2023-01-01"), date("2023-01-02")),
            cleaned: 2,
            partitions: vec![PartitionReport {
                day: date("2023-01-01"),
                file_name: "la_crime-2023-1-1.csv".to_string(),
                rows: 3,
            }],
            uploads: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["range"]["start"], "2023-01-01");
        assert_eq!(json["partitions"][0]["fileName"], "la_crime-2023-1-1.csv");
        assert!(json.get("uploads").is_none());
        assert_eq!(report.total_rows(), 3);
    }
}
