#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory loading of the LA crime CSV export.
//!
//! The whole file is read once into a [`Dataset`]. While loading, every row
//! gets two parsed timestamps: `Date Rptd` (the partitioning key) and the
//! derived `DateTime OCC` (`DATE OCC` date + normalized `TIME OCC`). Any row
//! that cannot produce both aborts the load.

pub mod parsing;
pub mod time;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use crime_split_partition_models::PartitionWindow;
use csv::StringRecord;

pub use time::{TimeError, normalize_time_occ};

/// Reported date column; the partitioning key.
pub const DATE_RPTD: &str = "Date Rptd";

/// Occurrence date column (first 10 characters significant).
pub const DATE_OCC: &str = "DATE OCC";

/// Occurrence time column (integer `HHMM`, leading zeros dropped).
pub const TIME_OCC: &str = "TIME OCC";

/// Name of the derived occurrence timestamp column.
pub const DATETIME_OCC: &str = "DateTime OCC";

/// Errors that can occur while loading the dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The source file could not be opened.
    #[error("Failed to open {path}: {source}")]
    Open {
        /// Path of the source file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("Missing required column: {name}")]
    MissingColumn {
        /// Column name.
        name: &'static str,
    },

    /// `Date Rptd` could not be parsed.
    #[error("Row {row}: invalid Date Rptd value {value:?}")]
    InvalidReportedDate {
        /// 0-based row index.
        row: u64,
        /// The raw field.
        value: String,
    },

    /// `DATE OCC` + `TIME OCC` did not form a valid timestamp.
    #[error("Row {row}: invalid DateTime OCC value {value:?}")]
    InvalidOccurredDate {
        /// 0-based row index.
        row: u64,
        /// The combined value that failed to parse.
        value: String,
    },

    /// `TIME OCC` is not an integer or has no defined `HH:MM` form.
    #[error("Row {row}: invalid TIME OCC value {value:?}: {reason}")]
    InvalidTime {
        /// 0-based row index.
        row: u64,
        /// The raw field.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// One source row plus its parsed timestamps.
#[derive(Debug, Clone)]
pub struct IncidentRow {
    /// 0-based position in the source file; preserved in the output.
    pub index: u64,
    /// Raw fields in source column order.
    pub fields: StringRecord,
    /// Parsed `Date Rptd`.
    pub reported_at: NaiveDateTime,
    /// Derived `DateTime OCC`.
    pub occurred_at: NaiveDateTime,
}

/// The fully loaded source dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: StringRecord,
    rows: Vec<IncidentRow>,
    reported_column: usize,
}

impl Dataset {
    /// Loads the dataset from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Open`] if the file is missing or unreadable,
    /// or any other [`DatasetError`] raised by [`Self::from_reader`].
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        log::info!("Loading dataset from {}", path.display());
        let file = File::open(path).map_err(|source| DatasetError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(file)?;
        log::info!(
            "Loaded {} rows ({} columns)",
            dataset.len(),
            dataset.headers.len()
        );
        Ok(dataset)
    }

    /// Parses a dataset from any CSV reader.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::MissingColumn`] if `Date Rptd`, `DATE OCC`,
    /// or `TIME OCC` is absent, [`DatasetError::Csv`] on malformed CSV, and
    /// a row-level variant for the first row whose timestamps cannot be
    /// parsed.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new().from_reader(reader);
        let headers = reader.headers()?.clone();

        let reported_column = column(&headers, DATE_RPTD)?;
        let date_occ_column = column(&headers, DATE_OCC)?;
        let time_occ_column = column(&headers, TIME_OCC)?;

        let mut rows = Vec::new();
        for (index, result) in (0u64..).zip(reader.records()) {
            let fields = result?;
            let field = |i: usize| fields.get(i).unwrap_or("");

            let reported_raw = field(reported_column);
            let reported_at = parsing::parse_reported(reported_raw).ok_or_else(|| {
                DatasetError::InvalidReportedDate {
                    row: index,
                    value: reported_raw.to_string(),
                }
            })?;

            let occurred_at =
                derive_occurred_at(index, field(date_occ_column), field(time_occ_column))?;

            rows.push(IncidentRow {
                index,
                fields,
                reported_at,
                occurred_at,
            });
        }

        Ok(Self {
            headers,
            rows,
            reported_column,
        })
    }

    /// Source header row.
    #[must_use]
    pub const fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// All rows in source order.
    #[must_use]
    pub fn rows(&self) -> &[IncidentRow] {
        &self.rows
    }

    /// Position of `Date Rptd` in the header row.
    #[must_use]
    pub const fn reported_column(&self) -> usize {
        self.reported_column
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the dataset has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose `Date Rptd` falls inside `window`, in source order.
    pub fn rows_in(&self, window: PartitionWindow) -> impl Iterator<Item = &IncidentRow> {
        self.rows
            .iter()
            .filter(move |row| window.contains(row.reported_at))
    }
}

fn column(headers: &StringRecord, name: &'static str) -> Result<usize, DatasetError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or(DatasetError::MissingColumn { name })
}

/// Builds `DateTime OCC` from the raw `DATE OCC` and `TIME OCC` fields.
fn derive_occurred_at(
    row: u64,
    date_occ: &str,
    time_occ: &str,
) -> Result<NaiveDateTime, DatasetError> {
    let invalid_time = |reason: String| DatasetError::InvalidTime {
        row,
        value: time_occ.to_string(),
        reason,
    };

    let raw = time_occ
        .trim()
        .parse::<u32>()
        .map_err(|e| invalid_time(e.to_string()))?;
    let hhmm = normalize_time_occ(raw).map_err(|e| invalid_time(e.to_string()))?;

    let date_part = date_occ.get(..10).unwrap_or(date_occ).trim();
    let invalid = || DatasetError::InvalidOccurredDate {
        row,
        value: format!("{date_part} {hhmm}"),
    };

    let date = parsing::parse_occurred_date(date_occ).ok_or_else(invalid)?;
    let time = parsing::parse_hhmm(&hhmm).ok_or_else(invalid)?;
    Ok(date.and_time(time))
}
