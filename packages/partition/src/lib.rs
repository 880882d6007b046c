#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Splits a loaded crime dataset into one CSV file per reported day.
//!
//! [`Partitioner::run`] walks a [`DayRange`] one day at a time, selects the
//! rows whose `Date Rptd` falls in that day's half-open window, and writes
//! them to `<output_dir>/<file_prefix>-<Y>-<M>-<D>.csv`. Stale files from an
//! earlier run are removed beforehand with [`outputs::clear_outputs`].

pub mod outputs;
pub mod progress;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use crime_split_config::SplitConfig;
use crime_split_dataset::{Dataset, IncidentRow};
use crime_split_partition_models::{DayRange, PartitionReport, output_file_name};

use crate::progress::ProgressCallback;

/// Errors that can occur while cleaning or writing daily files.
#[derive(Debug, thiserror::Error)]
pub enum PartitionError {
    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being operated on.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV output failed.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// The output file pattern is invalid.
    #[error("Invalid output pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A matching output entry could not be read.
    #[error("Failed to scan output directory: {0}")]
    Glob(#[from] glob::GlobError),

    /// The file prefix is blank, so the output pattern would match every
    /// file in the directory.
    #[error("Output file prefix must not be empty")]
    EmptyPrefix,
}

/// A daily file written by [`Partitioner::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPartition {
    /// The day the file covers.
    pub day: NaiveDate,
    /// Full path of the file.
    pub path: PathBuf,
    /// Number of incident rows in the file.
    pub rows: u64,
}

impl WrittenPartition {
    /// Converts to the serializable report form.
    #[must_use]
    pub fn report(&self) -> PartitionReport {
        PartitionReport {
            day: self.day,
            file_name: self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            rows: self.rows,
        }
    }
}

/// Writes daily output files into a directory.
#[derive(Debug, Clone)]
pub struct Partitioner {
    output_dir: PathBuf,
    file_prefix: String,
}

impl Partitioner {
    /// Creates a partitioner writing `<file_prefix>-Y-M-D.csv` files into
    /// `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_prefix: file_prefix.into(),
        }
    }

    /// Creates a partitioner from the run configuration.
    #[must_use]
    pub fn from_config(config: &SplitConfig) -> Self {
        Self::new(&config.output_dir, &config.file_prefix)
    }

    /// Output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the file for `day`.
    #[must_use]
    pub fn path_for(&self, day: NaiveDate) -> PathBuf {
        self.output_dir
            .join(output_file_name(&self.file_prefix, day))
    }

    /// Removes every existing file matching this partitioner's prefix.
    ///
    /// # Errors
    ///
    /// See [`outputs::clear_outputs`].
    pub fn clear(&self) -> Result<u64, PartitionError> {
        outputs::clear_outputs(&self.output_dir, &self.file_prefix)
    }

    /// Lists every file matching this partitioner's prefix.
    ///
    /// # Errors
    ///
    /// See [`outputs::list_outputs`].
    pub fn scan(&self) -> Result<Vec<PathBuf>, PartitionError> {
        outputs::list_outputs(&self.output_dir, &self.file_prefix)
    }

    /// Writes one file per day in `range`, in chronological order.
    ///
    /// An empty or reversed range writes nothing. The output directory is
    /// created if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PartitionError::Io`] if the output directory cannot be
    /// created, or [`PartitionError::Csv`] if a file cannot be written.
    /// Files written before the failure are left in place.
    pub fn run(
        &self,
        dataset: &Dataset,
        range: DayRange,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Vec<WrittenPartition>, PartitionError> {
        if range.is_empty() {
            log::warn!("Day range {range} is empty, nothing to write");
            return Ok(Vec::new());
        }

        std::fs::create_dir_all(&self.output_dir).map_err(|source| PartitionError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        progress.set_total(range.day_count());
        let mut written = Vec::new();

        for window in range.windows() {
            let day = window.day();
            let rows: Vec<&IncidentRow> = dataset.rows_in(window).collect();
            let path = self.path_for(day);

            progress.set_message(day.to_string());
            let count = writer::write_rows(&path, dataset, &rows)?;
            log::info!("{day}: wrote {count} row(s) to {}", path.display());

            written.push(WrittenPartition {
                day,
                path,
                rows: count,
            });
            progress.inc(1);
        }

        progress.finish(format!("wrote {} daily file(s)", written.len()));
        Ok(written)
    }
}
