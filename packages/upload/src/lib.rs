#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Best-effort upload of daily CSV files to an object store.
//!
//! Each file is stored at `<key_prefix>/<file name>` in the configured
//! bucket. Uploads run one at a time; a non-zero delay is slept before every
//! upload. A failed file is logged and recorded in the [`UploadSummary`],
//! and the batch moves on to the next file.
//!
//! The store itself sits behind [`ObjectStore`]: [`s3::S3Store`] talks to
//! S3 (or an S3-compatible endpoint) with the SDK's default credential
//! chain, and [`memory::MemoryStore`] keeps objects in-process.

pub mod memory;
pub mod s3;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crime_split_config::SplitConfig;
use crime_split_partition::progress::ProgressCallback;
use crime_split_partition_models::{UploadFailureReport, UploadReport};

/// Errors that can occur while uploading a single file.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The local file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Local path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The store rejected the object.
    #[error("Failed to upload s3://{bucket}/{key}: {source}")]
    Put {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Underlying store error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Stores bytes at a key in a bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `body` to `bucket`/`key`, replacing any existing object.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Put`] if the store rejects the write.
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), UploadError>;
}

/// Result of one file's upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    /// Stored successfully.
    Uploaded {
        /// Size of the uploaded object.
        bytes: u64,
    },
    /// The attempt failed; the batch continued.
    Failed {
        /// Rendered error.
        reason: String,
    },
}

/// Upload attempt for one local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Local file.
    pub path: PathBuf,
    /// Destination key.
    pub key: String,
    /// What happened.
    pub status: UploadStatus,
}

impl UploadOutcome {
    /// Returns `true` if the file was stored.
    #[must_use]
    pub const fn is_uploaded(&self) -> bool {
        matches!(self.status, UploadStatus::Uploaded { .. })
    }
}

/// Per-file outcomes of an upload batch, in attempt order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    /// One entry per attempted file.
    pub outcomes: Vec<UploadOutcome>,
}

impl UploadSummary {
    /// Number of files stored.
    #[must_use]
    pub fn uploaded(&self) -> u64 {
        self.outcomes.iter().filter(|o| o.is_uploaded()).count() as u64
    }

    /// Number of files that failed.
    #[must_use]
    pub fn failed(&self) -> u64 {
        self.outcomes.len() as u64 - self.uploaded()
    }

    /// Returns `true` if every attempted file was stored.
    #[must_use]
    pub fn all_uploaded(&self) -> bool {
        self.outcomes.iter().all(UploadOutcome::is_uploaded)
    }

    /// Converts to the serializable report form.
    #[must_use]
    pub fn report(&self) -> UploadReport {
        let failures = self
            .outcomes
            .iter()
            .filter_map(|o| match &o.status {
                UploadStatus::Failed { reason } => Some(UploadFailureReport {
                    file_name: file_name(&o.path),
                    reason: reason.clone(),
                }),
                UploadStatus::Uploaded { .. } => None,
            })
            .collect();

        UploadReport {
            uploaded: self.uploaded(),
            failed: self.failed(),
            failures,
        }
    }
}

impl std::fmt::Display for UploadSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} uploaded, {} failed", self.uploaded(), self.failed())
    }
}

/// Uploads local files to one bucket under one key prefix.
pub struct Uploader {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    key_prefix: String,
    delay: Duration,
}

impl Uploader {
    /// Creates an uploader with no delay.
    #[must_use]
    pub fn new(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            key_prefix: key_prefix.into(),
            delay: Duration::ZERO,
        }
    }

    /// Creates an uploader targeting the configured bucket and key prefix.
    #[must_use]
    pub fn from_config(store: Arc<dyn ObjectStore>, config: &SplitConfig) -> Self {
        Self::new(store, &config.bucket_name, &config.key_prefix)
    }

    /// Sleeps for `delay` before every upload.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Destination key for a local file: `<key_prefix>/<file name>`.
    #[must_use]
    pub fn object_key(&self, path: &Path) -> String {
        let name = file_name(path);
        let prefix = self.key_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        }
    }

    /// Sleeps for the configured delay, then uploads one file.
    ///
    /// Returns the number of bytes stored.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Read`] if the file cannot be read, or
    /// [`UploadError::Put`] if the store rejects it.
    pub async fn upload_file(&self, path: &Path) -> Result<u64, UploadError> {
        if !self.delay.is_zero() {
            log::debug!("Waiting {:?} before uploading {}", self.delay, path.display());
            tokio::time::sleep(self.delay).await;
        }

        let data = tokio::fs::read(path).await.map_err(|source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let bytes = data.len() as u64;
        let key = self.object_key(path);

        log::info!(
            "Pushing {} -> s3://{}/{key} ({bytes} bytes)",
            path.display(),
            self.bucket
        );
        self.store.put(&self.bucket, &key, data).await?;
        log::info!("  uploaded {key}");

        Ok(bytes)
    }

    /// Uploads every path in order. Failures are logged and recorded, never
    /// returned.
    pub async fn upload_all(
        &self,
        paths: &[PathBuf],
        progress: &Arc<dyn ProgressCallback>,
    ) -> UploadSummary {
        progress.set_total(paths.len() as u64);

        let mut summary = UploadSummary::default();
        for path in paths {
            progress.set_message(file_name(path));

            let status = match self.upload_file(path).await {
                Ok(bytes) => UploadStatus::Uploaded { bytes },
                Err(e) => {
                    log::error!("{e}");
                    UploadStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            summary.outcomes.push(UploadOutcome {
                path: path.clone(),
                key: self.object_key(path),
                status,
            });
            progress.inc(1);
        }

        progress.finish(format!("upload complete: {summary}"));
        summary
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
