//! Split run orchestration: clean -> load -> partition -> (upload).
//!
//! Uploads target whatever matches the output pattern after partitioning,
//! found by scanning the output directory rather than from the list of
//! files this run wrote.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crime_split_cli_utils::{IndicatifProgress, MultiProgress};
use crime_split_config::SplitConfig;
use crime_split_dataset::Dataset;
use crime_split_partition::{Partitioner, WrittenPartition};
use crime_split_partition_models::{DayRange, RunReport};
use crime_split_upload::{ObjectStore, Uploader};

/// Runs a full split.
///
/// When `store` is `Some`, every daily file found in the output directory
/// is uploaded after partitioning, sleeping `delay` before each one. Upload
/// failures are recorded in the report and do not fail the run.
///
/// # Errors
///
/// Returns an error if cleanup, loading, or writing fails.
pub async fn run(
    config: &SplitConfig,
    range: DayRange,
    delay: Duration,
    store: Option<Arc<dyn ObjectStore>>,
    multi: &MultiProgress,
) -> Result<RunReport, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let partitioner = Partitioner::from_config(config);

    let cleaned = partitioner.clear()?;
    let dataset = Dataset::load(&config.source_path)?;

    log::info!("Splitting {range} into {}", partitioner.output_dir().display());
    let written = partitioner.run(
        &dataset,
        range,
        &IndicatifProgress::days_bar(multi, "split"),
    )?;

    let mut report = RunReport {
        range,
        cleaned,
        partitions: written.iter().map(WrittenPartition::report).collect(),
        uploads: None,
    };

    if let Some(store) = store {
        let files = partitioner.scan()?;
        log::info!(
            "Pushing {} file(s) to s3://{}/{}/ (delay {delay:?})",
            files.len(),
            config.bucket_name,
            config.key_prefix
        );

        let uploader = Uploader::from_config(store, config).with_delay(delay);
        let summary = uploader
            .upload_all(&files, &IndicatifProgress::uploads_bar(multi, "upload"))
            .await;

        if summary.all_uploaded() {
            log::info!("Upload complete: {summary}");
        } else {
            log::warn!("Upload finished with failures: {summary}");
        }
        report.uploads = Some(summary.report());
    }

    log::info!(
        "Split complete: {} file(s), {} row(s) in {:.1}s",
        report.partitions.len(),
        report.total_rows(),
        start.elapsed().as_secs_f64()
    );

    Ok(report)
}

/// Writes the run report as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub fn write_report(path: &Path, report: &RunReport) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    log::info!("Wrote run report to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use crime_split_upload::UploadError;
    use crime_split_upload::memory::MemoryStore;
    use indicatif::ProgressDrawTarget;

    use super::*;

    const CSV: &str = "\
DR_NO,Date Rptd,DATE OCC,TIME OCC
1,01/01/2023 12:00:00 AM,12/31/2022 12:00:00 AM,2130
2,01/02/2023 12:00:00 AM,01/01/2023 12:00:00 AM,930
3,01/02/2023 02:00:00 PM,01/02/2023 12:00:00 AM,1200
";

    /// Rejects keys containing `needle`, stores everything else.
    struct RejectingStore {
        inner: MemoryStore,
        needle: &'static str,
    }

    #[async_trait]
    impl ObjectStore for RejectingStore {
        async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), UploadError> {
            if key.contains(self.needle) {
                return Err(UploadError::Put {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    source: "access denied".into(),
                });
            }
            self.inner.put(bucket, key, body).await
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn hidden() -> MultiProgress {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn setup(dir: &Path) -> SplitConfig {
        let source_path = dir.join("source.csv");
        std::fs::write(&source_path, CSV).unwrap();
        SplitConfig {
            source_path,
            output_dir: dir.join("output"),
            ..SplitConfig::default()
        }
    }

    fn file_names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn cleans_splits_and_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());
        std::fs::create_dir_all(&config.output_dir).unwrap();
        std::fs::write(config.output_dir.join("la_crime-2020-1-1.csv"), "stale").unwrap();

        let store = Arc::new(MemoryStore::new());
        let report = run(
            &config,
            DayRange::new(date("2023-01-01"), date("2023-01-03")),
            Duration::ZERO,
            Some(store.clone() as Arc<dyn ObjectStore>),
            &hidden(),
        )
        .await
        .unwrap();

        assert_eq!(report.cleaned, 1);
        assert_eq!(report.partitions.len(), 2);
        assert_eq!(report.partitions[1].rows, 2);
        assert_eq!(report.total_rows(), 3);

        let uploads = report.uploads.unwrap();
        assert_eq!(uploads.uploaded, 2);
        assert_eq!(uploads.failed, 0);
        assert_eq!(
            store.keys("la-crime-snowflake-df"),
            vec!["raw/la_crime-2023-1-1.csv", "raw/la_crime-2023-1-2.csv"]
        );
    }

    #[tokio::test]
    async fn rejected_upload_does_not_fail_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());
        let store = Arc::new(RejectingStore {
            inner: MemoryStore::new(),
            needle: "2023-1-1.csv",
        });

        let report = run(
            &config,
            DayRange::new(date("2023-01-01"), date("2023-01-03")),
            Duration::ZERO,
            Some(store.clone() as Arc<dyn ObjectStore>),
            &hidden(),
        )
        .await
        .unwrap();

        assert_eq!(report.partitions.len(), 2);
        let uploads = report.uploads.unwrap();
        assert_eq!(uploads.uploaded, 1);
        assert_eq!(uploads.failed, 1);
        assert_eq!(uploads.failures[0].file_name, "la_crime-2023-1-1.csv");
        assert_eq!(
            store.inner.keys("la-crime-snowflake-df"),
            vec!["raw/la_crime-2023-1-2.csv"]
        );
        assert!(store.inner.get("la-crime-snowflake-df", "raw/la_crime-2023-1-1.csv").is_none());
    }

    #[tokio::test]
    async fn without_store_nothing_is_uploaded() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());

        let report = run(
            &config,
            DayRange::new(date("2023-01-01"), date("2023-01-02")),
            Duration::ZERO,
            None,
            &hidden(),
        )
        .await
        .unwrap();

        assert!(report.uploads.is_none());
        assert_eq!(report.partitions.len(), 1);
    }

    #[tokio::test]
    async fn repeated_runs_produce_the_same_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());
        let range = DayRange::new(date("2023-01-01"), date("2023-01-04"));
        let partitioner = Partitioner::from_config(&config);

        run(&config, range, Duration::ZERO, None, &hidden()).await.unwrap();
        let first = file_names(&partitioner.scan().unwrap());
        let report = run(&config, range, Duration::ZERO, None, &hidden()).await.unwrap();
        let second = file_names(&partitioner.scan().unwrap());

        assert_eq!(first, second);
        assert_eq!(report.cleaned, 3);
    }

    #[tokio::test]
    async fn empty_range_writes_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());

        let report = run(
            &config,
            DayRange::new(date("2023-01-01"), date("2023-01-01")),
            Duration::ZERO,
            None,
            &hidden(),
        )
        .await
        .unwrap();

        assert!(report.partitions.is_empty());
    }

    #[tokio::test]
    async fn missing_source_aborts_after_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let config = SplitConfig {
            source_path: dir.path().join("absent.csv"),
            output_dir: dir.path().join("output"),
            ..SplitConfig::default()
        };
        std::fs::create_dir_all(&config.output_dir).unwrap();
        std::fs::write(config.output_dir.join("la_crime-2020-1-1.csv"), "stale").unwrap();

        let err = run(
            &config,
            DayRange::new(date("2023-01-01"), date("2023-01-02")),
            Duration::ZERO,
            None,
            &hidden(),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("absent.csv"));
        assert!(Partitioner::from_config(&config).scan().unwrap().is_empty());
    }

    #[test]
    fn report_is_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = RunReport {
            range: DayRange::new(date("2023-01-01"), date("2023-01-02")),
            cleaned: 0,
            partitions: Vec::new(),
            uploads: None,
        };

        write_report(&path, &report).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["range"]["end"], "2023-01-02");
    }
}
