#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Splits the LA crime CSV export into one file per reported day and
//! optionally pushes the files to S3.
//!
//! ```text
//! crime_split -s 2023-01-01 -e 2023-01-05 -P -d 10
//! ```
//!
//! Logging is controlled with `RUST_LOG`; paths and bucket come from
//! [`SplitConfig`] (defaults, `--config` TOML, `CRIME_SPLIT_*` env vars,
//! then the flags below).

mod pipeline;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;
use crime_split_config::SplitConfig;
use crime_split_partition_models::{DEFAULT_END, DEFAULT_START, DayRange};
use crime_split_upload::ObjectStore;
use crime_split_upload::s3::S3Store;

#[derive(Parser)]
#[command(
    name = "crime_split",
    about = "Split a crime CSV export into daily files and optionally push them to S3"
)]
struct Cli {
    /// First day to write, inclusive (YYYY-MM-DD)
    #[arg(short, long, default_value = DEFAULT_START)]
    start: NaiveDate,
    /// Day to stop at, exclusive (YYYY-MM-DD)
    #[arg(short, long, default_value = DEFAULT_END)]
    end: NaiveDate,
    /// Seconds to wait before each upload
    #[arg(short, long, default_value_t = 0)]
    delay: u64,
    /// Upload the daily files to the configured bucket
    #[arg(short = 'P', long)]
    push: bool,
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Source CSV (overrides config)
    #[arg(long)]
    source: Option<PathBuf>,
    /// Output directory (overrides config)
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Destination bucket (overrides config)
    #[arg(long)]
    bucket: Option<String>,
    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Cli {
    fn resolve_config(&self) -> Result<SplitConfig, crime_split_config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => SplitConfig::from_toml_file(path)?,
            None => SplitConfig::default(),
        }
        .apply_env()?;

        if let Some(source) = &self.source {
            config.source_path.clone_from(source);
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir.clone_from(output_dir);
        }
        if let Some(bucket) = &self.bucket {
            config.bucket_name.clone_from(bucket);
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crime_split_cli_utils::init_logger();
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    let store: Option<Arc<dyn ObjectStore>> = if cli.push {
        Some(Arc::new(S3Store::from_config(&config).await))
    } else {
        None
    };

    let report = pipeline::run(
        &config,
        DayRange::new(cli.start, cli.end),
        Duration::from_secs(cli.delay),
        store,
        &multi,
    )
    .await?;

    if let Some(path) = &cli.report {
        pipeline::write_report(path, &report)?;
    }

    Ok(())
}
