#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal plumbing for the `crime_split` binary.
//!
//! [`init_logger`] installs `pretty_env_logger` behind
//! `indicatif-log-bridge`, so `log` output is suspended while bars redraw.
//! [`IndicatifProgress`] renders the split and upload loops as
//! `indicatif` bars.

use std::sync::Arc;

use crime_split_partition::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// An `indicatif` [`ProgressBar`] driven through [`ProgressCallback`].
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    /// Bar for the per-day partition loop.
    #[must_use]
    pub fn days_bar(multi: &MultiProgress, label: &str) -> Arc<dyn ProgressCallback> {
        Self::with_template(
            multi,
            label,
            "{prefix} {wide_bar:.green/dim} {pos}/{len} days {msg}",
        )
    }

    /// Bar for the upload loop. Shows elapsed time since uploads may be
    /// throttled by the per-file delay.
    #[must_use]
    pub fn uploads_bar(multi: &MultiProgress, label: &str) -> Arc<dyn ProgressCallback> {
        Self::with_template(
            multi,
            label,
            "{prefix} {wide_bar:.yellow/dim} {pos}/{len} files [{elapsed_precise}] {msg}",
        )
    }

    fn with_template(
        multi: &MultiProgress,
        label: &str,
        template: &str,
    ) -> Arc<dyn ProgressCallback> {
        Arc::new(Self::new(multi, label, template))
    }

    fn new(multi: &MultiProgress, label: &str, template: &str) -> Self {
        let bar = multi.add(ProgressBar::new(0));
        bar.set_style(
            ProgressStyle::with_template(template)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        bar.set_prefix(label.to_string());
        Self { bar }
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Installs the global logger (filter from `RUST_LOG`, default `info`)
/// wrapped so that it cooperates with the returned [`MultiProgress`].
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    // A second init (tests) keeps the first logger.
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_bar_tracks_position() {
        let multi = MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden());
        let progress = IndicatifProgress::new(&multi, "split", "{pos}/{len}");

        progress.set_total(4);
        progress.inc(1);
        progress.inc(2);
        assert_eq!(progress.bar.length(), Some(4));
        assert_eq!(progress.bar.position(), 3);
        assert!(!progress.bar.is_finished());

        progress.finish("done".to_string());
        assert!(progress.bar.is_finished());
        assert_eq!(progress.bar.message(), "done");
    }

    #[test]
    fn set_total_resets_position() {
        let multi = MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden());
        let progress = IndicatifProgress::new(&multi, "upload", "{pos}/{len}");

        progress.set_total(2);
        progress.inc(2);
        progress.set_total(5);

        assert_eq!(progress.bar.length(), Some(5));
        assert_eq!(progress.bar.position(), 0);
    }

    #[test]
    fn init_logger_twice_does_not_panic() {
        let _first = init_logger();
        let _second = init_logger();
        log::info!("logger initialized");
    }
}
