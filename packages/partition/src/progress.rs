//! Progress reporting for the split and upload loops.
//!
//! Library code reports through [`ProgressCallback`]; the binary decides how
//! to render it (an `indicatif` bar in `crime_split_cli_utils`). Tests and
//! non-interactive callers pass [`null_progress`].

use std::sync::Arc;

/// Receives progress updates from a sequential batch of work.
pub trait ProgressCallback: Send + Sync {
    /// Sets the total number of units (days or files) in the batch.
    fn set_total(&self, total: u64);

    /// Advances by `delta` units.
    fn inc(&self, delta: u64);

    /// Replaces the message shown next to the indicator.
    fn set_message(&self, msg: String);

    /// Marks the batch complete.
    fn finish(&self, msg: String);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
