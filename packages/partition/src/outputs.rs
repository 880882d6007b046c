//! Discovery and cleanup of daily output files.
//!
//! Both operations match `<output_dir>/<file_prefix>*`, so anything that
//! looks like a daily file is treated as one, whether or not the current
//! run wrote it.

use std::path::{Path, PathBuf};

use crate::PartitionError;

/// Lists every path in `dir` whose name starts with `prefix`, sorted.
///
/// A missing directory yields an empty list.
///
/// # Errors
///
/// Returns [`PartitionError::EmptyPrefix`] if `prefix` is blank,
/// [`PartitionError::Pattern`] if the pattern cannot be built, or
/// [`PartitionError::Glob`] if a matching entry cannot be read.
pub fn list_outputs(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, PartitionError> {
    if prefix.trim().is_empty() {
        return Err(PartitionError::EmptyPrefix);
    }

    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&escaped_dir).join(format!("{}*", glob::Pattern::escape(prefix)));

    let mut paths = glob::glob(&pattern.to_string_lossy())?.collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
}

/// Deletes every existing daily output file in `dir`.
///
/// Returns the number of files removed. Nothing to delete is not an error;
/// a failed deletion is, and stops the cleanup at that file.
///
/// # Errors
///
/// Returns [`PartitionError::Io`] if a file cannot be removed, or any error
/// from [`list_outputs`].
pub fn clear_outputs(dir: &Path, prefix: &str) -> Result<u64, PartitionError> {
    let mut removed = 0;
    for path in list_outputs(dir, prefix)? {
        std::fs::remove_file(&path).map_err(|source| PartitionError::Io {
            path: path.clone(),
            source,
        })?;
        log::debug!("Removed stale output {}", path.display());
        removed += 1;
    }

    if removed > 0 {
        log::info!("Removed {removed} stale output file(s) from {}", dir.display());
    }
    Ok(removed)
}
