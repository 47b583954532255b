//! Age-based removal of stored media.

use std::{
    path::Path,
    time::{Duration, SystemTime},
};

use {
    tokio::fs,
    tracing::{debug, info, warn},
};

use crate::error::{Error, Result};

/// Outcome of a single sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: usize,
    /// Entries that could not be inspected or removed.
    pub skipped: usize,
}

/// Delete regular files directly under `dir` last modified more than
/// `max_age` ago.
///
/// Subdirectories and symlinks are left alone and nothing is recursed into.
/// Failing to list `dir`, whether up front or partway through, is an error.
/// Per-file failures are logged and counted in [`SweepReport::skipped`], so
/// a sweep can simply be run again.
pub async fn sweep(dir: &Path, max_age: Duration) -> Result<SweepReport> {
    let list_err = |source| Error::io(format!("failed to read {}", dir.display()), source);
    let mut entries = fs::read_dir(dir).await.map_err(list_err)?;

    let mut report = SweepReport::default();
    let Some(cutoff) = SystemTime::now().checked_sub(max_age) else {
        return Ok(report);
    };

    while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
        let path = entry.path();

        let modified = match entry.metadata().await {
            Ok(meta) if !meta.is_file() => continue,
            Ok(meta) => meta.modified(),
            Err(e) => Err(e),
        };
        let modified = match modified {
            Ok(modified) => modified,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping entry without mtime");
                report.skipped += 1;
                continue;
            },
        };

        if modified >= cutoff {
            continue;
        }

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "removed expired media file");
                report.removed += 1;
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to remove expired media file");
                report.skipped += 1;
            },
        }
    }

    if report.removed > 0 {
        info!(
            dir = %dir.display(),
            removed = report.removed,
            skipped = report.skipped,
            "cleaned up expired media files"
        );
    }

    Ok(report)
}
