//! Polling file watcher.
//!
//! Detects changes by comparing file size and modification time at a fixed
//! interval. Transcripts are usually written by another process appending to
//! the file, so size alone catches almost everything; mtime covers rewrites
//! of the same length.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

/// Default interval between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Shortest accepted poll interval in milliseconds.
pub const MIN_POLL_INTERVAL_MS: u64 = 10;
/// Longest accepted poll interval in milliseconds.
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;

/// Upper bound on how long a waiting watcher goes without checking its stop flag.
const STOP_CHECK_SLICE: Duration = Duration::from_millis(100);

/// Errors that can occur while watching a file.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Failed to stat '{}': {source}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Size and modification time of a file at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSnapshot {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl FileSnapshot {
    pub fn take(path: &Path) -> Result<Self, WatchError> {
        let meta = std::fs::metadata(path).map_err(|source| WatchError::Stat {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            len: meta.len(),
            // Not every platform reports mtime
            modified: meta.modified().ok(),
        })
    }
}

/// Polls a file until its snapshot changes.
#[derive(Debug)]
pub struct FileWatcher {
    path: PathBuf,
    interval: Duration,
    last: FileSnapshot,
}

impl FileWatcher {
    /// Start watching `path`. Fails if the file cannot be stat'ed.
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Result<Self, WatchError> {
        let path = path.into();
        let last = FileSnapshot::take(&path)?;
        Ok(Self {
            path,
            interval,
            last,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_snapshot(&self) -> FileSnapshot {
        self.last
    }

    /// Block until the file differs from the last reported snapshot.
    ///
    /// Returns `Ok(true)` on change and `Ok(false)` once `stop` is set. The
    /// flag is checked at least every 100 ms, however long the interval.
    pub fn wait_for_change(&mut self, stop: &AtomicBool) -> Result<bool, WatchError> {
        loop {
            if stop.load(Ordering::Relaxed) {
                return Ok(false);
            }

            let current = FileSnapshot::take(&self.path)?;
            if current != self.last {
                log::debug!(
                    "{} changed: {} -> {} bytes",
                    self.path.display(),
                    self.last.len,
                    current.len
                );
                self.last = current;
                return Ok(true);
            }

            if !sleep_unless_stopped(self.interval, stop) {
                return Ok(false);
            }
        }
    }
}

/// Sleep for `total` in short slices. Returns `false` if `stop` was set first.
fn sleep_unless_stopped(total: Duration, stop: &AtomicBool) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(STOP_CHECK_SLICE));
    }
}
