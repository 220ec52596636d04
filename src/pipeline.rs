//! Watch → extract → label pipeline.
//!
//! Two background threads connected by rendezvous channels:
//!
//! 1. **producer** - waits for the transcript to change, re-reads it, and
//!    forwards the last marker block when it differs from the previous one
//! 2. **labeler** - turns each block into a [`LabeledGrid`]
//!
//! The caller receives [`LabeledBlock`]s from [`Pipeline::recv`]. Stat and
//! read errors are fatal: the producer forwards the error once and exits,
//! which closes every channel behind it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::block::{read_last_block, Block, BlockError, BlockTracker};
use crate::grid::{Grid, GridError, LabeledGrid};
use crate::watch::{FileWatcher, WatchError, DEFAULT_POLL_INTERVAL};

/// Errors that can occur during pipeline operations
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error(transparent)]
    Block(#[from] BlockError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("Failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// A block together with its labeled grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledBlock {
    pub block: Block,
    pub grid: LabeledGrid,
}

impl LabeledBlock {
    pub fn from_block(block: Block) -> Result<Self, GridError> {
        let grid = Grid::from_block(&block).label()?;
        Ok(Self { block, grid })
    }
}

/// Settings for the background pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Transcript to watch
    pub path: PathBuf,
    /// Interval between file polls
    pub poll_interval: Duration,
    /// Scan the current contents once before waiting for the first change
    pub scan_existing: bool,
}

impl PipelineSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            scan_existing: false,
        }
    }
}

type BlockResult = Result<Block, PipelineError>;
type LabeledResult = Result<LabeledBlock, PipelineError>;

/// Handle to the running pipeline threads.
pub struct Pipeline {
    rx: Option<Receiver<LabeledResult>>,
    stop: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
}

impl Pipeline {
    /// Start the producer and labeler threads.
    ///
    /// The file is stat'ed before this returns, so a missing transcript fails
    /// here and any write after `spawn` counts as a change. Setting `stop`
    /// ends the producer at its next poll; the labeler follows once its input
    /// channel closes.
    pub fn spawn(settings: PipelineSettings, stop: Arc<AtomicBool>) -> Result<Self, PipelineError> {
        let watcher = FileWatcher::new(&settings.path, settings.poll_interval)?;
        let (block_tx, block_rx) = mpsc::sync_channel::<BlockResult>(0);
        let (labeled_tx, labeled_rx) = mpsc::sync_channel::<LabeledResult>(0);

        let producer = {
            let stop = stop.clone();
            let scan_existing = settings.scan_existing;
            thread::Builder::new()
                .name("shell-qr-watch".to_string())
                .spawn(move || run_producer(watcher, scan_existing, &stop, block_tx))
                .map_err(|source| PipelineError::Spawn {
                    name: "watch",
                    source,
                })?
        };

        let labeler = thread::Builder::new()
            .name("shell-qr-label".to_string())
            .spawn(move || run_labeler(block_rx, labeled_tx))
            .map_err(|source| PipelineError::Spawn {
                name: "label",
                source,
            })?;

        Ok(Self {
            rx: Some(labeled_rx),
            stop,
            threads: vec![producer, labeler],
        })
    }

    /// Block until the next labeled block arrives.
    ///
    /// Returns `None` once the pipeline has shut down.
    pub fn recv(&self) -> Option<LabeledResult> {
        self.rx.as_ref()?.recv().ok()
    }

    /// Like [`Pipeline::recv`], giving up after `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<LabeledResult, RecvTimeoutError> {
        match self.rx.as_ref() {
            Some(rx) => rx.recv_timeout(timeout),
            None => Err(RecvTimeoutError::Disconnected),
        }
    }

    /// Stop the threads and wait for them to exit.
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        // Dropping the receiver unblocks a labeler waiting on send
        self.rx = None;
        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                log::error!("Pipeline thread panicked");
            }
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

impl Iterator for Pipeline {
    type Item = LabeledResult;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

/// Read `path` once and label its last block.
///
/// Returns `Ok(None)` when the file holds no complete block.
pub fn run_once(path: &Path) -> Result<Option<LabeledBlock>, PipelineError> {
    match read_last_block(path)? {
        Some(block) if !block.is_empty() => Ok(Some(LabeledBlock::from_block(block)?)),
        _ => Ok(None),
    }
}

/// Check the file for a new block. Returns `Ok(None)` for "no new data".
fn poll_block(path: &Path, tracker: &mut BlockTracker) -> Result<Option<Block>, PipelineError> {
    match read_last_block(path)? {
        Some(block) => {
            let block = tracker.accept(block);
            if block.is_none() {
                log::debug!("No new block in {}", path.display());
            }
            Ok(block)
        }
        None => {
            log::debug!("No complete block in {}", path.display());
            Ok(None)
        }
    }
}

fn run_producer(
    mut watcher: FileWatcher,
    scan_existing: bool,
    stop: &AtomicBool,
    tx: SyncSender<BlockResult>,
) {
    let path = watcher.path().to_path_buf();
    let mut tracker = BlockTracker::new();

    log::info!("Watching {} (every {:?})", path.display(), watcher.interval());

    let mut check_now = scan_existing;
    loop {
        if !check_now {
            match watcher.wait_for_change(stop) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    let _ = tx.send(Err(e.into()));
                    return;
                }
            }
        }
        check_now = false;

        match poll_block(&path, &mut tracker) {
            Ok(Some(block)) => {
                log::info!(
                    "New block {} ({} rows)",
                    block.fingerprint(),
                    block.len()
                );
                if tx.send(Ok(block)).is_err() {
                    // Downstream hung up
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        }
    }

    log::debug!("Watcher for {} stopped", path.display());
}

fn run_labeler(rx: Receiver<BlockResult>, tx: SyncSender<LabeledResult>) {
    for item in rx {
        let out = match item {
            Ok(block) => {
                let fingerprint = block.fingerprint();
                match LabeledBlock::from_block(block) {
                    Ok(labeled) => Ok(labeled),
                    Err(e) => {
                        log::warn!("Skipping block {}: {}", fingerprint, e);
                        continue;
                    }
                }
            }
            Err(e) => Err(e),
        };

        if tx.send(out).is_err() {
            break;
        }
    }
}

/// Set up the Ctrl+C handler.
///
/// This should be called once at program startup.
pub fn setup_ctrlc_handler(stop: Arc<AtomicBool>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        stop.store(true, Ordering::SeqCst);
        eprintln!("\nReceived Ctrl+C, shutting down...");
    })
}
