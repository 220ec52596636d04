//! Marker block extraction from a growing terminal transcript.
//!
//! A block is the run of lines strictly between the last line containing
//! [`BEGIN_MARKER`] and the last line containing [`END_MARKER`]. Only the most
//! recent block in the file is ever considered.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Line marker that opens a QR block.
pub const BEGIN_MARKER: &str = "===BEGIN QR CODE===";

/// Line marker that closes a QR block.
pub const END_MARKER: &str = "===END QR CODE===";

/// Errors that can occur when reading a transcript.
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    #[error("Failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Rows of text extracted verbatim from between the markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    rows: Vec<String>,
}

impl Block {
    pub fn new(rows: Vec<String>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Short content hash of the block.
    ///
    /// Returns a 12-character hex string (first 6 bytes of SHA256 over the
    /// rows joined with `\n`). Identical blocks always share a fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                hasher.update(b"\n");
            }
            hasher.update(row.as_bytes());
        }
        let result = hasher.finalize();
        hex::encode(&result[..6])
    }
}

/// Find the last marker block in `text`.
///
/// Returns `None` if either marker is missing, or if the last BEGIN line does
/// not come before the last END line (a block that is still being written).
pub fn last_block(text: &str) -> Option<Block> {
    let mut begin = None;
    let mut end = None;

    for (i, line) in text.lines().enumerate() {
        if line.contains(BEGIN_MARKER) {
            begin = Some(i);
        }
        if line.contains(END_MARKER) {
            end = Some(i);
        }
    }

    let (begin, end) = (begin?, end?);
    if begin >= end {
        return None;
    }

    let rows = text
        .lines()
        .skip(begin + 1)
        .take(end - begin - 1)
        .map(str::to_string)
        .collect();
    Some(Block::new(rows))
}

/// Read `path` and return its last marker block, if any.
///
/// Invalid UTF-8 is replaced rather than rejected, since transcripts often
/// carry stray control bytes.
pub fn read_last_block(path: &Path) -> Result<Option<Block>, BlockError> {
    let bytes = std::fs::read(path).map_err(|source| BlockError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(last_block(&String::from_utf8_lossy(&bytes)))
}

/// Suppresses blocks identical to the last one emitted.
#[derive(Debug, Default)]
pub struct BlockTracker {
    last: Option<Block>,
}

impl BlockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the block if it is new, recording it as the last emitted one.
    ///
    /// Empty blocks are never emitted and do not reset the tracker.
    pub fn accept(&mut self, block: Block) -> Option<Block> {
        if block.is_empty() || self.last.as_ref() == Some(&block) {
            return None;
        }
        self.last = Some(block.clone());
        Some(block)
    }

    pub fn last(&self) -> Option<&Block> {
        self.last.as_ref()
    }
}
