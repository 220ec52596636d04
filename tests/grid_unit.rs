//! Unit tests for block extraction, deduplication, and grid labeling.
//!
//! These tests run the pure text stages against realistic transcripts:
//! - Marker block extraction
//! - Duplicate suppression
//! - Black/white/unknown labeling
//! - Rasterization of labeled grids

use shell_qr::block::{last_block, Block, BlockTracker, BEGIN_MARKER, END_MARKER};
use shell_qr::grid::{Cell, Grid, GridError};
use shell_qr::raster::{render, RasterOptions};

/// 7x7 finder pattern drawn with '#' (black) and '.' (white).
const FINDER: [&str; 7] = [
    "#######", "#.....#", "#.###.#", "#.###.#", "#.###.#", "#.....#", "#######",
];

fn transcript(blocks: &[&[&str]]) -> String {
    let mut text = String::from("$ ./show-qr\n");
    for rows in blocks {
        text.push_str(BEGIN_MARKER);
        text.push('\n');
        for row in rows.iter() {
            text.push_str(row);
            text.push('\n');
        }
        text.push_str(END_MARKER);
        text.push_str("\n$ ");
    }
    text
}

// ==================== Extraction Tests ====================

#[test]
fn test_extract_rows_between_markers() {
    let text = transcript(&[&FINDER]);
    let block = last_block(&text).unwrap();
    assert_eq!(block.rows(), FINDER);
}

#[test]
fn test_extract_uses_last_of_several_blocks() {
    let text = transcript(&[&["AB", "CD"], &FINDER, &["##", "#."]]);
    let block = last_block(&text).unwrap();
    assert_eq!(block.rows(), ["##", "#."]);
}

#[test]
fn test_extract_half_written_block_is_ignored() {
    // Complete block followed by a block still being printed
    let mut text = transcript(&[&FINDER]);
    text.push_str(BEGIN_MARKER);
    text.push_str("\n#######\n#.....#\n");
    assert!(last_block(&text).is_none());

    // Once the END marker arrives, the new block wins
    text.push_str(END_MARKER);
    text.push('\n');
    assert_eq!(last_block(&text).unwrap().rows(), ["#######", "#.....#"]);
}

#[test]
fn test_extract_without_markers() {
    assert!(last_block("$ ls\nCargo.toml src\n").is_none());
}

// ==================== Deduplication Tests ====================

#[test]
fn test_tracker_only_emits_changes() {
    let mut tracker = BlockTracker::new();
    let mut emitted = 0;

    let mut text = transcript(&[&FINDER]);
    for _ in 0..3 {
        if let Some(block) = last_block(&text) {
            if tracker.accept(block).is_some() {
                emitted += 1;
            }
        }
        // Unrelated output keeps arriving
        text.push_str("ls\nfoo\n");
    }
    assert_eq!(emitted, 1);

    text.push_str(&transcript(&[&["##", "#."]]));
    let block = last_block(&text).unwrap();
    assert!(tracker.accept(block).is_some());
}

#[test]
fn test_same_content_new_block_is_suppressed() {
    // The same grid printed twice is not emitted twice
    let mut tracker = BlockTracker::new();
    let first = last_block(&transcript(&[&FINDER])).unwrap();
    let second = last_block(&transcript(&[&FINDER, &FINDER])).unwrap();
    assert!(tracker.accept(first).is_some());
    assert!(tracker.accept(second).is_none());
}

// ==================== Labeling Tests ====================

#[test]
fn test_label_finder_pattern() {
    let block = last_block(&transcript(&[&FINDER])).unwrap();
    let labeled = Grid::from_block(&block).label().unwrap();

    assert_eq!(labeled.width(), 7);
    assert_eq!(labeled.height(), 7);
    assert_eq!(labeled.get(0, 0), Some(Cell::Black));
    assert_eq!(labeled.get(1, 1), Some(Cell::White));
    assert_eq!(labeled.get(3, 3), Some(Cell::Black));

    let counts = labeled.counts();
    assert_eq!(counts.black, 33);
    assert_eq!(counts.white, 16);
    assert_eq!(counts.unknown, 0);
}

#[test]
fn test_label_unknown_characters() {
    let block = Block::new(vec!["##x".to_string(), "#.#".to_string()]);
    let labeled = Grid::from_block(&block).label().unwrap();
    assert_eq!(labeled.get(0, 2), Some(Cell::Unknown));
    assert_eq!(labeled.counts().unknown, 1);
}

#[test]
fn test_label_single_row_block() {
    let block = Block::new(vec!["#######".to_string()]);
    assert_eq!(
        Grid::from_block(&block).label(),
        Err(GridError::TooSmall { rows: 1 })
    );
}

#[test]
fn test_preview_symbols() {
    let block = last_block(&transcript(&[&FINDER])).unwrap();
    let labeled = Grid::from_block(&block).label().unwrap();
    let preview = labeled.to_symbols();
    let lines: Vec<&str> = preview.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], "███████");
    assert_eq!(lines[1], "█     █");
    assert_eq!(lines[2], "█ ███ █");
}

// ==================== Raster Tests ====================

#[test]
fn test_render_finder_pattern() {
    let block = last_block(&transcript(&[&FINDER])).unwrap();
    let labeled = Grid::from_block(&block).label().unwrap();

    let img = render(&labeled, &RasterOptions { scale: 3, border: 6 }).unwrap();
    assert_eq!(img.dimensions(), (7 * 3 + 12, 7 * 3 + 12));

    // Top-left module is black, center of ring is white
    assert_eq!(img.get_pixel(6, 6).0, [0, 0, 0, 255]);
    assert_eq!(img.get_pixel(6 + 3, 6 + 3).0, [255, 255, 255, 255]);
    assert_eq!(img.get_pixel(6 + 9, 6 + 9).0, [0, 0, 0, 255]);
}

#[test]
fn test_render_size_uses_grid_not_row_count_squared() {
    // Wide, short grid renders as a rectangle
    let block = Block::new(vec!["#.#.#.#.".to_string(), "#.#.#.#.".to_string()]);
    let labeled = Grid::from_block(&block).label().unwrap();
    let img = render(&labeled, &RasterOptions::default()).unwrap();
    assert_eq!(img.dimensions(), (8, 2));
}
