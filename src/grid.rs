//! Character grids and their black/white labeling.

use std::fmt;

use crate::block::Block;

/// Symbol used for black cells in the console preview.
pub const BLACK_SYMBOL: char = '█';

/// Symbol used for white cells in the console preview.
pub const WHITE_SYMBOL: char = ' ';

/// Symbol used for cells matching neither reference character.
pub const UNKNOWN_SYMBOL: char = '?';

/// Errors that can occur when labeling a grid.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GridError {
    #[error("Grid too small to label: {rows} row(s), need a cell at (1,1)")]
    TooSmall { rows: usize },
}

/// Color label for a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Black,
    White,
    /// Matches neither reference character.
    Unknown,
}

impl Cell {
    pub fn symbol(&self) -> char {
        match self {
            Cell::Black => BLACK_SYMBOL,
            Cell::White => WHITE_SYMBOL,
            Cell::Unknown => UNKNOWN_SYMBOL,
        }
    }
}

/// A block split into rows of characters. Rows may differ in length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<char>>,
}

impl Grid {
    pub fn from_block(block: &Block) -> Self {
        Self {
            rows: block.rows().iter().map(|r| r.chars().collect()).collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    pub fn get(&self, row: usize, col: usize) -> Option<char> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Label every cell as black, white, or unknown.
    ///
    /// The character at (0,0) is taken as black and the character at (1,1)
    /// as white. When both are the same character, matching cells are black.
    pub fn label(&self) -> Result<LabeledGrid, GridError> {
        let (black, white) = match (self.get(0, 0), self.get(1, 1)) {
            (Some(b), Some(w)) => (b, w),
            _ => {
                return Err(GridError::TooSmall {
                    rows: self.rows.len(),
                })
            }
        };

        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&c| {
                        if c == black {
                            Cell::Black
                        } else if c == white {
                            Cell::White
                        } else {
                            Cell::Unknown
                        }
                    })
                    .collect()
            })
            .collect();

        Ok(LabeledGrid { rows })
    }
}

/// Cell totals for a labeled grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellCounts {
    pub black: usize,
    pub white: usize,
    pub unknown: usize,
}

/// A grid where every character has been replaced by a [`Cell`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledGrid {
    rows: Vec<Vec<Cell>>,
}

impl LabeledGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0
    }

    pub fn counts(&self) -> CellCounts {
        let mut counts = CellCounts::default();
        for cell in self.rows.iter().flatten() {
            match cell {
                Cell::Black => counts.black += 1,
                Cell::White => counts.white += 1,
                Cell::Unknown => counts.unknown += 1,
            }
        }
        counts
    }

    /// Render as block symbols, one line per row.
    pub fn to_symbols(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.iter().map(Cell::symbol).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for LabeledGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_symbols())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> Grid {
        Grid::from_block(&Block::new(rows.iter().map(|r| r.to_string()).collect()))
    }

    #[test]
    fn test_label_reference_cells() {
        let labeled = grid(&["#.#", ".#.", "#.#"]).label().unwrap();
        // (1,1) is '#', same as (0,0), so both references are black
        assert_eq!(labeled.get(0, 0), Some(Cell::Black));
        assert_eq!(labeled.get(0, 1), Some(Cell::Unknown));
    }

    #[test]
    fn test_label_black_and_white() {
        let labeled = grid(&["##", "#."]).label().unwrap();
        assert_eq!(
            labeled.rows(),
            &[
                vec![Cell::Black, Cell::Black],
                vec![Cell::Black, Cell::White]
            ]
        );
    }

    #[test]
    fn test_label_unicode_blocks() {
        let labeled = grid(&["█▀█", "█ █", "▀▀▀"]).label().unwrap();
        assert_eq!(labeled.get(0, 0), Some(Cell::Black));
        assert_eq!(labeled.get(1, 1), Some(Cell::White));
        assert_eq!(labeled.get(0, 1), Some(Cell::Unknown));
        assert_eq!(labeled.get(2, 2), Some(Cell::Unknown));
    }

    #[test]
    fn test_label_other_chars_unknown() {
        let labeled = grid(&["XX", "XOZ"]).label().unwrap();
        assert_eq!(labeled.get(1, 1), Some(Cell::White));
        assert_eq!(labeled.get(1, 2), Some(Cell::Unknown));
        assert_eq!(
            labeled.counts(),
            CellCounts {
                black: 3,
                white: 1,
                unknown: 1
            }
        );
    }

    #[test]
    fn test_label_ragged_rows() {
        let labeled = grid(&["X", "XO", "XOXO"]).label().unwrap();
        assert_eq!(labeled.height(), 3);
        assert_eq!(labeled.width(), 4);
        assert_eq!(labeled.get(0, 1), None);
    }

    #[test]
    fn test_label_too_small() {
        assert_eq!(grid(&[]).label(), Err(GridError::TooSmall { rows: 0 }));
        assert_eq!(grid(&["XO"]).label(), Err(GridError::TooSmall { rows: 1 }));
        assert_eq!(
            grid(&["XO", "X"]).label(),
            Err(GridError::TooSmall { rows: 2 })
        );
        assert_eq!(
            grid(&["", "XO"]).label(),
            Err(GridError::TooSmall { rows: 2 })
        );
    }

    #[test]
    fn test_to_symbols() {
        let labeled = grid(&["XX", "XOZ"]).label().unwrap();
        assert_eq!(labeled.to_symbols(), "██\n█ ?");
        assert_eq!(labeled.to_string(), labeled.to_symbols());
    }

    #[test]
    fn test_empty_labeled_grid() {
        let labeled = LabeledGrid::new(vec![]);
        assert!(labeled.is_empty());
        assert_eq!(labeled.width(), 0);
        assert_eq!(labeled.height(), 0);
        assert_eq!(labeled.to_symbols(), "");
    }
}
