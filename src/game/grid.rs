//! Grid Geometry
//!
//! Cell coordinates and wall canonicalization for the maze grid.
//! A wall key identifies the single physical boundary between two
//! adjacent cells, regardless of which direction it is crossed from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single cell on the grid, addressed by zero-based row and column.
///
/// Crosses the wire as a `"row-col"` string (e.g. `"0-2"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cell {
    /// Zero-based row index.
    pub row: u16,
    /// Zero-based column index.
    pub col: u16,
}

impl Cell {
    /// Create a cell from row and column indices.
    pub fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to another cell.
    pub fn distance(&self, other: &Cell) -> u32 {
        u32::from(self.row.abs_diff(other.row)) + u32::from(self.col.abs_diff(other.col))
    }

    /// Human-readable coordinate label: column as a letter, row 1-based.
    /// Row 0 col 0 is `A1`.
    pub fn label(&self) -> String {
        let letter = char::from_u32(u32::from('A') + u32::from(self.col)).unwrap_or('?');
        format!("{}{}", letter, self.row + 1)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

/// Error parsing a `"row-col"` cell string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid cell coordinate: {0:?}")]
pub struct CellParseError(String);

impl FromStr for Cell {
    type Err = CellParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s
            .split_once('-')
            .ok_or_else(|| CellParseError(s.to_string()))?;
        let row = row.parse().map_err(|_| CellParseError(s.to_string()))?;
        let col = col.parse().map_err(|_| CellParseError(s.to_string()))?;
        Ok(Cell { row, col })
    }
}

impl TryFrom<String> for Cell {
    type Error = CellParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Cell> for String {
    fn from(cell: Cell) -> Self {
        cell.to_string()
    }
}

/// Canonical identifier for the boundary between two adjacent cells.
///
/// Both crossing directions of the same boundary map to the same key.
/// The key always carries the larger index of the cell pair along the
/// movement axis: `v-row-max(col)` for horizontal moves, `h-max(row)-col`
/// for vertical moves. Clients encode boards with the same rule, so this
/// must not be changed to the smaller index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wall {
    /// Vertical wall between horizontally adjacent cells.
    Vertical {
        /// Row shared by both cells.
        row: u16,
        /// Larger column of the cell pair.
        col: u16,
    },
    /// Horizontal wall between vertically adjacent cells.
    Horizontal {
        /// Larger row of the cell pair.
        row: u16,
        /// Column shared by both cells.
        col: u16,
    },
}

impl fmt::Display for Wall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wall::Vertical { row, col } => write!(f, "v-{}-{}", row, col),
            Wall::Horizontal { row, col } => write!(f, "h-{}-{}", row, col),
        }
    }
}

/// Resolve the wall separating two cells.
///
/// Returns `None` when the cells are not adjacent (Manhattan distance
/// other than 1); no wall lookup is meaningful for such a pair.
pub fn wall_between(from: Cell, to: Cell) -> Option<Wall> {
    if from.distance(&to) != 1 {
        return None;
    }

    if from.row == to.row {
        Some(Wall::Vertical {
            row: from.row,
            col: from.col.max(to.col),
        })
    } else {
        Some(Wall::Horizontal {
            row: from.row.max(to.row),
            col: from.col,
        })
    }
}

/// Format a move as a human-readable label, e.g. `A1-B1`.
pub fn move_label(from: Cell, to: Cell) -> String {
    format!("{}-{}", from.label(), to.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cell_parse_and_display() {
        let cell: Cell = "3-7".parse().unwrap();
        assert_eq!(cell, Cell::new(3, 7));
        assert_eq!(cell.to_string(), "3-7");
    }

    #[test]
    fn test_cell_parse_rejects_garbage() {
        assert!("".parse::<Cell>().is_err());
        assert!("3".parse::<Cell>().is_err());
        assert!("a-b".parse::<Cell>().is_err());
        assert!("1-2-3".parse::<Cell>().is_err());
        assert!("0--1".parse::<Cell>().is_err());
    }

    #[test]
    fn test_cell_label() {
        assert_eq!(Cell::new(0, 0).label(), "A1");
        assert_eq!(Cell::new(4, 2).label(), "C5");
    }

    #[test]
    fn test_move_label() {
        assert_eq!(move_label(Cell::new(0, 0), Cell::new(0, 1)), "A1-B1");
    }

    #[test]
    fn test_non_adjacent_has_no_wall() {
        assert!(wall_between(Cell::new(0, 0), Cell::new(0, 0)).is_none());
        assert!(wall_between(Cell::new(0, 0), Cell::new(2, 2)).is_none());
        assert!(wall_between(Cell::new(0, 0), Cell::new(1, 1)).is_none());
    }

    #[test]
    fn test_horizontal_move_takes_larger_column() {
        // Rightward: wall keyed by the destination column
        let wall = wall_between(Cell::new(0, 0), Cell::new(0, 1)).unwrap();
        assert_eq!(wall.to_string(), "v-0-1");

        // Leftward crosses the same physical boundary
        let wall = wall_between(Cell::new(0, 1), Cell::new(0, 0)).unwrap();
        assert_eq!(wall.to_string(), "v-0-1");
    }

    #[test]
    fn test_vertical_move_takes_larger_row() {
        let down = wall_between(Cell::new(1, 3), Cell::new(2, 3)).unwrap();
        assert_eq!(down.to_string(), "h-2-3");

        let up = wall_between(Cell::new(2, 3), Cell::new(1, 3)).unwrap();
        assert_eq!(up.to_string(), "h-2-3");
    }

    #[test]
    fn test_cell_json_roundtrip() {
        let cell = Cell::new(2, 5);
        let json = serde_json::to_string(&cell).unwrap();
        assert_eq!(json, "\"2-5\"");
        let parsed: Cell = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cell);
    }

    proptest! {
        #[test]
        fn prop_wall_is_direction_independent(row in 0u16..100, col in 0u16..100) {
            let a = Cell::new(row, col);
            for b in [
                Cell::new(row, col + 1),
                Cell::new(row + 1, col),
            ] {
                prop_assert_eq!(wall_between(a, b), wall_between(b, a));
            }
        }

        #[test]
        fn prop_only_unit_distance_yields_wall(
            r1 in 0u16..50, c1 in 0u16..50,
            r2 in 0u16..50, c2 in 0u16..50,
        ) {
            let a = Cell::new(r1, c1);
            let b = Cell::new(r2, c2);
            prop_assert_eq!(wall_between(a, b).is_some(), a.distance(&b) == 1);
        }
    }
}
