use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TILE_SIZE: i32 = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileType {
    #[default]
    None,
    Solid,
    OneWay,
    Coin,
    Question,
    Spin,
}

/// Snapshot of a single grid cell answered by a pixel-space query.
///
/// `row`/`col` are always the grid coordinates of the queried pixel, even
/// when the pixel lies outside the grid; in that case `index` is `None` and
/// `tile_type` is `TileType::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileInfo {
    pub index: Option<u16>,
    pub row: i32,
    pub col: i32,
    pub tile_type: TileType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scroll {
    pub x: i32,
    pub y: i32,
}

pub trait TileWorld {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn tile_at(&self, x: i32, y: i32) -> TileInfo;
    fn set_tile(&mut self, row: i32, col: i32, index: u16) -> bool;
    fn clear_tile(&mut self, row: i32, col: i32) -> bool;
    fn scroll(&self) -> Scroll;
    fn set_scroll(&mut self, scroll: Scroll);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileTypeTable {
    types_by_index: HashMap<u16, TileType>,
}

impl TileTypeTable {
    pub fn from_pairs(pairs: &[(u16, TileType)]) -> Self {
        Self {
            types_by_index: pairs.iter().copied().collect(),
        }
    }

    pub fn tile_type(&self, index: u16) -> TileType {
        self.types_by_index
            .get(&index)
            .copied()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileGridError {
    #[error("tile grid must have at least one row and one column")]
    Empty,
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("row {row} has {actual} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown glyph '{glyph}' at row {row}, col {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    cols: u32,
    rows: u32,
    cells: Vec<Option<u16>>,
    types: TileTypeTable,
    scroll: Scroll,
}

impl TileGrid {
    pub fn new(
        cols: u32,
        rows: u32,
        cells: Vec<Option<u16>>,
        types: TileTypeTable,
    ) -> Result<Self, TileGridError> {
        if cols == 0 || rows == 0 {
            return Err(TileGridError::Empty);
        }
        let expected = cols as usize * rows as usize;
        let actual = cells.len();
        if expected != actual {
            return Err(TileGridError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            cols,
            rows,
            cells,
            types,
            scroll: Scroll::default(),
        })
    }

    pub fn from_rows(
        rows: &[&str],
        legend: &[(char, u16)],
        types: TileTypeTable,
    ) -> Result<Self, TileGridError> {
        let Some(first) = rows.first() else {
            return Err(TileGridError::Empty);
        };
        let expected = first.chars().count();
        let mut cells = Vec::with_capacity(expected * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let actual = line.chars().count();
            if actual != expected {
                return Err(TileGridError::RaggedRow {
                    row,
                    expected,
                    actual,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                if glyph == '.' || glyph == ' ' {
                    cells.push(None);
                    continue;
                }
                let index = legend
                    .iter()
                    .find(|(candidate, _)| *candidate == glyph)
                    .map(|(_, index)| *index)
                    .ok_or(TileGridError::UnknownGlyph { glyph, row, col })?;
                cells.push(Some(index));
            }
        }
        Self::new(expected as u32, rows.len() as u32, cells, types)
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn index_at(&self, row: i32, col: i32) -> Option<u16> {
        self.cell_offset(row, col)
            .and_then(|offset| self.cells.get(offset).copied().flatten())
    }

    pub fn type_at(&self, row: i32, col: i32) -> TileType {
        self.index_at(row, col)
            .map(|index| self.types.tile_type(index))
            .unwrap_or_default()
    }

    fn cell_offset(&self, row: i32, col: i32) -> Option<usize> {
        if row < 0 || col < 0 || row as u32 >= self.rows || col as u32 >= self.cols {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    fn write_cell(&mut self, row: i32, col: i32, value: Option<u16>) -> bool {
        match self.cell_offset(row, col) {
            Some(offset) => {
                self.cells[offset] = value;
                true
            }
            None => false,
        }
    }
}

impl TileWorld for TileGrid {
    fn width(&self) -> i32 {
        self.cols as i32 * TILE_SIZE
    }

    fn height(&self) -> i32 {
        self.rows as i32 * TILE_SIZE
    }

    fn tile_at(&self, x: i32, y: i32) -> TileInfo {
        let row = y.div_euclid(TILE_SIZE);
        let col = x.div_euclid(TILE_SIZE);
        let index = self.index_at(row, col);
        TileInfo {
            index,
            row,
            col,
            tile_type: index
                .map(|index| self.types.tile_type(index))
                .unwrap_or_default(),
        }
    }

    fn set_tile(&mut self, row: i32, col: i32, index: u16) -> bool {
        self.write_cell(row, col, Some(index))
    }

    fn clear_tile(&mut self, row: i32, col: i32) -> bool {
        self.write_cell(row, col, None)
    }

    fn scroll(&self) -> Scroll {
        self.scroll
    }

    fn set_scroll(&mut self, scroll: Scroll) {
        self.scroll = scroll;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_types() -> TileTypeTable {
        TileTypeTable::from_pairs(&[
            (1, TileType::Solid),
            (2, TileType::Coin),
            (3, TileType::Question),
        ])
    }

    fn sample_grid() -> TileGrid {
        TileGrid::from_rows(
            &["..o.", ".?..", "####"],
            &[('#', 1), ('o', 2), ('?', 3)],
            sample_types(),
        )
        .expect("grid")
    }

    #[test]
    fn pixel_query_maps_to_row_and_col() {
        let grid = sample_grid();
        let tile = grid.tile_at(17, 31);
        assert_eq!(tile.row, 1);
        assert_eq!(tile.col, 1);
        assert_eq!(tile.index, Some(3));
        assert_eq!(tile.tile_type, TileType::Question);
    }

    #[test]
    fn dimensions_are_in_pixels() {
        let grid = sample_grid();
        assert_eq!(grid.width(), 64);
        assert_eq!(grid.height(), 48);
    }

    #[test]
    fn out_of_range_queries_are_empty() {
        let grid = sample_grid();
        let left = grid.tile_at(-1, 40);
        assert_eq!(left.col, -1);
        assert_eq!(left.tile_type, TileType::None);
        assert_eq!(grid.tile_at(64, 40).tile_type, TileType::None);
        assert_eq!(grid.tile_at(0, 48).index, None);
    }

    #[test]
    fn unknown_index_has_no_type() {
        let grid = TileGrid::from_rows(&["x"], &[('x', 99)], sample_types()).expect("grid");
        assert_eq!(grid.tile_at(0, 0).index, Some(99));
        assert_eq!(grid.tile_at(0, 0).tile_type, TileType::None);
    }

    #[test]
    fn set_and_clear_mutate_cell() {
        let mut grid = sample_grid();
        assert!(grid.clear_tile(0, 2));
        assert_eq!(grid.type_at(0, 2), TileType::None);
        assert!(grid.set_tile(0, 2, 1));
        assert_eq!(grid.type_at(0, 2), TileType::Solid);
    }

    #[test]
    fn out_of_range_mutations_are_rejected() {
        let mut grid = sample_grid();
        let before = grid.clone();
        assert!(!grid.set_tile(3, 0, 1));
        assert!(!grid.clear_tile(0, -1));
        assert_eq!(grid, before);
    }

    #[test]
    fn new_rejects_count_mismatch() {
        let err = TileGrid::new(2, 2, vec![None; 3], TileTypeTable::default())
            .expect_err("mismatch");
        assert_eq!(
            err,
            TileGridError::TileCountMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn from_rows_reports_ragged_and_unknown() {
        let ragged = TileGrid::from_rows(&["..", "."], &[], TileTypeTable::default())
            .expect_err("ragged");
        assert!(matches!(ragged, TileGridError::RaggedRow { row: 1, .. }));

        let unknown = TileGrid::from_rows(&[".z"], &[], TileTypeTable::default())
            .expect_err("unknown");
        assert_eq!(
            unknown,
            TileGridError::UnknownGlyph {
                glyph: 'z',
                row: 0,
                col: 1
            }
        );
        assert_eq!(
            TileGrid::from_rows(&[], &[], TileTypeTable::default()),
            Err(TileGridError::Empty)
        );
    }

    #[test]
    fn scroll_is_stored() {
        let mut grid = sample_grid();
        grid.set_scroll(Scroll { x: 12, y: 48 });
        assert_eq!(grid.scroll(), Scroll { x: 12, y: 48 });
    }
}
