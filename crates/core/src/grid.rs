//! Grid module - the playfield
//!
//! The grid is `width × height` cells (11 × 22 by default) stored as a flat row-major
//! vector. Coordinates are (x, y): x grows to the right, y grows downward, row 0 is the
//! top row.
//!
//! The grid only stores cells and answers questions about them. Pieces write into it
//! when they lock, and the line clear engine is the only thing that moves rows.

use arrayvec::ArrayVec;
use serde::Serialize;

use crate::catalog::{Mask, MAX_MASK_CELLS};
use crate::types::{Rgba, ShapeTier, GRID_HEIGHT, GRID_WIDTH};

/// Cells written by one `set_cells` call, as (x, y).
pub type WrittenCells = ArrayVec<(i8, i8), MAX_MASK_CELLS>;

/// A single playfield cell.
///
/// An unoccupied cell always carries the empty color and `ShapeTier::Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Cell {
    pub occupied: bool,
    pub color: Rgba,
    pub tier: ShapeTier,
    /// Petrified cells keep their row from ever counting as full.
    pub hardened: bool,
    /// Ticks this cell has survived since it was filled.
    pub harden_age: u32,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        occupied: false,
        color: Rgba::EMPTY,
        tier: ShapeTier::Empty,
        hardened: false,
        harden_age: 0,
    };

    pub fn filled(color: Rgba, tier: ShapeTier) -> Self {
        Self {
            occupied: true,
            color,
            tier,
            hardened: false,
            harden_age: 0,
        }
    }
}

/// The playfield.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u8,
    height: u8,
    /// Row-major (y * width + x)
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an empty grid with the reference 11 × 22 dimensions.
    pub fn new() -> Self {
        Self::with_size(GRID_WIDTH, GRID_HEIGHT)
    }

    /// Create an empty grid with custom dimensions.
    pub fn with_size(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; width as usize * height as usize],
        }
    }

    /// Build a grid from ASCII rows (top first); `#` marks an occupied basic cell.
    ///
    /// Used by tests and benchmarks to set up positions.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let height = rows.len() as u8;
        let width = rows.first().map_or(0, |r| r.len()) as u8;
        let mut grid = Self::with_size(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.bytes().enumerate() {
                if ch == b'#' {
                    grid.fill_cell(x as i8, y as i8, Rgba::opaque(128, 128, 128), ShapeTier::Basic);
                }
            }
        }
        grid
    }

    #[inline(always)]
    fn index(&self, x: i8, y: i8) -> Option<usize> {
        if x < 0 || y < 0 || x as i16 >= self.width as i16 || y as i16 >= self.height as i16 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Cell at (x, y), or `None` when out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Overwrite the cell at (x, y). Returns false if out of bounds.
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// Mark (x, y) occupied with the given color and tier.
    pub fn fill_cell(&mut self, x: i8, y: i8, color: Rgba, tier: ShapeTier) -> bool {
        self.set(x, y, Cell::filled(color, tier))
    }

    /// Reset (x, y) to empty. Returns false if out of bounds.
    pub fn clear_cell(&mut self, x: i8, y: i8) -> bool {
        self.set(x, y, Cell::EMPTY)
    }

    /// Within bounds and filled
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        self.get(x, y).is_some_and(|c| c.occupied)
    }

    pub fn row(&self, y: usize) -> &[Cell] {
        let w = self.width as usize;
        &self.cells[y * w..(y + 1) * w]
    }

    /// Every cell occupied and none hardened.
    pub fn is_full_row(&self, y: usize) -> bool {
        if y >= self.height as usize {
            return false;
        }
        self.row(y).iter().all(|c| c.occupied && !c.hardened)
    }

    /// Row has no occupied cells
    pub fn is_empty_row(&self, y: usize) -> bool {
        y < self.height as usize && self.row(y).iter().all(|c| !c.occupied)
    }

    /// Write an occupied cell for every mask block that lands in bounds.
    ///
    /// The mask origin sits at (`col_offset`, `row_offset`). The caller validates the
    /// placement with a collision check first. Returns the cells written; blocks that
    /// fall outside the grid are skipped.
    pub fn set_cells(
        &mut self,
        row_offset: i8,
        col_offset: i8,
        mask: &Mask,
        color: Rgba,
        tier: ShapeTier,
    ) -> WrittenCells {
        let mut written = WrittenCells::new();
        for (dx, dy) in mask.blocks() {
            let (x, y) = (col_offset + dx, row_offset + dy);
            if self.fill_cell(x, y, color, tier) {
                written.push((x, y));
            }
        }
        written
    }

    /// Copy row `src` over row `dst`.
    pub fn copy_row(&mut self, src: usize, dst: usize) {
        let w = self.width as usize;
        self.cells.copy_within(src * w..(src + 1) * w, dst * w);
    }

    /// Reset every cell of row `y` to empty.
    pub fn clear_row(&mut self, y: usize) {
        let w = self.width as usize;
        self.cells[y * w..(y + 1) * w].fill(Cell::EMPTY);
    }

    /// Advance the age of every occupied cell by one tick and harden those that
    /// reach `after_ticks`. Returns how many cells hardened on this call.
    pub fn age_cells(&mut self, after_ticks: u32) -> usize {
        let mut hardened = 0;
        for cell in self.cells.iter_mut().filter(|c| c.occupied && !c.hardened) {
            cell.harden_age = cell.harden_age.saturating_add(1);
            if cell.harden_age >= after_ticks {
                cell.hardened = true;
                hardened += 1;
            }
        }
        hardened
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.occupied).count()
    }

    /// Height of column `x` measured from the floor (0 for an empty column).
    pub fn column_height(&self, x: i8) -> u8 {
        (0..self.height as i8)
            .find(|&y| self.is_occupied(x, y))
            .map_or(0, |top| self.height - top as u8)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Empty the whole grid
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// ASCII rendering (top first) for tests and debugging.
    pub fn to_ascii(&self) -> Vec<String> {
        (0..self.height as usize)
            .map(|y| {
                self.row(y)
                    .iter()
                    .map(|c| if c.occupied { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
