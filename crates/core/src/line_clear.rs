//! Line clear engine - full row detection and collapse
//!
//! Rows are scanned bottom to top. A full row is removed by shifting every row above
//! it down by one and emptying the top row; the same index is then checked again
//! because a new row has slid into it.
//!
//! `compact_full_rows` removes all full rows in one pass instead. Both produce the
//! same grid and the same count.

use crate::grid::Grid;

/// Remove every full row and return how many were removed.
pub fn clear_full_lines(grid: &mut Grid) -> usize {
    clear_full_rows(grid).len()
}

/// Remove every full row and return their indices as they were before the clear,
/// bottom to top.
pub fn clear_full_rows(grid: &mut Grid) -> Vec<usize> {
    let height = grid.height() as usize;
    let mut cleared = Vec::new();
    if grid.width() == 0 || !(0..height).any(|y| grid.is_full_row(y)) {
        return cleared;
    }
    // origin[y] = index the row now at y had before any shifting
    let mut origin: Vec<Option<usize>> = (0..height).map(Some).collect();

    let mut y = height;
    while y > 0 {
        let row = y - 1;
        if grid.is_full_row(row) {
            if let Some(original) = origin[row] {
                cleared.push(original);
            }
            for dst in (1..=row).rev() {
                grid.copy_row(dst - 1, dst);
                origin[dst] = origin[dst - 1];
            }
            grid.clear_row(0);
            origin[0] = None;
            // re-check the same index
            continue;
        }
        y -= 1;
    }

    cleared
}

/// Remove all full rows at once with a two-pointer pass.
pub fn compact_full_rows(grid: &mut Grid) -> usize {
    let height = grid.height() as usize;
    let mut write_y = height;
    let mut removed = 0;

    for read_y in (0..height).rev() {
        if grid.is_full_row(read_y) {
            removed += 1;
        } else {
            write_y -= 1;
            if write_y != read_y {
                grid.copy_row(read_y, write_y);
            }
        }
    }

    for y in 0..write_y {
        grid.clear_row(y);
    }

    removed
}
