//! Grid and line clear tests

use blockfall::core::grid::{Cell, Grid};
use blockfall::core::line_clear::{clear_full_lines, clear_full_rows, compact_full_rows};
use blockfall::core::Mask;
use blockfall::types::{Rgba, ShapeTier, GRID_HEIGHT, GRID_WIDTH};

fn block() -> Cell {
    Cell::filled(Rgba::opaque(200, 0, 0), ShapeTier::Basic)
}

fn fill_row(grid: &mut Grid, y: i8) {
    for x in 0..grid.width() as i8 {
        grid.set(x, y, block());
    }
}

#[test]
fn test_grid_new_empty() {
    let grid = Grid::new();
    assert_eq!(grid.width(), GRID_WIDTH);
    assert_eq!(grid.height(), GRID_HEIGHT);
    for y in 0..GRID_HEIGHT as i8 {
        for x in 0..GRID_WIDTH as i8 {
            assert_eq!(grid.get(x, y), Some(&Cell::EMPTY), "cell ({}, {})", x, y);
        }
    }
}

#[test]
fn test_grid_out_of_bounds() {
    let mut grid = Grid::new();
    assert_eq!(grid.get(-1, 0), None);
    assert_eq!(grid.get(0, -1), None);
    assert_eq!(grid.get(GRID_WIDTH as i8, 0), None);
    assert_eq!(grid.get(0, GRID_HEIGHT as i8), None);
    assert!(!grid.set(-1, 0, block()));
    assert!(!grid.set(0, GRID_HEIGHT as i8, block()));
}

#[test]
fn test_clear_cell_resets_metadata() {
    let mut grid = Grid::new();
    grid.set(3, 4, block());
    assert!(grid.is_occupied(3, 4));
    assert!(grid.clear_cell(3, 4));
    assert_eq!(grid.get(3, 4), Some(&Cell::EMPTY));
}

#[test]
fn test_set_cells_clips_to_bounds() {
    let mut grid = Grid::new();
    let mask = Mask::from_ascii(&["###", ".#."]);
    // Two columns hang off the right edge and one row sits above the top.
    let written = grid.set_cells(-1, GRID_WIDTH as i8 - 2, &mask, Rgba::opaque(1, 2, 3), ShapeTier::Medium);
    assert_eq!(written.as_slice(), &[(GRID_WIDTH as i8 - 1, 0)]);
    assert!(grid.is_occupied(GRID_WIDTH as i8 - 1, 0));
    assert_eq!(grid.occupied_count(), 1);
}

#[test]
fn test_full_row_detection() {
    let mut grid = Grid::new();
    let bottom = GRID_HEIGHT as usize - 1;
    assert!(!grid.is_full_row(bottom));
    fill_row(&mut grid, bottom as i8);
    assert!(grid.is_full_row(bottom));
    grid.clear_cell(5, bottom as i8);
    assert!(!grid.is_full_row(bottom));
}

#[test]
fn test_hardened_row_never_full() {
    let mut grid = Grid::new();
    let bottom = GRID_HEIGHT as i8 - 1;
    fill_row(&mut grid, bottom);
    grid.age_cells(1);
    assert!(grid.get(0, bottom).unwrap().hardened);
    assert!(!grid.is_full_row(bottom as usize));
    assert_eq!(clear_full_lines(&mut grid), 0);
}

#[test]
fn test_clear_four_rows_keeps_stack_above() {
    let mut grid = Grid::new();
    for y in 18..22 {
        fill_row(&mut grid, y);
    }
    grid.set(2, 17, block());
    assert_eq!(clear_full_rows(&mut grid), vec![21, 20, 19, 18]);
    assert!(grid.is_occupied(2, 21));
    assert_eq!(grid.occupied_count(), 1);
}

#[test]
fn test_pieces_rest_above_gaps() {
    let mut grid = Grid::from_ascii(&["....", "##..", "#..#"]);
    let before = grid.clone();
    assert_eq!(compact_full_rows(&mut grid), 0);
    assert_eq!(grid, before);
}

#[test]
fn test_ascii_round_trip() {
    let rows = ["#..#", ".##.", "####"];
    let grid = Grid::from_ascii(&rows);
    assert_eq!(grid.to_ascii(), rows);
    assert_eq!(grid.column_height(0), 3);
    assert_eq!(grid.column_height(1), 2);
}
