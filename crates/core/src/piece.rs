//! Active piece - movement, rotation, gravity and lock delay
//!
//! The falling piece moves through three states:
//!
//! ```text
//! Falling ──(blocked below)──▶ Grounded ──(lock delay expired)──▶ Locked
//!    ▲                            │
//!    └────(moved off the stack)───┘
//! ```
//!
//! Every successful move or rotation while grounded resets the lock delay to zero, with
//! no reset limit. Hard drop skips the lock delay entirely.
//!
//! The piece only reads the grid for collision queries. It takes a mutable borrow for
//! the single operation that writes it: absorbing its blocks on lock.

use crate::catalog::{self, BlastCells, Mask};
use crate::grid::{Grid, WrittenCells};
use crate::types::{
    AbilityKind, PieceType, RotateDir, Rgba, Rotation, ShapeTier, FAST_FALL_DIVISOR,
    LOCK_DELAY_MS,
};

/// Offsets tried in order when a rotation collides, as (dx, dy).
pub const KICKS: [(i8, i8); 6] = [(0, 0), (-1, 0), (1, 0), (0, -1), (-2, 0), (2, 0)];

/// Grid cells written by a lock, as (x, y).
pub type LockedCells = WrittenCells;

/// Gravity and lock delay in effect for one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub gravity_ms: u32,
    pub lock_delay_ms: u32,
}

impl Timing {
    pub fn new(gravity_ms: u32, lock_delay_ms: u32) -> Self {
        Self {
            gravity_ms,
            lock_delay_ms,
        }
    }

    /// Interval between one-row falls.
    pub fn fall_interval_ms(&self, fast_fall: bool) -> u32 {
        if fast_fall {
            (self.gravity_ms / FAST_FALL_DIVISOR).max(1)
        } else {
            self.gravity_ms
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::new(1000, LOCK_DELAY_MS)
    }
}

/// Where the piece is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceState {
    Falling,
    Grounded,
    Locked,
}

/// Special effect fired while locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialEffect {
    pub kind: AbilityKind,
    pub affected: BlastCells,
}

/// What happened when a piece locked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockReport {
    pub kind: PieceType,
    /// In-bounds cells the piece wrote into the grid
    pub cells: LockedCells,
    pub effect: Option<SpecialEffect>,
}

/// The currently falling piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePiece {
    kind: PieceType,
    mask: Mask,
    color: Rgba,
    tier: ShapeTier,
    rotation: Rotation,
    x: i8,
    y: i8,
    locked: bool,
    fall_timer_ms: u32,
    touching_ground: bool,
    lock_delay_timer_ms: u32,
    timing: Timing,
}

impl ActivePiece {
    /// Spawn `kind` horizontally centered on a grid `grid_width` wide, at `spawn_row`.
    pub fn spawn(kind: PieceType, grid_width: u8, spawn_row: i8, timing: Timing) -> Self {
        let shape = catalog::lookup(kind);
        let x = (grid_width.saturating_sub(shape.width()) / 2) as i8;
        Self::at(kind, x, spawn_row, timing)
    }

    /// Place `kind` in rotation 0 with its mask origin at (x, y).
    pub fn at(kind: PieceType, x: i8, y: i8, timing: Timing) -> Self {
        let shape = catalog::lookup(kind);
        Self {
            kind,
            mask: shape.mask,
            color: shape.color,
            tier: shape.tier,
            rotation: Rotation::North,
            x,
            y,
            locked: false,
            fall_timer_ms: 0,
            touching_ground: false,
            lock_delay_timer_ms: 0,
            timing,
        }
    }

    pub fn kind(&self) -> PieceType {
        self.kind
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn x(&self) -> i8 {
        self.x
    }

    pub fn y(&self) -> i8 {
        self.y
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn touching_ground(&self) -> bool {
        self.touching_ground
    }

    pub fn fall_timer_ms(&self) -> u32 {
        self.fall_timer_ms
    }

    pub fn lock_delay_timer_ms(&self) -> u32 {
        self.lock_delay_timer_ms
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn state(&self) -> PieceState {
        if self.locked {
            PieceState::Locked
        } else if self.touching_ground {
            PieceState::Grounded
        } else {
            PieceState::Falling
        }
    }

    /// Grid cells the piece currently covers, including ones above the top row.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> {
        let (x, y) = (self.x, self.y);
        self.mask.blocks().map(move |(dx, dy)| (x + dx, y + dy))
    }

    /// Would the current mask collide with its origin at (`test_x`, `test_y`)?
    pub fn collides_at(&self, grid: &Grid, test_x: i8, test_y: i8) -> bool {
        mask_collides(&self.mask, grid, test_x, test_y)
    }

    /// Blocked directly below
    pub fn is_grounded(&self, grid: &Grid) -> bool {
        self.collides_at(grid, self.x, self.y + 1)
    }

    fn try_shift(&mut self, grid: &Grid, dx: i8) -> bool {
        if self.locked || self.collides_at(grid, self.x + dx, self.y) {
            return false;
        }
        self.x += dx;
        if self.touching_ground {
            self.lock_delay_timer_ms = 0;
        }
        true
    }

    pub fn move_left(&mut self, grid: &Grid) -> bool {
        self.try_shift(grid, -1)
    }

    pub fn move_right(&mut self, grid: &Grid) -> bool {
        self.try_shift(grid, 1)
    }

    /// Rotate a quarter turn, trying `KICKS` in order.
    ///
    /// Returns the kick that was applied, or `None` if every offset collided (the piece
    /// is left untouched).
    pub fn rotate(&mut self, dir: RotateDir, grid: &Grid) -> Option<(i8, i8)> {
        if self.locked {
            return None;
        }
        let rotated = self.mask.rotated(dir);
        let (dx, dy) = KICKS
            .iter()
            .copied()
            .find(|&(dx, dy)| !mask_collides(&rotated, grid, self.x + dx, self.y + dy))?;

        self.mask = rotated;
        self.rotation = self.rotation.rotate(dir);
        self.x += dx;
        self.y += dy;
        if self.touching_ground {
            self.lock_delay_timer_ms = 0;
        }
        Some((dx, dy))
    }

    /// Advance gravity and lock delay by `dt_ms`.
    ///
    /// Returns the lock report on the tick the piece locks.
    pub fn update(&mut self, dt_ms: u32, fast_fall: bool, grid: &mut Grid) -> Option<LockReport> {
        if self.locked {
            return None;
        }

        self.fall_timer_ms = self.fall_timer_ms.saturating_add(dt_ms);

        if self.is_grounded(grid) {
            if !self.touching_ground {
                self.touching_ground = true;
                self.lock_delay_timer_ms = 0;
            } else {
                self.lock_delay_timer_ms = self.lock_delay_timer_ms.saturating_add(dt_ms);
                if self.lock_delay_timer_ms >= self.timing.lock_delay_ms {
                    return Some(self.lock(grid));
                }
            }
        } else {
            self.touching_ground = false;
            self.lock_delay_timer_ms = 0;
            if self.fall_timer_ms >= self.timing.fall_interval_ms(fast_fall) {
                self.y += 1;
                self.fall_timer_ms = 0;
            }
        }

        None
    }

    /// Row the piece would land on if hard-dropped now. Never mutates.
    pub fn ghost_row(&self, grid: &Grid) -> i8 {
        if self.mask.is_empty() {
            return self.y;
        }
        let floor = grid.height() as i8;
        let mut y = self.y;
        while y < floor && !self.collides_at(grid, self.x, y + 1) {
            y += 1;
        }
        y
    }

    /// Drop to the ghost row and lock immediately.
    pub fn hard_drop(&mut self, grid: &mut Grid) -> Option<LockReport> {
        if self.locked {
            return None;
        }
        self.y = self.ghost_row(grid);
        Some(self.lock(grid))
    }

    /// Absorb the piece into the grid and run its ability, if any.
    fn lock(&mut self, grid: &mut Grid) -> LockReport {
        let cells = grid.set_cells(self.y, self.x, &self.mask, self.color, self.tier);

        let effect = catalog::ability_of(self.kind).map(|kind| {
            let cx = self.x + (self.mask.width() / 2) as i8;
            let cy = self.y + (self.mask.height() / 2) as i8;
            SpecialEffect {
                kind,
                affected: catalog::apply_ability(kind, grid, cx, cy),
            }
        });

        self.locked = true;
        self.touching_ground = true;

        LockReport {
            kind: self.kind,
            cells,
            effect,
        }
    }
}

/// Collision test for a bare mask with its origin at (x, y).
///
/// Blocks left of column 0, right of the last column, or at/below the floor collide.
/// Blocks above row 0 never collide, so pieces can spawn partly off the top.
pub fn mask_collides(mask: &Mask, grid: &Grid, x: i8, y: i8) -> bool {
    let width = grid.width() as i16;
    let height = grid.height() as i16;
    mask.blocks().any(|(dx, dy)| {
        let gx = x as i16 + dx as i16;
        let gy = y as i16 + dy as i16;
        if gx < 0 || gx >= width || gy >= height {
            return true;
        }
        gy >= 0 && grid.is_occupied(gx as i8, gy as i8)
    })
}
