use serde::Serialize;

use crate::grid::Cell;
use crate::piece::ActivePiece;
use crate::session::SessionStatus;
use crate::types::{GameMode, PieceType, Rgba, Rotation, ShapeTier, GRID_HEIGHT, GRID_WIDTH};

pub const CELL_EMPTY: u8 = 0;
pub const CELL_BASIC: u8 = 1;
pub const CELL_MEDIUM: u8 = 2;
pub const CELL_HARD: u8 = 3;
pub const CELL_SPECIAL: u8 = 4;
pub const CELL_HARDENED: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSnapshot {
    pub piece: PieceType,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
    pub cells: Vec<(i8, i8)>,
}

impl From<&ActivePiece> for ActiveSnapshot {
    fn from(value: &ActivePiece) -> Self {
        Self {
            piece: value.kind(),
            rotation: value.rotation(),
            x: value.x(),
            y: value.y(),
            cells: value.cells().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimersSnapshot {
    pub fall_ms: u32,
    pub lock_delay_ms: u32,
    /// Current fall interval, fast fall included
    pub gravity_ms: u32,
}

/// Renderer-facing copy of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub width: u8,
    pub height: u8,
    /// Row-major cell codes, see `CELL_*`
    pub cells: Vec<u8>,
    pub colors: Vec<Rgba>,
    pub active: Option<ActiveSnapshot>,
    pub ghost_row: Option<i8>,
    pub hold: Option<PieceType>,
    pub can_hold: bool,
    pub lookahead: Vec<PieceType>,
    pub mode: GameMode,
    pub line_goal: Option<u32>,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub combo: u32,
    pub special_charges: u32,
    pub status: SessionStatus,
    pub round_id: u32,
    pub pieces_spawned: u32,
    pub timers: TimersSnapshot,
}

impl SessionSnapshot {
    pub fn cell_code(cell: &Cell) -> u8 {
        if !cell.occupied {
            return CELL_EMPTY;
        }
        if cell.hardened {
            return CELL_HARDENED;
        }
        match cell.tier {
            ShapeTier::Empty | ShapeTier::Basic => CELL_BASIC,
            ShapeTier::Medium => CELL_MEDIUM,
            ShapeTier::Hard => CELL_HARD,
            ShapeTier::Special => CELL_SPECIAL,
        }
    }

    pub fn playable(&self) -> bool {
        self.status == SessionStatus::Active && self.active.is_some()
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        let size = GRID_WIDTH as usize * GRID_HEIGHT as usize;
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            cells: vec![CELL_EMPTY; size],
            colors: vec![Rgba::EMPTY; size],
            active: None,
            ghost_row: None,
            hold: None,
            can_hold: true,
            lookahead: Vec::new(),
            mode: GameMode::Classic,
            line_goal: None,
            score: 0,
            lines: 0,
            level: 0,
            combo: 0,
            special_charges: 0,
            status: SessionStatus::Active,
            round_id: 0,
            pieces_spawned: 0,
            timers: TimersSnapshot::default(),
        }
    }
}
