//! Placement planning - choose where the active piece should land and get it there
//!
//! Every rotation reachable from the spawn orientation is tried, and for each one every
//! column reachable by sliding left or right. Each candidate is hard-dropped on a copy
//! of the grid, full rows are cleared, and the result is scored:
//!
//! ```text
//! score = 760·lines − 510·aggregate height − 360·holes − 180·bumpiness
//! ```
//!
//! The winning placement is turned back into the exact intent sequence the session
//! needs, so applying it reproduces the simulated landing.

use arrayvec::ArrayVec;

use blockfall_core::{clear_full_lines, ActivePiece, GameSession, Grid};

use crate::types::{Intent, PieceType, RotateDir, Rotation};

const LINE_WEIGHT: i32 = 760;
const HEIGHT_WEIGHT: i32 = 510;
const HOLE_WEIGHT: i32 = 360;
const BUMP_WEIGHT: i32 = 180;
/// Landing that leaves blocks above the grid
const SPILL_PENALTY: i32 = 1_000_000;

/// Intent sequence realizing one placement.
pub type IntentPlan = ArrayVec<Intent, 32>;

/// Longest lateral slide a plan can carry after hold, two turns and the drop.
const MAX_SHIFT: usize = 32 - 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceError {
    NotPlayable,
    NoActive,
    NoPlacement,
    Unreachable,
}

impl PlaceError {
    pub fn code(self) -> &'static str {
        match self {
            PlaceError::NotPlayable => "not_playable",
            PlaceError::NoActive | PlaceError::NoPlacement | PlaceError::Unreachable => {
                "invalid_place"
            }
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PlaceError::NotPlayable => "round is over",
            PlaceError::NoActive => "no active piece",
            PlaceError::NoPlacement => "piece has no legal landing",
            PlaceError::Unreachable => "session rejected an intent of the plan",
        }
    }
}

impl std::fmt::Display for PlaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for PlaceError {}

/// One evaluated landing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Swap through the hold slot first
    pub use_hold: bool,
    pub rotation: Rotation,
    /// Columns to slide after rotating, negative is left
    pub shift: i8,
    /// Final mask origin
    pub x: i8,
    pub landing_y: i8,
    pub lines: u32,
    pub score: i32,
}

/// Grid features the score is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardFeatures {
    pub aggregate_height: i32,
    pub holes: i32,
    pub bumpiness: i32,
}

pub fn board_features(grid: &Grid) -> BoardFeatures {
    let mut features = BoardFeatures::default();
    let mut prev: Option<i32> = None;
    for x in 0..grid.width() as i8 {
        let height = grid.column_height(x) as i32;
        features.aggregate_height += height;
        let top = grid.height() as i32 - height;
        features.holes += (top..grid.height() as i32)
            .filter(|&y| !grid.is_occupied(x, y as i8))
            .count() as i32;
        if let Some(p) = prev {
            features.bumpiness += (height - p).abs();
        }
        prev = Some(height);
    }
    features
}

/// Rotations in the order they are planned.
const PLAN_ROTATIONS: [Rotation; 4] = [
    Rotation::North,
    Rotation::East,
    Rotation::South,
    Rotation::West,
];

/// Turns that reach `rotation` from spawn orientation.
fn turns_for(rotation: Rotation) -> &'static [RotateDir] {
    match rotation {
        Rotation::North => &[],
        Rotation::East => &[RotateDir::Cw],
        Rotation::South => &[RotateDir::Cw, RotateDir::Cw],
        Rotation::West => &[RotateDir::Ccw],
    }
}

/// Best landing for `piece` on `grid`, or `None` when nothing fits.
pub fn plan(grid: &Grid, piece: &ActivePiece) -> Option<Placement> {
    let mut best: Option<Placement> = None;

    for rotation in PLAN_ROTATIONS {
        let mut turned = piece.clone();
        if !turns_for(rotation).iter().all(|&dir| turned.rotate(dir, grid).is_some()) {
            continue;
        }

        let mut left = turned.clone();
        let mut min_shift = 0i8;
        while (min_shift.unsigned_abs() as usize) < MAX_SHIFT && left.move_left(grid) {
            min_shift -= 1;
        }
        let mut right = turned.clone();
        let mut max_shift = 0i8;
        while (max_shift as usize) < MAX_SHIFT && right.move_right(grid) {
            max_shift += 1;
        }

        for shift in min_shift..=max_shift {
            let candidate = slide(turned.clone(), grid, shift);
            let placement = evaluate(grid, candidate, rotation, shift);
            if best.map_or(true, |b| placement.score > b.score) {
                best = Some(placement);
            }
        }
    }

    best
}

fn slide(mut piece: ActivePiece, grid: &Grid, shift: i8) -> ActivePiece {
    for _ in 0..shift.unsigned_abs() {
        if shift < 0 {
            piece.move_left(grid);
        } else {
            piece.move_right(grid);
        }
    }
    piece
}

fn evaluate(grid: &Grid, mut piece: ActivePiece, rotation: Rotation, shift: i8) -> Placement {
    let mut scratch = grid.clone();
    let x = piece.x();
    let blocks = piece.mask().count();
    let landing_y = piece.ghost_row(grid);
    let written = piece
        .hard_drop(&mut scratch)
        .map_or(0, |report| report.cells.len());
    let lines = clear_full_lines(&mut scratch) as u32;
    let f = board_features(&scratch);

    let mut score = LINE_WEIGHT * lines as i32
        - HEIGHT_WEIGHT * f.aggregate_height
        - HOLE_WEIGHT * f.holes
        - BUMP_WEIGHT * f.bumpiness;
    if written < blocks {
        score -= SPILL_PENALTY;
    }

    Placement {
        use_hold: false,
        rotation,
        shift,
        x,
        landing_y,
        lines,
        score,
    }
}

/// Best placement for the session's active piece, also weighing a hold swap.
pub fn plan_session(session: &GameSession) -> Result<Placement, PlaceError> {
    if session.is_over() {
        return Err(PlaceError::NotPlayable);
    }
    let Some(active) = session.active() else {
        return Err(PlaceError::NoActive);
    };
    let grid = session.grid();
    let mut best = plan(grid, active);

    if session.can_hold() {
        if let Some(kind) = hold_candidate(session) {
            let swapped = ActivePiece::spawn(
                kind,
                grid.width(),
                session.config().spawn_row,
                active.timing(),
            );
            if !swapped.collides_at(grid, swapped.x(), swapped.y()) {
                if let Some(mut p) = plan(grid, &swapped) {
                    p.use_hold = true;
                    if best.map_or(true, |b| p.score > b.score) {
                        best = Some(p);
                    }
                }
            }
        }
    }

    best.ok_or(PlaceError::NoPlacement)
}

/// Piece that would become active after a hold.
fn hold_candidate(session: &GameSession) -> Option<PieceType> {
    session
        .hold_piece()
        .or_else(|| session.lookahead().first().copied())
}

/// Intents that realize `placement` from the piece's current state.
pub fn intents_for(placement: &Placement) -> IntentPlan {
    let mut plan = IntentPlan::new();
    if placement.use_hold {
        plan.push(Intent::Hold);
    }
    for dir in turns_for(placement.rotation) {
        plan.push(match dir {
            RotateDir::Cw => Intent::RotateCw,
            RotateDir::Ccw => Intent::RotateCcw,
        });
    }
    let step = if placement.shift < 0 {
        Intent::MoveLeft
    } else {
        Intent::MoveRight
    };
    for _ in 0..(placement.shift.unsigned_abs() as usize).min(MAX_SHIFT) {
        plan.push(step);
    }
    plan.push(Intent::HardDrop);
    plan
}

/// Feed a placement to the session intent by intent.
pub fn apply_placement(session: &mut GameSession, placement: &Placement) -> Result<(), PlaceError> {
    if session.is_over() {
        return Err(PlaceError::NotPlayable);
    }
    if session.active().is_none() {
        return Err(PlaceError::NoActive);
    }
    for intent in intents_for(placement) {
        if !session.apply_intent(intent) {
            return Err(PlaceError::Unreachable);
        }
    }
    Ok(())
}

/// Plan and apply in one step.
pub fn place_best(session: &mut GameSession) -> Result<Placement, PlaceError> {
    let placement = plan_session(session)?;
    apply_placement(session, &placement)?;
    Ok(placement)
}
