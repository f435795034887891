//! Session events
//!
//! The session queues these as they happen; observers (renderer, audio, achievement
//! bookkeeping, the headless runner) drain them once per tick. Serialized form is a
//! tagged JSON object, e.g. `{"type":"linesCleared","count":2,"rowIndices":[21,20]}`.

use serde::Serialize;

use crate::piece::LockedCells;
use crate::types::{AbilityKind, EndReason, PieceType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GameEvent {
    PieceLocked {
        piece: PieceType,
        /// In-bounds cells written, before any line clear
        cells: LockedCells,
    },
    LinesCleared {
        count: u32,
        /// Row indices before the clear, bottom to top
        row_indices: Vec<usize>,
    },
    LevelChanged {
        new_level: u32,
    },
    ScoreChanged {
        delta: u32,
        total: u32,
    },
    ComboChanged {
        value: u32,
    },
    RoundEnded {
        reason: EndReason,
        final_score: u32,
        final_lines: u32,
        final_level: u32,
    },
    SpecialEffectTriggered {
        kind: AbilityKind,
        affected_cells: Vec<(i8, i8)>,
    },
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::PieceLocked { .. } => "pieceLocked",
            GameEvent::LinesCleared { .. } => "linesCleared",
            GameEvent::LevelChanged { .. } => "levelChanged",
            GameEvent::ScoreChanged { .. } => "scoreChanged",
            GameEvent::ComboChanged { .. } => "comboChanged",
            GameEvent::RoundEnded { .. } => "roundEnded",
            GameEvent::SpecialEffectTriggered { .. } => "specialEffectTriggered",
        }
    }
}
