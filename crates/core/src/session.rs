//! Game session - one round of play
//!
//! The session owns the grid, the bag, the active piece and every counter. It is driven
//! by a caller that queues [`Intent`]s and calls [`GameSession::tick`] with the elapsed
//! time. Within a tick the order is fixed:
//!
//! 1. queued intents, each validated by collision
//! 2. gravity and lock delay for the active piece
//! 3. on lock: absorb, special effect, line clear, score/lines/level, bag notified
//! 4. goal check, then respawn (a blocked spawn tops the round out)
//! 5. petrify aging, when the mode has it
//!
//! A hard drop resolves steps 3 and 4 immediately. Intents queued behind it wait for
//! the next tick, and gravity is skipped for the tick it happened in.

use std::collections::VecDeque;

use serde::Serialize;

use crate::bag::BagRandomizer;
use crate::difficulty::TableError;
use crate::events::GameEvent;
use crate::grid::Grid;
use crate::line_clear::clear_full_rows;
use crate::mode::{ModeConfig, ModeKey};
use crate::piece::{ActivePiece, LockReport, Timing};
use crate::scoring::{score_placement, ComboCounter};
use crate::snapshot::{ActiveSnapshot, SessionSnapshot, TimersSnapshot};
use crate::types::{EndReason, Intent, PieceType, RotateDir};

/// Round status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "camelCase")]
pub enum SessionStatus {
    #[default]
    Active,
    Ended(EndReason),
}

/// Everything needed to start a session from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionConfig {
    pub mode: ModeKey,
    pub seed: u64,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    config: ModeConfig,
    seed: u64,
    grid: Grid,
    bag: BagRandomizer,
    active: Option<ActivePiece>,
    hold: Option<PieceType>,
    can_hold: bool,
    pending: VecDeque<Intent>,
    events: Vec<GameEvent>,
    fast_fall: bool,
    score: u32,
    lines: u32,
    level: u32,
    combo: ComboCounter,
    special_charges: u32,
    /// Lines cleared toward the next special charge
    charge_progress: u32,
    status: SessionStatus,
    /// Monotonic round id (increments on restart)
    round_id: u32,
    /// Pieces spawned this round, including hold swaps
    pieces_spawned: u32,
    /// Ticks simulated this round
    ticks: u64,
}

impl GameSession {
    /// Start a round and spawn its first piece.
    pub fn new(config: ModeConfig, seed: u64) -> Result<Self, TableError> {
        config.validate()?;
        let bag = BagRandomizer::new(config.table.clone(), config.start_level, seed);
        let mut session = Self {
            level: config.start_level,
            config,
            seed,
            grid: Grid::new(),
            bag,
            active: None,
            hold: None,
            can_hold: true,
            pending: VecDeque::new(),
            events: Vec::new(),
            fast_fall: false,
            score: 0,
            lines: 0,
            combo: ComboCounter::new(),
            special_charges: 0,
            charge_progress: 0,
            status: SessionStatus::Active,
            round_id: 0,
            pieces_spawned: 0,
            ticks: 0,
        };
        session.spawn_next();
        Ok(session)
    }

    /// Select the mode named by `config.mode` and start a round.
    pub fn from_config(config: SessionConfig) -> Result<Self, TableError> {
        Self::new(ModeConfig::select(config.mode)?, config.seed)
    }

    pub fn config(&self) -> &ModeConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct grid access for setting up positions in tests and tools.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn hold_piece(&self) -> Option<PieceType> {
        self.hold
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn lookahead(&self) -> &[PieceType] {
        self.bag.peek()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn combo(&self) -> u32 {
        self.combo.value()
    }

    pub fn special_charges(&self) -> u32 {
        self.special_charges
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        matches!(self.status, SessionStatus::Ended(_))
    }

    pub fn is_fast_falling(&self) -> bool {
        self.fast_fall
    }

    pub fn round_id(&self) -> u32 {
        self.round_id
    }

    pub fn pieces_spawned(&self) -> u32 {
        self.pieces_spawned
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn pending_intents(&self) -> usize {
        self.pending.len()
    }

    /// Landing row of the active piece.
    pub fn ghost_row(&self) -> Option<i8> {
        self.active.as_ref().map(|p| p.ghost_row(&self.grid))
    }

    /// Queue an intent for the next tick.
    pub fn push_intent(&mut self, intent: Intent) {
        self.pending.push_back(intent);
    }

    /// Take every event recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Move every pending event into `out`, keeping both buffers' capacity.
    pub fn drain_events_into(&mut self, out: &mut Vec<GameEvent>) {
        out.extend(self.events.drain(..));
    }

    /// Gravity and lock delay for a piece spawned at the current level.
    fn timing(&self) -> Timing {
        Timing::new(
            self.config.table.gravity_ms(self.level),
            self.config.lock_delay_ms,
        )
    }

    fn spawn_next(&mut self) -> bool {
        let kind = self.bag.next_piece();
        let spawned = self.spawn_kind(kind);
        if spawned {
            self.can_hold = true;
        }
        spawned
    }

    /// Put `kind` at the spawn position, ending the round if it does not fit.
    fn spawn_kind(&mut self, kind: PieceType) -> bool {
        let piece = ActivePiece::spawn(
            kind,
            self.grid.width(),
            self.config.spawn_row,
            self.timing(),
        );
        if piece.collides_at(&self.grid, piece.x(), piece.y()) {
            self.active = None;
            self.end_round(EndReason::ToppedOut);
            return false;
        }
        self.active = Some(piece);
        self.pieces_spawned = self.pieces_spawned.wrapping_add(1);
        true
    }

    fn end_round(&mut self, reason: EndReason) {
        if self.is_over() {
            return;
        }
        self.status = SessionStatus::Ended(reason);
        self.active = None;
        self.fast_fall = false;
        self.events.push(GameEvent::RoundEnded {
            reason,
            final_score: self.score,
            final_lines: self.lines,
            final_level: self.level,
        });
    }

    /// Advance the round by `dt_ms`. Returns true if a piece locked.
    pub fn tick(&mut self, dt_ms: u32) -> bool {
        if self.is_over() {
            return false;
        }

        let mut hard_dropped = false;
        while let Some(intent) = self.pending.pop_front() {
            let applied = self.apply_intent(intent);
            if self.is_over() {
                break;
            }
            if applied && intent == Intent::HardDrop {
                hard_dropped = true;
                break;
            }
        }

        let mut locked = hard_dropped;
        if !hard_dropped && !self.is_over() {
            let report = match self.active.as_mut() {
                Some(piece) => piece.update(dt_ms, self.fast_fall, &mut self.grid),
                None => None,
            };
            if let Some(report) = report {
                self.resolve_lock(report);
                locked = true;
            }
        }

        if !self.is_over() {
            if let Some(rule) = self.config.petrify {
                self.grid.age_cells(rule.after_ticks);
            }
        }

        self.ticks += 1;
        locked
    }

    /// Apply one intent right away. Returns false when it was rejected.
    pub fn apply_intent(&mut self, intent: Intent) -> bool {
        if self.is_over() {
            return false;
        }
        match intent {
            Intent::SoftFallOn => {
                self.fast_fall = true;
                true
            }
            Intent::SoftFallOff => {
                self.fast_fall = false;
                true
            }
            Intent::Hold => self.hold(),
            Intent::ActivateSpecial => self.activate_special(),
            Intent::MoveLeft => match self.active.as_mut() {
                Some(piece) => piece.move_left(&self.grid),
                None => false,
            },
            Intent::MoveRight => match self.active.as_mut() {
                Some(piece) => piece.move_right(&self.grid),
                None => false,
            },
            Intent::RotateCw => self.rotate(RotateDir::Cw),
            Intent::RotateCcw => self.rotate(RotateDir::Ccw),
            Intent::HardDrop => self.hard_drop(),
        }
    }

    fn rotate(&mut self, dir: RotateDir) -> bool {
        match self.active.as_mut() {
            Some(piece) => piece.rotate(dir, &self.grid).is_some(),
            None => false,
        }
    }

    fn hard_drop(&mut self) -> bool {
        let report = match self.active.as_mut() {
            Some(piece) => piece.hard_drop(&mut self.grid),
            None => None,
        };
        match report {
            Some(report) => {
                self.resolve_lock(report);
                true
            }
            None => false,
        }
    }

    /// Replace the active piece with `kind` at the spawn position.
    ///
    /// Meant for puzzle setups and tests. The hold lock is left as it was. Returns false
    /// (and changes nothing) if the round is over or the spawn position is blocked.
    pub fn force_active(&mut self, kind: PieceType) -> bool {
        if self.is_over() {
            return false;
        }
        let piece = ActivePiece::spawn(
            kind,
            self.grid.width(),
            self.config.spawn_row,
            self.timing(),
        );
        if piece.collides_at(&self.grid, piece.x(), piece.y()) {
            return false;
        }
        self.active = Some(piece);
        true
    }

    /// Stash the active piece, once per spawn.
    ///
    /// With a held piece the two swap and the held one respawns fresh. With an empty
    /// slot the next bag piece comes in.
    pub fn hold(&mut self) -> bool {
        if !self.can_hold || self.is_over() {
            return false;
        }
        let Some(active) = self.active.take() else {
            return false;
        };

        match self.hold.replace(active.kind()) {
            Some(held) => {
                self.spawn_kind(held);
            }
            None => {
                let next = self.bag.next_piece();
                self.spawn_kind(next);
            }
        }
        self.can_hold = false;
        true
    }

    /// Spend a charge to turn the active piece into a bomb.
    ///
    /// The bomb takes the piece's place, centered on its columns. If that spot is
    /// blocked it goes to the spawn position instead; if both are blocked the intent is
    /// rejected and the charge kept.
    pub fn activate_special(&mut self) -> bool {
        if self.special_charges == 0 {
            return false;
        }
        let Some(active) = self.active.as_ref() else {
            return false;
        };

        let timing = active.timing();
        let x = active.x() + (active.mask().width() / 2) as i8;
        let in_place = ActivePiece::at(PieceType::Bomb, x, active.y(), timing);
        let bomb = if !in_place.collides_at(&self.grid, in_place.x(), in_place.y()) {
            in_place
        } else {
            let spawned = ActivePiece::spawn(
                PieceType::Bomb,
                self.grid.width(),
                self.config.spawn_row,
                timing,
            );
            if spawned.collides_at(&self.grid, spawned.x(), spawned.y()) {
                return false;
            }
            spawned
        };

        self.active = Some(bomb);
        self.special_charges -= 1;
        true
    }

    /// Everything that follows a lock, up to and including the next spawn.
    fn resolve_lock(&mut self, report: LockReport) {
        self.active = None;
        self.events.push(GameEvent::PieceLocked {
            piece: report.kind,
            cells: report.cells,
        });
        if let Some(effect) = report.effect {
            self.events.push(GameEvent::SpecialEffectTriggered {
                kind: effect.kind,
                affected_cells: effect.affected.to_vec(),
            });
        }

        let rows = clear_full_rows(&mut self.grid);
        let cleared = rows.len() as u32;
        if cleared > 0 {
            self.events.push(GameEvent::LinesCleared {
                count: cleared,
                row_indices: rows,
            });
        }

        let previous_combo = self.combo.value();
        let combo = self.combo.record(cleared);
        if combo != previous_combo {
            self.events.push(GameEvent::ComboChanged { value: combo });
        }

        let result = score_placement(cleared, combo, self.config.combo_bonus);
        if result.total > 0 {
            self.score = self.score.saturating_add(result.total);
            self.events.push(GameEvent::ScoreChanged {
                delta: result.total,
                total: self.score,
            });
        }

        if cleared > 0 {
            self.lines = self.lines.saturating_add(cleared);
            self.earn_charges(cleared);

            let level = self.config.table.calculate_level(self.lines).max(self.level);
            if level != self.level {
                self.level = level;
                self.bag.update_level(level);
                self.events.push(GameEvent::LevelChanged { new_level: level });
            }
        }

        if let Some(goal) = self.config.line_goal {
            if self.lines >= goal {
                self.end_round(EndReason::GoalReached);
                return;
            }
        }

        self.spawn_next();
    }

    fn earn_charges(&mut self, cleared: u32) {
        let Some(rule) = self.config.special else {
            return;
        };
        if rule.lines_per_charge == 0 {
            return;
        }
        self.charge_progress += cleared;
        while self.charge_progress >= rule.lines_per_charge {
            self.charge_progress -= rule.lines_per_charge;
            if self.special_charges < rule.max_charges {
                self.special_charges += 1;
            }
        }
    }

    /// Grant special charges directly, up to the mode's cap.
    pub fn grant_special_charges(&mut self, count: u32) {
        let cap = self.config.special.map_or(0, |rule| rule.max_charges);
        self.special_charges = self.special_charges.saturating_add(count).min(cap);
    }

    /// Throw the round away and start again from the mode's start level.
    ///
    /// The bag's random stream continues, so the new round deals a different sequence.
    pub fn restart(&mut self) {
        self.grid.clear();
        self.bag.reset(self.config.start_level);
        self.active = None;
        self.hold = None;
        self.can_hold = true;
        self.pending.clear();
        self.fast_fall = false;
        self.score = 0;
        self.lines = 0;
        self.level = self.config.start_level;
        self.combo.reset();
        self.special_charges = 0;
        self.charge_progress = 0;
        self.status = SessionStatus::Active;
        self.round_id = self.round_id.wrapping_add(1);
        self.pieces_spawned = 0;
        self.ticks = 0;
        self.spawn_next();
    }

    /// Fill `out` with the current state, reusing its buffers.
    pub fn snapshot_into(&self, out: &mut SessionSnapshot) {
        out.width = self.grid.width();
        out.height = self.grid.height();
        out.cells.clear();
        out.cells
            .extend(self.grid.cells().iter().map(SessionSnapshot::cell_code));
        out.colors.clear();
        out.colors.extend(self.grid.cells().iter().map(|c| c.color));
        out.active = self.active.as_ref().map(ActiveSnapshot::from);
        out.ghost_row = self.ghost_row();
        out.hold = self.hold;
        out.can_hold = self.can_hold;
        out.lookahead.clear();
        out.lookahead.extend_from_slice(self.bag.peek());
        out.mode = self.config.mode;
        out.line_goal = self.config.line_goal;
        out.score = self.score;
        out.lines = self.lines;
        out.level = self.level;
        out.combo = self.combo.value();
        out.special_charges = self.special_charges;
        out.status = self.status;
        out.round_id = self.round_id;
        out.pieces_spawned = self.pieces_spawned;
        out.timers = match &self.active {
            Some(piece) => TimersSnapshot {
                fall_ms: piece.fall_timer_ms(),
                lock_delay_ms: piece.lock_delay_timer_ms(),
                gravity_ms: piece.timing().fall_interval_ms(self.fast_fall),
            },
            None => TimersSnapshot::default(),
        };
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut out = SessionSnapshot::default();
        self.snapshot_into(&mut out);
        out
    }
}
