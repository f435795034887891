//! Simulation core - pure, deterministic, and testable
//!
//! Everything that decides how a round of the falling-block puzzle plays out lives
//! here: the grid, the piece catalog, the active piece, the bag randomizer, difficulty
//! tables, line clearing, scoring and the session that ties them together. The crate
//! does no I/O and never prints. Observers learn what happened by draining
//! [`GameEvent`]s from the session.
//!
//! # Module Structure
//!
//! - [`grid`]: 11x22 cell grid with full-row tests and cell aging
//! - [`catalog`]: piece masks, colors, tier pools and the ability table
//! - [`piece`]: the active piece state machine with kicks and lock delay
//! - [`bag`]: difficulty-scaled shuffled bags with a lookahead queue
//! - [`difficulty`]: validated level tables
//! - [`line_clear`]: full row removal
//! - [`scoring`]: line clear score and combo counter
//! - [`mode`]: per-mode tables and rules
//! - [`session`]: one round, driven by intents and elapsed time
//!
//! # Example
//!
//! ```
//! use blockfall_core::{GameSession, ModeConfig, ModeKey};
//! use blockfall_core::types::Intent;
//!
//! let config = ModeConfig::select(ModeKey::default()).unwrap();
//! let mut session = GameSession::new(config, 12345).unwrap();
//!
//! session.push_intent(Intent::MoveLeft);
//! session.push_intent(Intent::HardDrop);
//! assert!(session.tick(16));
//!
//! let events = session.drain_events();
//! assert_eq!(events[0].name(), "pieceLocked");
//! ```
//!
//! # Determinism
//!
//! A session is a pure function of its mode, seed, intents and the `dt` values passed
//! to [`GameSession::tick`]. Two sessions fed the same inputs produce identical grids
//! and identical event streams.

pub mod bag;
pub mod catalog;
pub mod difficulty;
pub mod events;
pub mod grid;
pub mod line_clear;
pub mod mode;
pub mod piece;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use blockfall_types as types;

pub use bag::BagRandomizer;
pub use catalog::{lookup, Mask, PieceShape};
pub use difficulty::{DifficultyEntry, DifficultyTable, TableError};
pub use events::GameEvent;
pub use grid::{Cell, Grid};
pub use line_clear::{clear_full_lines, clear_full_rows};
pub use mode::{
    ChallengeVariant, ClassicVariant, ModeConfig, ModeKey, PetrifyRule, PracticeDifficulty,
    SpecialRule, SprintLength,
};
pub use piece::{ActivePiece, LockReport, PieceState, Timing};
pub use scoring::{calculate_score, ComboBonus, ComboCounter, ScoreResult};
pub use session::{GameSession, SessionConfig, SessionStatus};
pub use snapshot::{ActiveSnapshot, SessionSnapshot, TimersSnapshot};
