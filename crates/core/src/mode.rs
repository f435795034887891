//! Mode configuration - difficulty tables and per-round rules
//!
//! A [`ModeConfig`] is built once at round start from a [`ModeKey`] and owned by the
//! session for the rest of the round. Nothing here is global.
//!
//! | Mode | Variants | Goal |
//! |------|----------|------|
//! | Classic | normal, hard | endless |
//! | Sprint | 24, 48, 96 lines | line goal |
//! | Challenge | petrify, demolition, gauntlet | line goal |
//! | Practice | easy/normal/hard, optional goal, start level | optional |

use crate::difficulty::{DifficultyEntry, DifficultyTable, TableError};
use crate::scoring::ComboBonus;
use crate::types::{GameMode, GENEROUS_LOCK_DELAY_MS, LOCK_DELAY_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassicVariant {
    Normal,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SprintLength {
    Lines24,
    Lines48,
    Lines96,
}

impl SprintLength {
    pub fn lines(self) -> u32 {
        match self {
            SprintLength::Lines24 => 24,
            SprintLength::Lines48 => 48,
            SprintLength::Lines96 => 96,
        }
    }

    pub fn from_lines(lines: u32) -> Option<Self> {
        match lines {
            24 => Some(SprintLength::Lines24),
            48 => Some(SprintLength::Lines48),
            96 => Some(SprintLength::Lines96),
            _ => None,
        }
    }
}

/// Named challenge rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChallengeVariant {
    /// Settled cells harden over time and block line clears
    Petrify,
    /// Bomb charges earned by clearing lines
    Demolition,
    /// Heavy bags and fast gravity from the first piece
    Gauntlet,
}

impl ChallengeVariant {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "petrify" => Some(ChallengeVariant::Petrify),
            "demolition" => Some(ChallengeVariant::Demolition),
            "gauntlet" => Some(ChallengeVariant::Gauntlet),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeVariant::Petrify => "petrify",
            ChallengeVariant::Demolition => "demolition",
            ChallengeVariant::Gauntlet => "gauntlet",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PracticeDifficulty {
    Easy,
    Normal,
    Hard,
}

impl PracticeDifficulty {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(PracticeDifficulty::Easy),
            "normal" => Some(PracticeDifficulty::Normal),
            "hard" => Some(PracticeDifficulty::Hard),
            _ => None,
        }
    }
}

/// (mode, sub-difficulty) pair used to select a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKey {
    Classic(ClassicVariant),
    Sprint(SprintLength),
    Challenge(ChallengeVariant),
    Practice {
        difficulty: PracticeDifficulty,
        line_goal: Option<u32>,
        start_level: u32,
    },
}

impl ModeKey {
    pub fn mode(&self) -> GameMode {
        match self {
            ModeKey::Classic(_) => GameMode::Classic,
            ModeKey::Sprint(_) => GameMode::Sprint,
            ModeKey::Challenge(_) => GameMode::Challenge,
            ModeKey::Practice { .. } => GameMode::Practice,
        }
    }
}

impl Default for ModeKey {
    fn default() -> Self {
        ModeKey::Classic(ClassicVariant::Normal)
    }
}

/// Cells harden once they have sat in the grid for `after_ticks` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PetrifyRule {
    pub after_ticks: u32,
}

/// Bomb charges: one per `lines_per_charge` lines, at most `max_charges` banked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialRule {
    pub lines_per_charge: u32,
    pub max_charges: u32,
}

/// Immutable per-round configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeConfig {
    pub mode: GameMode,
    pub table: DifficultyTable,
    /// Round ends with `GoalReached` once this many lines are cleared
    pub line_goal: Option<u32>,
    pub start_level: u32,
    pub lock_delay_ms: u32,
    /// 0, or -1 to spawn into the buffer row above the grid
    pub spawn_row: i8,
    pub petrify: Option<PetrifyRule>,
    pub special: Option<SpecialRule>,
    pub combo_bonus: Option<ComboBonus>,
}

impl ModeConfig {
    /// Plain endless configuration around `table`.
    pub fn new(mode: GameMode, table: DifficultyTable) -> Self {
        Self {
            mode,
            table,
            line_goal: None,
            start_level: 0,
            lock_delay_ms: LOCK_DELAY_MS,
            spawn_row: 0,
            petrify: None,
            special: None,
            combo_bonus: None,
        }
    }

    pub fn with_line_goal(mut self, goal: u32) -> Self {
        self.line_goal = Some(goal);
        self
    }

    pub fn with_start_level(mut self, level: u32) -> Self {
        self.start_level = level;
        self
    }

    pub fn with_lock_delay(mut self, lock_delay_ms: u32) -> Self {
        self.lock_delay_ms = lock_delay_ms;
        self
    }

    pub fn with_spawn_row(mut self, row: i8) -> Self {
        self.spawn_row = row;
        self
    }

    pub fn with_petrify(mut self, rule: PetrifyRule) -> Self {
        self.petrify = Some(rule);
        self
    }

    pub fn with_special(mut self, rule: SpecialRule) -> Self {
        self.special = Some(rule);
        self
    }

    pub fn with_combo_bonus(mut self, bonus: ComboBonus) -> Self {
        self.combo_bonus = Some(bonus);
        self
    }

    /// Build the configuration for `key`.
    pub fn select(key: ModeKey) -> Result<Self, TableError> {
        let config = match key {
            ModeKey::Classic(ClassicVariant::Normal) => {
                Self::new(GameMode::Classic, DifficultyTable::new(classic_normal())?)
            }
            ModeKey::Classic(ClassicVariant::Hard) => {
                Self::new(GameMode::Classic, DifficultyTable::new(classic_hard())?)
            }
            ModeKey::Sprint(length) => {
                Self::new(GameMode::Sprint, DifficultyTable::new(sprint(length.lines()))?)
                    .with_line_goal(length.lines())
            }
            ModeKey::Challenge(ChallengeVariant::Petrify) => {
                Self::new(GameMode::Challenge, DifficultyTable::new(classic_normal())?)
                    .with_line_goal(40)
                    .with_petrify(PetrifyRule { after_ticks: 600 })
            }
            ModeKey::Challenge(ChallengeVariant::Demolition) => {
                Self::new(GameMode::Challenge, DifficultyTable::new(classic_hard())?)
                    .with_line_goal(60)
                    .with_special(SpecialRule {
                        lines_per_charge: 4,
                        max_charges: 3,
                    })
                    .with_combo_bonus(ComboBonus { per_step: 100 })
            }
            ModeKey::Challenge(ChallengeVariant::Gauntlet) => {
                Self::new(GameMode::Challenge, DifficultyTable::new(gauntlet())?)
                    .with_line_goal(30)
                    .with_spawn_row(-1)
                    .with_combo_bonus(ComboBonus { per_step: 250 })
            }
            ModeKey::Practice {
                difficulty,
                line_goal,
                start_level,
            } => {
                let entries = match difficulty {
                    PracticeDifficulty::Easy => practice_easy(),
                    PracticeDifficulty::Normal => classic_normal(),
                    PracticeDifficulty::Hard => classic_hard(),
                };
                let mut config = Self::new(GameMode::Practice, DifficultyTable::new(entries)?)
                    .with_start_level(start_level)
                    .with_lock_delay(GENEROUS_LOCK_DELAY_MS);
                config.line_goal = line_goal;
                config
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the start level against the table.
    pub fn validate(&self) -> Result<(), TableError> {
        let max_level = self.table.max_level();
        if self.start_level > max_level {
            return Err(TableError::StartLevelOutOfRange {
                start_level: self.start_level,
                max_level,
            });
        }
        Ok(())
    }
}

const CLASSIC_GRAVITY: [u32; 16] = [
    1000, 800, 650, 500, 400, 320, 250, 200, 160, 140, 120, 110, 100, 90, 80, 70,
];

const HARD_GRAVITY: [u32; 16] = [
    700, 550, 430, 340, 270, 220, 180, 150, 125, 105, 90, 80, 70, 60, 50, 40,
];

/// (basic, medium, hard) per level for the standard ramp.
const CLASSIC_MIX: [(u32, u32, u32); 16] = [
    (7, 0, 0),
    (7, 1, 0),
    (7, 1, 0),
    (7, 2, 0),
    (7, 2, 1),
    (7, 3, 1),
    (7, 3, 1),
    (7, 3, 2),
    (7, 4, 2),
    (7, 4, 2),
    (7, 4, 2),
    (7, 4, 3),
    (7, 4, 3),
    (7, 4, 3),
    (7, 4, 3),
    (7, 4, 3),
];

const HARD_MIX: [(u32, u32, u32); 16] = [
    (7, 1, 0),
    (7, 2, 0),
    (7, 2, 1),
    (7, 3, 1),
    (7, 3, 2),
    (7, 4, 2),
    (7, 4, 3),
    (7, 4, 3),
    (7, 5, 3),
    (7, 5, 4),
    (7, 5, 4),
    (7, 5, 5),
    (7, 6, 5),
    (7, 6, 5),
    (7, 6, 6),
    (7, 6, 6),
];

/// Line thresholds shared by the classic tables: every 10 lines up to 100, then every 20.
fn classic_threshold(level: u32) -> u32 {
    if level <= 10 {
        level * 10
    } else {
        100 + (level - 10) * 20
    }
}

fn build(
    thresholds: impl Fn(u32) -> u32,
    mix: &[(u32, u32, u32)],
    gravity: &[u32],
) -> Vec<DifficultyEntry> {
    mix.iter()
        .zip(gravity)
        .enumerate()
        .map(|(level, (&(basic, medium, hard), &gravity_ms))| {
            DifficultyEntry::new(thresholds(level as u32), basic, medium, hard, gravity_ms)
        })
        .collect()
}

pub fn classic_normal() -> Vec<DifficultyEntry> {
    build(classic_threshold, &CLASSIC_MIX, &CLASSIC_GRAVITY)
}

pub fn classic_hard() -> Vec<DifficultyEntry> {
    build(classic_threshold, &HARD_MIX, &HARD_GRAVITY)
}

/// Nine levels spread evenly over the sprint distance.
pub fn sprint(goal: u32) -> Vec<DifficultyEntry> {
    let step = (goal / 8).max(1);
    build(|level| level * step, &CLASSIC_MIX[..9], &CLASSIC_GRAVITY[..9])
}

/// Hard picks from the start, fast gravity throughout.
pub fn gauntlet() -> Vec<DifficultyEntry> {
    build(
        |level| level * 5,
        &[
            (7, 2, 2),
            (7, 3, 2),
            (7, 3, 3),
            (7, 4, 3),
            (7, 4, 4),
            (7, 5, 4),
            (7, 5, 5),
        ],
        &[300, 250, 200, 160, 130, 100, 80],
    )
}

/// Basic pieces only, slow gravity.
pub fn practice_easy() -> Vec<DifficultyEntry> {
    build(
        |level| level * 15,
        &[(7, 0, 0), (8, 0, 0), (8, 1, 0), (9, 1, 0), (9, 2, 0), (9, 2, 1)],
        &[1500, 1300, 1150, 1000, 900, 800],
    )
}
