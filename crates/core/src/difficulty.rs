//! Difficulty table - level thresholds, bag composition and gravity
//!
//! A table is an ordered list of entries. Entry `L` becomes the active level once the
//! total number of cleared lines reaches its `lines_threshold`. Every entry says how
//! a bag is composed at that level and how fast pieces fall.
//!
//! Tables are validated when built; a session never runs with a malformed one.

use std::fmt;

use crate::types::{BASIC_SET_LEN, MAX_LEVEL};

/// One level of a difficulty table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DifficultyEntry {
    /// Total lines cleared needed to reach this level
    pub lines_threshold: u32,
    /// Basic slots per bag: one of each basic shape plus `basic_count - 7` extras
    pub basic_count: u32,
    /// Medium-tier picks per bag
    pub medium_count: u32,
    /// Hard-tier picks per bag
    pub hard_count: u32,
    /// Milliseconds per row of gravity
    pub gravity_ms: u32,
}

impl DifficultyEntry {
    pub const fn new(
        lines_threshold: u32,
        basic_count: u32,
        medium_count: u32,
        hard_count: u32,
        gravity_ms: u32,
    ) -> Self {
        Self {
            lines_threshold,
            basic_count,
            medium_count,
            hard_count,
            gravity_ms,
        }
    }

    /// Number of pieces in a bag built from this entry.
    pub fn bag_len(&self) -> usize {
        (self.basic_count + self.medium_count + self.hard_count) as usize
    }
}

/// Reasons a difficulty table or mode configuration is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    Empty,
    FirstThresholdNotZero,
    Unsorted { index: usize },
    TooFewBasic { index: usize },
    ZeroGravity { index: usize },
    StartLevelOutOfRange { start_level: u32, max_level: u32 },
}

impl TableError {
    pub fn code(self) -> &'static str {
        match self {
            TableError::Empty
            | TableError::FirstThresholdNotZero
            | TableError::Unsorted { .. }
            | TableError::TooFewBasic { .. }
            | TableError::ZeroGravity { .. } => "invalid_table",
            TableError::StartLevelOutOfRange { .. } => "invalid_start_level",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            TableError::Empty => "difficulty table has no entries",
            TableError::FirstThresholdNotZero => "first entry must start at 0 lines",
            TableError::Unsorted { .. } => "line thresholds must be strictly increasing",
            TableError::TooFewBasic { .. } => "every bag needs the full basic set",
            TableError::ZeroGravity { .. } => "gravity interval must be positive",
            TableError::StartLevelOutOfRange { .. } => "start level is beyond the table",
        }
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Unsorted { index }
            | TableError::TooFewBasic { index }
            | TableError::ZeroGravity { index } => {
                write!(f, "{}: {} (entry {})", self.code(), self.message(), index)
            }
            TableError::StartLevelOutOfRange {
                start_level,
                max_level,
            } => write!(
                f,
                "{}: {} ({} > {})",
                self.code(),
                self.message(),
                start_level,
                max_level
            ),
            _ => write!(f, "{}: {}", self.code(), self.message()),
        }
    }
}

impl std::error::Error for TableError {}

/// Validated, immutable level table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyTable {
    entries: Vec<DifficultyEntry>,
}

impl DifficultyTable {
    pub fn new(entries: Vec<DifficultyEntry>) -> Result<Self, TableError> {
        let first = entries.first().ok_or(TableError::Empty)?;
        if first.lines_threshold != 0 {
            return Err(TableError::FirstThresholdNotZero);
        }
        for (index, entry) in entries.iter().enumerate() {
            if index > 0 && entry.lines_threshold <= entries[index - 1].lines_threshold {
                return Err(TableError::Unsorted { index });
            }
            if (entry.basic_count as usize) < BASIC_SET_LEN {
                return Err(TableError::TooFewBasic { index });
            }
            if entry.gravity_ms == 0 {
                return Err(TableError::ZeroGravity { index });
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[DifficultyEntry] {
        &self.entries
    }

    /// Highest reachable level: the last entry, capped at `MAX_LEVEL`.
    pub fn max_level(&self) -> u32 {
        ((self.entries.len() - 1) as u32).min(MAX_LEVEL)
    }

    /// Highest level whose threshold has been reached by `lines_cleared`.
    pub fn calculate_level(&self, lines_cleared: u32) -> u32 {
        let reached = self
            .entries
            .iter()
            .take_while(|e| e.lines_threshold <= lines_cleared)
            .count();
        // entries[0] has threshold 0, so at least one entry is always reached
        (reached.saturating_sub(1) as u32).min(self.max_level())
    }

    /// Entry for `level`, clamped to the table.
    pub fn entry(&self, level: u32) -> &DifficultyEntry {
        let idx = level.min(self.max_level()) as usize;
        &self.entries[idx]
    }

    pub fn gravity_ms(&self, level: u32) -> u32 {
        self.entry(level).gravity_ms
    }
}
