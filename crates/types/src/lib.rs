//! Shared types - constants, piece identities and input intents
//!
//! Everything in this crate is plain data shared by the simulation core, the placement
//! engine and the runner binary. Nothing here has behavior beyond small conversions.
//!
//! # Grid Dimensions
//!
//! - **Width**: 11 columns (indexed 0-10)
//! - **Height**: 22 rows (indexed 0-21, row 0 at the top)
//!
//! # Timing Constants
//!
//! All timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep used by the runner (~60 FPS) |
//! | `LOCK_DELAY_MS` | 500 | Grace period before a grounded piece locks |
//! | `GENEROUS_LOCK_DELAY_MS` | 2000 | Lock delay used by practice rounds |
//! | `FAST_FALL_DIVISOR` | 10 | Gravity interval divisor while soft falling |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{Intent, PieceType, Shape, Tier, GRID_WIDTH};
//!
//! let piece = PieceType::standard(Shape::T, Tier::Medium);
//! assert_eq!(piece.tier(), Some(Tier::Medium));
//! assert_eq!(PieceType::from_str(piece.as_str()), Some(piece));
//!
//! assert_eq!(Intent::from_str("hardDrop"), Some(Intent::HardDrop));
//! assert_eq!(GRID_WIDTH, 11);
//! ```

use serde::Serialize;

/// Grid width in cells (11 columns)
pub const GRID_WIDTH: u8 = 11;

/// Grid height in cells (22 rows)
pub const GRID_HEIGHT: u8 = 22;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Lock delay when a piece is grounded.
pub const LOCK_DELAY_MS: u32 = 500;

/// Lock delay for the generous (practice) variant.
pub const GENEROUS_LOCK_DELAY_MS: u32 = 2000;

/// Gravity interval is divided by this while fast fall is held.
pub const FAST_FALL_DIVISOR: u32 = 10;

/// Number of upcoming pieces exposed by the bag.
pub const LOOKAHEAD_LEN: usize = 3;

/// Highest reachable level regardless of table length.
pub const MAX_LEVEL: u32 = 15;

/// Chebyshev radius cleared by a bomb piece on lock.
pub const BOMB_RADIUS: i8 = 2;

/// Size of the guaranteed one-of-each basic set in every bag.
pub const BASIC_SET_LEN: usize = 7;

/// Base points per cleared line.
pub const LINE_BASE_SCORE: u32 = 1000;

/// Extra points per line for every additional line in the same placement.
pub const LINE_STEP_SCORE: u32 = 250;

/// The seven logical shapes. Every tier has its own mask for each of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl Shape {
    pub const ALL: [Shape; 7] = [
        Shape::I,
        Shape::O,
        Shape::T,
        Shape::S,
        Shape::Z,
        Shape::J,
        Shape::L,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(Shape::I),
            "o" => Some(Shape::O),
            "t" => Some(Shape::T),
            "s" => Some(Shape::S),
            "z" => Some(Shape::Z),
            "j" => Some(Shape::J),
            "l" => Some(Shape::L),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::I => "i",
            Shape::O => "o",
            Shape::T => "t",
            Shape::S => "s",
            Shape::Z => "z",
            Shape::J => "j",
            Shape::L => "l",
        }
    }
}

/// Difficulty class of a standard piece (the bag draws from one pool per tier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Basic,
    Medium,
    Hard,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Basic, Tier::Medium, Tier::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Basic => "basic",
            Tier::Medium => "medium",
            Tier::Hard => "hard",
        }
    }
}

/// Tier recorded on a grid cell. `Empty` only ever appears on unoccupied cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeTier {
    #[default]
    Empty,
    Basic,
    Medium,
    Hard,
    Special,
}

impl From<Tier> for ShapeTier {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Basic => ShapeTier::Basic,
            Tier::Medium => ShapeTier::Medium,
            Tier::Hard => ShapeTier::Hard,
        }
    }
}

/// Piece identity.
///
/// There are 22 standard slots: 7 shapes × 3 tiers plus one `Reserved` slot that maps
/// to an empty shape. `Bomb` is the single-cell special piece. Serializes as its
/// [`PieceType::as_str`] name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    Standard { shape: Shape, tier: Tier },
    Reserved,
    Bomb,
}

impl PieceType {
    pub const fn standard(shape: Shape, tier: Tier) -> Self {
        PieceType::Standard { shape, tier }
    }

    pub fn shape(&self) -> Option<Shape> {
        match self {
            PieceType::Standard { shape, .. } => Some(*shape),
            _ => None,
        }
    }

    pub fn tier(&self) -> Option<Tier> {
        match self {
            PieceType::Standard { tier, .. } => Some(*tier),
            _ => None,
        }
    }

    /// Tier written into grid cells when this piece locks.
    pub fn cell_tier(&self) -> ShapeTier {
        match self {
            PieceType::Standard { tier, .. } => (*tier).into(),
            PieceType::Reserved => ShapeTier::Empty,
            PieceType::Bomb => ShapeTier::Special,
        }
    }

    /// Parse from `"<tier>_<shape>"`, `"reserved"` or `"bomb"` (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        match lower.as_str() {
            "reserved" => return Some(PieceType::Reserved),
            "bomb" => return Some(PieceType::Bomb),
            _ => {}
        }
        let (tier, shape) = lower.split_once('_')?;
        let tier = match tier {
            "basic" => Tier::Basic,
            "medium" => Tier::Medium,
            "hard" => Tier::Hard,
            _ => return None,
        };
        Some(PieceType::standard(Shape::from_str(shape)?, tier))
    }

    pub fn as_str(&self) -> &'static str {
        const NAMES: [[&str; 7]; 3] = [
            ["basic_i", "basic_o", "basic_t", "basic_s", "basic_z", "basic_j", "basic_l"],
            ["medium_i", "medium_o", "medium_t", "medium_s", "medium_z", "medium_j", "medium_l"],
            ["hard_i", "hard_o", "hard_t", "hard_s", "hard_z", "hard_j", "hard_l"],
        ];
        match self {
            PieceType::Standard { shape, tier } => {
                let t = Tier::ALL.iter().position(|x| x == tier).unwrap_or(0);
                let s = Shape::ALL.iter().position(|x| x == shape).unwrap_or(0);
                NAMES[t][s]
            }
            PieceType::Reserved => "reserved",
            PieceType::Bomb => "bomb",
        }
    }
}

impl Serialize for PieceType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// 8-bit RGBA display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Color of an empty cell (transparent black).
    pub const EMPTY: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

/// Rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotateDir {
    Cw,
    Ccw,
}

/// Rotation states (North = spawn orientation)
///
/// The cycle goes: North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// ```
    /// use blockfall_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise (-90°)
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    pub fn rotate(&self, dir: RotateDir) -> Self {
        match dir {
            RotateDir::Cw => self.rotate_cw(),
            RotateDir::Ccw => self.rotate_ccw(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }
}

/// Logical input intents accepted by a session.
///
/// Raw devices are mapped to these by the caller; the core never polls hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    RotateCw,
    RotateCcw,
    /// Start fast gravity (held soft drop)
    SoftFallOn,
    /// Return to normal gravity
    SoftFallOff,
    HardDrop,
    Hold,
    /// Swap the active piece for a bomb if a charge is available
    ActivateSpecial,
}

impl Intent {
    /// Parse intent from string (case-insensitive, camelCase on the wire)
    ///
    /// ```
    /// use blockfall_types::Intent;
    ///
    /// assert_eq!(Intent::from_str("moveLeft"), Some(Intent::MoveLeft));
    /// assert_eq!(Intent::from_str("SOFTFALLON"), Some(Intent::SoftFallOn));
    /// assert_eq!(Intent::from_str("pause"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(Intent::MoveLeft),
            "moveright" => Some(Intent::MoveRight),
            "rotatecw" => Some(Intent::RotateCw),
            "rotateccw" => Some(Intent::RotateCcw),
            "softfallon" => Some(Intent::SoftFallOn),
            "softfalloff" => Some(Intent::SoftFallOff),
            "harddrop" => Some(Intent::HardDrop),
            "hold" => Some(Intent::Hold),
            "activatespecial" => Some(Intent::ActivateSpecial),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::MoveLeft => "moveLeft",
            Intent::MoveRight => "moveRight",
            Intent::RotateCw => "rotateCw",
            Intent::RotateCcw => "rotateCcw",
            Intent::SoftFallOn => "softFallOn",
            Intent::SoftFallOff => "softFallOff",
            Intent::HardDrop => "hardDrop",
            Intent::Hold => "hold",
            Intent::ActivateSpecial => "activateSpecial",
        }
    }
}

/// Top-level game modes. Each one owns its own difficulty tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Classic,
    Sprint,
    Challenge,
    Practice,
}

impl GameMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(GameMode::Classic),
            "sprint" => Some(GameMode::Sprint),
            "challenge" => Some(GameMode::Challenge),
            "practice" => Some(GameMode::Practice),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Sprint => "sprint",
            GameMode::Challenge => "challenge",
            GameMode::Practice => "practice",
        }
    }
}

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EndReason {
    ToppedOut,
    GoalReached,
}

/// Special effect attached to a piece type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityKind {
    Bomb,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_slots_count_twenty_two() {
        let mut slots: Vec<PieceType> = Tier::ALL
            .iter()
            .flat_map(|&t| Shape::ALL.iter().map(move |&s| PieceType::standard(s, t)))
            .collect();
        slots.push(PieceType::Reserved);
        assert_eq!(slots.len(), 22);
    }

    #[test]
    fn piece_type_names_parse_back() {
        for tier in Tier::ALL {
            for shape in Shape::ALL {
                let p = PieceType::standard(shape, tier);
                assert_eq!(PieceType::from_str(p.as_str()), Some(p));
            }
        }
        assert_eq!(PieceType::from_str("BOMB"), Some(PieceType::Bomb));
        assert_eq!(PieceType::from_str("basic_q"), None);
        assert_eq!(PieceType::from_str("extreme_i"), None);
    }

    #[test]
    fn cell_tier_mapping() {
        assert_eq!(PieceType::Bomb.cell_tier(), ShapeTier::Special);
        assert_eq!(PieceType::Reserved.cell_tier(), ShapeTier::Empty);
        assert_eq!(
            PieceType::standard(Shape::O, Tier::Hard).cell_tier(),
            ShapeTier::Hard
        );
    }

    #[test]
    fn intent_strings_are_stable() {
        for intent in [
            Intent::MoveLeft,
            Intent::MoveRight,
            Intent::RotateCw,
            Intent::RotateCcw,
            Intent::SoftFallOn,
            Intent::SoftFallOff,
            Intent::HardDrop,
            Intent::Hold,
            Intent::ActivateSpecial,
        ] {
            assert_eq!(Intent::from_str(intent.as_str()), Some(intent));
        }
    }

    #[test]
    fn game_mode_parse() {
        assert_eq!(GameMode::from_str("Sprint"), Some(GameMode::Sprint));
        assert_eq!(GameMode::from_str("versus"), None);
    }
}
