//! Piece catalog - block masks, colors and tiers for every piece type
//!
//! Each of the seven logical shapes has a mask per tier: basic pieces are the classic
//! tetrominoes, medium pieces are mostly pentominoes and hard pieces are awkward six to
//! eight block shapes. Lookup is total: the reserved slot yields an empty 0×0 mask.
//!
//! Special abilities live here too, next to the data they belong to:
//! `PieceType -> AbilityKind -> effect fn`.

use arrayvec::ArrayVec;

use crate::grid::Grid;
use crate::types::{AbilityKind, PieceType, RotateDir, Rgba, Shape, ShapeTier, Tier, BOMB_RADIUS};

/// Largest mask side length supported by the catalog.
pub const MAX_MASK_DIM: usize = 5;

/// Upper bound on blocks in a single mask.
pub const MAX_MASK_CELLS: usize = MAX_MASK_DIM * MAX_MASK_DIM;

/// Upper bound on cells touched by one bomb blast.
pub const BLAST_CAPACITY: usize = (2 * BOMB_RADIUS as usize + 1) * (2 * BOMB_RADIUS as usize + 1);

/// Cells affected by a special effect, as (x, y) grid coordinates.
pub type BlastCells = ArrayVec<(i8, i8), BLAST_CAPACITY>;

/// Rectangular boolean block mask. Row `r`, column `c` is bit `c` of `rows[r]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mask {
    width: u8,
    height: u8,
    rows: [u8; MAX_MASK_DIM],
}

impl Mask {
    pub const EMPTY: Mask = Mask {
        width: 0,
        height: 0,
        rows: [0; MAX_MASK_DIM],
    };

    /// Build a mask from ASCII rows where `#` marks a block.
    ///
    /// All rows must have the same length and fit in `MAX_MASK_DIM`.
    pub const fn from_ascii(rows: &[&str]) -> Mask {
        assert!(rows.len() <= MAX_MASK_DIM);
        let width = if rows.is_empty() { 0 } else { rows[0].len() };
        assert!(width <= MAX_MASK_DIM);

        let mut bits = [0u8; MAX_MASK_DIM];
        let mut r = 0;
        while r < rows.len() {
            let bytes = rows[r].as_bytes();
            assert!(bytes.len() == width);
            let mut c = 0;
            while c < width {
                if bytes[c] == b'#' {
                    bits[r] |= 1 << c;
                }
                c += 1;
            }
            r += 1;
        }

        Mask {
            width: width as u8,
            height: rows.len() as u8,
            rows: bits,
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|&r| r == 0)
    }

    /// Whether the block at (`row`, `col`) is set. Out of range is `false`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.height as usize && col < self.width as usize && (self.rows[row] >> col) & 1 == 1
    }

    /// Number of blocks in the mask
    pub fn count(&self) -> usize {
        self.rows.iter().map(|r| r.count_ones() as usize).sum()
    }

    /// Block offsets as (dx, dy) relative to the mask origin, row-major.
    pub fn blocks(&self) -> impl Iterator<Item = (i8, i8)> {
        let m = *self;
        (0..m.height as usize).flat_map(move |r| {
            (0..m.width as usize)
                .filter(move |&c| m.get(r, c))
                .map(move |c| (c as i8, r as i8))
        })
    }

    /// The mask rotated by a quarter turn; width and height swap.
    pub fn rotated(&self, dir: RotateDir) -> Mask {
        let (w, h) = (self.width as usize, self.height as usize);
        let mut rows = [0u8; MAX_MASK_DIM];
        for (r, row) in rows.iter_mut().enumerate().take(w) {
            for c in 0..h {
                let set = match dir {
                    RotateDir::Cw => self.get(h - 1 - c, r),
                    RotateDir::Ccw => self.get(c, w - 1 - r),
                };
                if set {
                    *row |= 1 << c;
                }
            }
        }
        Mask {
            width: h as u8,
            height: w as u8,
            rows,
        }
    }
}

/// Immutable description of a piece type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceShape {
    pub mask: Mask,
    pub color: Rgba,
    pub tier: ShapeTier,
}

impl PieceShape {
    pub fn width(&self) -> u8 {
        self.mask.width()
    }

    pub fn height(&self) -> u8 {
        self.mask.height()
    }
}

// Order follows `Shape::ALL`: I, O, T, S, Z, J, L.
const BASIC_MASKS: [Mask; 7] = [
    Mask::from_ascii(&["####"]),
    Mask::from_ascii(&["##", "##"]),
    Mask::from_ascii(&["###", ".#."]),
    Mask::from_ascii(&[".##", "##."]),
    Mask::from_ascii(&["##.", ".##"]),
    Mask::from_ascii(&["#..", "###"]),
    Mask::from_ascii(&["..#", "###"]),
];

const MEDIUM_MASKS: [Mask; 7] = [
    Mask::from_ascii(&["#####"]),
    Mask::from_ascii(&["###", "###"]),
    Mask::from_ascii(&["###", ".#.", ".#."]),
    Mask::from_ascii(&["..##", "###."]),
    Mask::from_ascii(&["##.", ".#.", ".##"]),
    Mask::from_ascii(&["#...", "####"]),
    Mask::from_ascii(&["...#", "####"]),
];

const HARD_MASKS: [Mask; 7] = [
    Mask::from_ascii(&["#####", "..#.."]),
    Mask::from_ascii(&["###", "#.#", "###"]),
    Mask::from_ascii(&["###", ".#.", "###"]),
    Mask::from_ascii(&["..#", ".##", "##."]),
    Mask::from_ascii(&["##..", ".##.", "..##"]),
    Mask::from_ascii(&["#..", "#..", "###"]),
    Mask::from_ascii(&["#.#", "###"]),
];

const BOMB_MASK: Mask = Mask::from_ascii(&["#"]);

const BASE_COLORS: [Rgba; 7] = [
    Rgba::opaque(0, 240, 240),
    Rgba::opaque(240, 240, 0),
    Rgba::opaque(160, 0, 240),
    Rgba::opaque(0, 240, 0),
    Rgba::opaque(240, 0, 0),
    Rgba::opaque(0, 0, 240),
    Rgba::opaque(240, 160, 0),
];

const BOMB_COLOR: Rgba = Rgba::opaque(255, 80, 40);

const fn shade(c: Rgba, num: u16, den: u16) -> Rgba {
    Rgba::opaque(
        (c.r as u16 * num / den) as u8,
        (c.g as u16 * num / den) as u8,
        (c.b as u16 * num / den) as u8,
    )
}

fn shape_index(shape: Shape) -> usize {
    match shape {
        Shape::I => 0,
        Shape::O => 1,
        Shape::T => 2,
        Shape::S => 3,
        Shape::Z => 4,
        Shape::J => 5,
        Shape::L => 6,
    }
}

/// Look up the rotation-0 shape, color and tier for a piece type.
pub fn lookup(piece: PieceType) -> PieceShape {
    match piece {
        PieceType::Standard { shape, tier } => {
            let i = shape_index(shape);
            let (mask, color) = match tier {
                Tier::Basic => (BASIC_MASKS[i], BASE_COLORS[i]),
                Tier::Medium => (MEDIUM_MASKS[i], shade(BASE_COLORS[i], 3, 4)),
                Tier::Hard => (HARD_MASKS[i], shade(BASE_COLORS[i], 1, 2)),
            };
            PieceShape {
                mask,
                color,
                tier: tier.into(),
            }
        }
        PieceType::Reserved => PieceShape {
            mask: Mask::EMPTY,
            color: Rgba::EMPTY,
            tier: ShapeTier::Empty,
        },
        PieceType::Bomb => PieceShape {
            mask: BOMB_MASK,
            color: BOMB_COLOR,
            tier: ShapeTier::Special,
        },
    }
}

/// Every piece type of a tier, in `Shape::ALL` order.
pub fn pool(tier: Tier) -> [PieceType; 7] {
    Shape::ALL.map(|shape| PieceType::standard(shape, tier))
}

type EffectFn = fn(&mut Grid, i8, i8) -> BlastCells;

const EFFECTS: [(AbilityKind, EffectFn); 1] = [(AbilityKind::Bomb, detonate)];

/// Special ability carried by a piece type, if any.
pub fn ability_of(piece: PieceType) -> Option<AbilityKind> {
    match piece {
        PieceType::Bomb => Some(AbilityKind::Bomb),
        PieceType::Standard { .. } | PieceType::Reserved => None,
    }
}

/// Run the effect of `kind` centered on (`x`, `y`) and report the affected cells.
pub fn apply_ability(kind: AbilityKind, grid: &mut Grid, x: i8, y: i8) -> BlastCells {
    EFFECTS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, effect)| effect(grid, x, y))
        .unwrap_or_default()
}

/// Empty every in-bounds cell within `BOMB_RADIUS` (Chebyshev) of the center,
/// hardened or not.
fn detonate(grid: &mut Grid, cx: i8, cy: i8) -> BlastCells {
    let mut affected = BlastCells::new();
    for y in cy - BOMB_RADIUS..=cy + BOMB_RADIUS {
        for x in cx - BOMB_RADIUS..=cx + BOMB_RADIUS {
            if grid.clear_cell(x, y) {
                affected.push((x, y));
            }
        }
    }
    affected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_from_ascii() {
        let t = Mask::from_ascii(&["###", ".#."]);
        assert_eq!(t.width(), 3);
        assert_eq!(t.height(), 2);
        assert_eq!(t.count(), 4);
        assert!(t.get(0, 0) && t.get(0, 2) && t.get(1, 1));
        assert!(!t.get(1, 0));
        assert!(!t.get(5, 5));
    }

    #[test]
    fn test_rotate_cw_then_ccw_is_identity() {
        for tier in Tier::ALL {
            for piece in pool(tier) {
                let mask = lookup(piece).mask;
                assert_eq!(mask.rotated(RotateDir::Cw).rotated(RotateDir::Ccw), mask);
                let four = mask
                    .rotated(RotateDir::Cw)
                    .rotated(RotateDir::Cw)
                    .rotated(RotateDir::Cw)
                    .rotated(RotateDir::Cw);
                assert_eq!(four, mask);
            }
        }
    }

    #[test]
    fn test_rotate_t_clockwise() {
        // T pointing down turns to point left.
        let t = Mask::from_ascii(&["###", ".#."]);
        assert_eq!(t.rotated(RotateDir::Cw), Mask::from_ascii(&[".#", "##", ".#"]));
        assert_eq!(t.rotated(RotateDir::Ccw), Mask::from_ascii(&["#.", "##", "#."]));
    }

    #[test]
    fn test_blocks_are_row_major() {
        let s = Mask::from_ascii(&[".##", "##."]);
        let blocks: Vec<_> = s.blocks().collect();
        assert_eq!(blocks, vec![(1, 0), (2, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_lookup_tiers_and_sizes() {
        for piece in pool(Tier::Basic) {
            let shape = lookup(piece);
            assert_eq!(shape.mask.count(), 4);
            assert_eq!(shape.tier, ShapeTier::Basic);
        }
        for piece in pool(Tier::Medium) {
            assert!(lookup(piece).mask.count() >= 5);
        }
        for piece in pool(Tier::Hard) {
            assert!(lookup(piece).mask.count() >= 5);
            assert_eq!(lookup(piece).tier, ShapeTier::Hard);
        }
    }

    #[test]
    fn test_reserved_slot_is_empty() {
        let shape = lookup(PieceType::Reserved);
        assert_eq!(shape.width(), 0);
        assert_eq!(shape.height(), 0);
        assert!(shape.mask.is_empty());
        assert_eq!(shape.tier, ShapeTier::Empty);
    }

    #[test]
    fn test_bomb_is_single_special_cell() {
        let shape = lookup(PieceType::Bomb);
        assert_eq!(shape.mask.count(), 1);
        assert_eq!(shape.tier, ShapeTier::Special);
        assert_eq!(ability_of(PieceType::Bomb), Some(AbilityKind::Bomb));
        assert_eq!(ability_of(PieceType::standard(Shape::I, Tier::Hard)), None);
    }

    #[test]
    fn test_detonate_clears_radius_and_clips_to_bounds() {
        let mut grid = Grid::new();
        for x in 0..grid.width() as i8 {
            for y in 15..grid.height() as i8 {
                grid.fill_cell(x, y, Rgba::opaque(1, 1, 1), ShapeTier::Basic);
            }
        }

        // Corner blast: only the 3x3 in-bounds quarter is affected.
        let affected = apply_ability(AbilityKind::Bomb, &mut grid, 0, 21);
        assert_eq!(affected.len(), 9);
        assert!(!grid.is_occupied(0, 21));
        assert!(!grid.is_occupied(2, 19));
        assert!(grid.is_occupied(3, 21));

        let affected = apply_ability(AbilityKind::Bomb, &mut grid, 6, 17);
        assert_eq!(affected.len(), BLAST_CAPACITY);
        assert!(!grid.is_occupied(4, 15));
        assert!(!grid.is_occupied(8, 19));
        assert!(grid.is_occupied(9, 17));
    }
}
