//! Bag randomizer - difficulty-scaled shuffled bags with a fixed lookahead
//!
//! Every bag holds one of each basic shape plus the extra basic, medium and hard picks
//! that the difficulty entry for the current level asks for. The bag is shuffled and
//! drawn in order, so each guaranteed basic piece appears exactly once per bag.
//!
//! The next bag is built lazily, only when the lookahead has to look past the end of
//! the current bag or the current bag runs out. Level changes affect bags generated
//! after the change; bags already built are left alone.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::catalog::pool;
use crate::difficulty::DifficultyTable;
use crate::types::{PieceType, Shape, Tier, BASIC_SET_LEN, LOOKAHEAD_LEN};

/// Shuffled-bag piece generator.
#[derive(Debug, Clone)]
pub struct BagRandomizer {
    table: DifficultyTable,
    level: u32,
    rng: StdRng,
    current: Vec<PieceType>,
    index: usize,
    next: Option<Vec<PieceType>>,
    /// Buffer of the last exhausted bag, reused for the next one generated
    spare: Vec<PieceType>,
    lookahead: Vec<PieceType>,
    lookahead_len: usize,
}

impl BagRandomizer {
    /// Create a randomizer with the standard lookahead length.
    pub fn new(table: DifficultyTable, start_level: u32, seed: u64) -> Self {
        Self::with_lookahead(table, start_level, seed, LOOKAHEAD_LEN)
    }

    /// Create a randomizer with a custom lookahead length.
    ///
    /// The length is capped at the basic set size so that the current bag plus one
    /// next bag can always satisfy it.
    pub fn with_lookahead(
        table: DifficultyTable,
        start_level: u32,
        seed: u64,
        lookahead_len: usize,
    ) -> Self {
        let mut bag = Self {
            table,
            level: start_level,
            rng: StdRng::seed_from_u64(seed),
            current: Vec::new(),
            index: 0,
            next: None,
            spare: Vec::new(),
            lookahead: Vec::with_capacity(lookahead_len.min(BASIC_SET_LEN)),
            lookahead_len: lookahead_len.min(BASIC_SET_LEN),
        };
        bag.reset(start_level);
        bag
    }

    /// Build one shuffled bag for the current level.
    fn generate_bag(&mut self) -> Vec<PieceType> {
        let entry = *self.table.entry(self.level);
        let mut bag = std::mem::take(&mut self.spare);
        bag.clear();
        bag.reserve(entry.bag_len());

        bag.extend(Shape::ALL.map(|s| PieceType::standard(s, Tier::Basic)));
        let extra_basic = (entry.basic_count as usize).saturating_sub(BASIC_SET_LEN);
        self.draw_from_pool(&mut bag, Tier::Basic, extra_basic);
        self.draw_from_pool(&mut bag, Tier::Medium, entry.medium_count as usize);
        self.draw_from_pool(&mut bag, Tier::Hard, entry.hard_count as usize);

        bag.shuffle(&mut self.rng);
        bag
    }

    /// Append `count` uniform picks (with replacement) from a tier's pool.
    fn draw_from_pool(&mut self, bag: &mut Vec<PieceType>, tier: Tier, count: usize) {
        let pieces = pool(tier);
        for _ in 0..count {
            bag.push(pieces[self.rng.random_range(0..pieces.len())]);
        }
    }

    /// Make sure the next bag exists.
    pub fn ensure_next(&mut self) {
        if self.next.is_none() {
            let bag = self.generate_bag();
            self.next = Some(bag);
        }
    }

    pub fn next_ready(&self) -> bool {
        self.next.is_some()
    }

    /// Draw the next piece and refill the lookahead.
    pub fn next_piece(&mut self) -> PieceType {
        if self.index >= self.current.len() {
            self.roll_over();
        }
        let piece = self.current[self.index];
        self.index += 1;
        if self.index == self.current.len() {
            self.roll_over();
        }
        self.refill_lookahead();
        piece
    }

    /// The pre-generated next bag becomes current.
    fn roll_over(&mut self) {
        self.ensure_next();
        if let Some(bag) = self.next.take() {
            self.spare = std::mem::replace(&mut self.current, bag);
        }
        self.index = 0;
    }

    fn refill_lookahead(&mut self) {
        self.lookahead.clear();
        let remaining = self.current.len() - self.index;
        self.lookahead
            .extend(self.current[self.index..].iter().take(self.lookahead_len));
        if remaining < self.lookahead_len {
            self.ensure_next();
            if let Some(next) = &self.next {
                self.lookahead
                    .extend(next.iter().take(self.lookahead_len - remaining));
            }
        }
    }

    /// Upcoming pieces, always exactly the configured length.
    pub fn peek(&self) -> &[PieceType] {
        &self.lookahead
    }

    /// Affects bags generated after this call only.
    pub fn update_level(&mut self, level: u32) {
        self.level = level;
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Discard all bag state and rebuild from `start_level`.
    pub fn reset(&mut self, start_level: u32) {
        self.level = start_level;
        self.next = None;
        self.spare = std::mem::take(&mut self.current);
        self.current = self.generate_bag();
        self.index = 0;
        self.refill_lookahead();
    }

    /// The whole bag currently being drawn from
    pub fn current_bag(&self) -> &[PieceType] {
        &self.current
    }

    /// Pieces left in the current bag
    pub fn remaining(&self) -> &[PieceType] {
        &self.current[self.index..]
    }

    pub fn lookahead_len(&self) -> usize {
        self.lookahead_len
    }

    pub fn table(&self) -> &DifficultyTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyEntry;

    fn basic_only() -> DifficultyTable {
        DifficultyTable::new(vec![DifficultyEntry::new(0, 7, 0, 0, 1000)]).unwrap()
    }

    fn ramp() -> DifficultyTable {
        DifficultyTable::new(vec![
            DifficultyEntry::new(0, 7, 0, 0, 1000),
            DifficultyEntry::new(10, 9, 2, 3, 500),
        ])
        .unwrap()
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = BagRandomizer::new(ramp(), 1, 42);
        let mut b = BagRandomizer::new(ramp(), 1, 42);
        for _ in 0..50 {
            assert_eq!(a.next_piece(), b.next_piece());
        }
    }

    #[test]
    fn test_lookahead_always_full() {
        let mut bag = BagRandomizer::new(basic_only(), 0, 7);
        assert_eq!(bag.peek().len(), LOOKAHEAD_LEN);
        for _ in 0..40 {
            bag.next_piece();
            assert_eq!(bag.peek().len(), LOOKAHEAD_LEN);
        }
    }

    #[test]
    fn test_peek_matches_following_draws() {
        let mut bag = BagRandomizer::new(ramp(), 1, 99);
        for _ in 0..30 {
            let preview: Vec<_> = bag.peek().to_vec();
            let mut ahead = bag.clone();
            let drawn: Vec<_> = (0..preview.len()).map(|_| ahead.next_piece()).collect();
            assert_eq!(preview, drawn);
            bag.next_piece();
        }
    }

    #[test]
    fn test_next_bag_is_lazy() {
        let mut bag = BagRandomizer::new(basic_only(), 0, 3);
        assert!(!bag.next_ready());
        // 7-piece bag, lookahead 3: the boundary is crossed once 5 pieces are gone.
        for _ in 0..4 {
            bag.next_piece();
            assert!(!bag.next_ready());
        }
        bag.next_piece();
        assert!(bag.next_ready());
    }

    #[test]
    fn test_level_change_applies_to_later_bags_only() {
        let mut bag = BagRandomizer::new(ramp(), 0, 11);
        for _ in 0..5 {
            bag.next_piece();
        }
        // next bag already exists at level 0
        assert!(bag.next_ready());
        bag.update_level(1);
        for _ in 0..2 {
            bag.next_piece();
        }
        // the pre-built level 0 bag is now current
        assert_eq!(bag.current_bag().len(), 7);
        for _ in 0..7 {
            bag.next_piece();
        }
        assert_eq!(bag.current_bag().len(), 14);
    }

    #[test]
    fn test_reset_rebuilds_from_level() {
        let mut bag = BagRandomizer::new(ramp(), 0, 5);
        bag.next_piece();
        bag.reset(1);
        assert_eq!(bag.level(), 1);
        assert_eq!(bag.remaining().len(), 14);
        assert!(!bag.next_ready());
    }

    #[test]
    fn test_lookahead_len_is_capped() {
        let bag = BagRandomizer::with_lookahead(basic_only(), 0, 1, 20);
        assert_eq!(bag.lookahead_len(), BASIC_SET_LEN);
        assert_eq!(bag.peek().len(), BASIC_SET_LEN);
    }
}
