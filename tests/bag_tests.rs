//! Bag randomizer tests

use std::collections::HashSet;

use blockfall::core::{BagRandomizer, DifficultyEntry, DifficultyTable};
use blockfall::types::{PieceType, Shape, Tier, LOOKAHEAD_LEN};

fn table(entries: &[(u32, u32, u32, u32)]) -> DifficultyTable {
    DifficultyTable::new(
        entries
            .iter()
            .map(|&(t, b, m, h)| DifficultyEntry::new(t, b, m, h, 1000))
            .collect(),
    )
    .unwrap()
}

fn basics() -> HashSet<PieceType> {
    Shape::ALL
        .iter()
        .map(|&s| PieceType::standard(s, Tier::Basic))
        .collect()
}

/// A level 0 bag of only the seven basics deals each exactly once, and the eighth
/// draw comes out of a fresh bag.
#[test]
fn test_scenario_basic_bag_each_once() {
    let mut bag = BagRandomizer::new(table(&[(0, 7, 0, 0)]), 0, 2024);
    let first: Vec<_> = (0..7).map(|_| bag.next_piece()).collect();
    assert_eq!(first.iter().copied().collect::<HashSet<_>>(), basics());

    // The current bag has already rolled over to the fresh one.
    let fresh = bag.current_bag().to_vec();
    assert_eq!(fresh.len(), 7);
    assert_eq!(bag.next_piece(), fresh[0]);
}

#[test]
fn test_every_bag_contains_full_basic_set() {
    let mut bag = BagRandomizer::new(table(&[(0, 9, 3, 2)]), 0, 5);
    for _ in 0..20 {
        let len = bag.current_bag().len();
        assert_eq!(len, 14);
        let dealt: Vec<_> = (0..len).map(|_| bag.next_piece()).collect();
        let dealt_basics: Vec<_> = dealt
            .iter()
            .filter(|p| p.tier() == Some(Tier::Basic))
            .collect();
        assert_eq!(dealt_basics.len(), 9);
        for basic in basics() {
            assert!(dealt.contains(&basic));
        }
        assert_eq!(
            dealt.iter().filter(|p| p.tier() == Some(Tier::Medium)).count(),
            3
        );
        assert_eq!(
            dealt.iter().filter(|p| p.tier() == Some(Tier::Hard)).count(),
            2
        );
    }
}

#[test]
fn test_lookahead_previews_next_draws() {
    let mut bag = BagRandomizer::new(table(&[(0, 7, 2, 0)]), 0, 8);
    for _ in 0..25 {
        let preview = bag.peek().to_vec();
        assert_eq!(preview.len(), LOOKAHEAD_LEN);
        let drawn: Vec<_> = (0..LOOKAHEAD_LEN).map(|_| bag.next_piece()).collect();
        assert_eq!(preview, drawn);
    }
}

#[test]
fn test_different_seeds_differ() {
    let t = table(&[(0, 7, 0, 0)]);
    let mut a = BagRandomizer::new(t.clone(), 0, 1);
    let mut b = BagRandomizer::new(t, 0, 2);
    let seq_a: Vec<_> = (0..28).map(|_| a.next_piece()).collect();
    let seq_b: Vec<_> = (0..28).map(|_| b.next_piece()).collect();
    assert_ne!(seq_a, seq_b);
}

#[test]
fn test_update_level_lags_one_bag() {
    let mut bag = BagRandomizer::new(table(&[(0, 7, 0, 0), (10, 7, 0, 7)]), 0, 3);
    // Pull the lookahead across the boundary so the next bag exists already.
    for _ in 0..6 {
        bag.next_piece();
    }
    bag.update_level(1);
    // Finish the current bag and the pre-built level 0 bag.
    for _ in 0..8 {
        let piece = bag.next_piece();
        assert_eq!(piece.tier(), Some(Tier::Basic));
    }
    assert_eq!(bag.current_bag().len(), 14);
}
