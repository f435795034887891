//! Scoring module - line clear points and the combo counter
//!
//! A placement that clears `n` lines is worth `n × (1000 + (n − 1) × 250)`, so bigger
//! clears pay more per line. This formula is fixed: saved best scores are compared
//! against it.
//!
//! The combo counter counts consecutive clearing placements. It does not feed the
//! base formula; modes that want a combo reward configure a `ComboBonus` add-on.

use crate::types::{LINE_BASE_SCORE, LINE_STEP_SCORE};

/// Base points for a placement that cleared `lines` lines.
pub fn calculate_score(lines: u32) -> u32 {
    if lines == 0 {
        return 0;
    }
    let step = (lines - 1).saturating_mul(LINE_STEP_SCORE);
    lines.saturating_mul(LINE_BASE_SCORE.saturating_add(step))
}

/// Optional per-mode reward for chaining clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboBonus {
    /// Points per combo step beyond the first clear in a chain.
    pub per_step: u32,
}

impl ComboBonus {
    /// Bonus for a placement that brought the combo to `combo`.
    pub fn bonus(&self, combo: u32) -> u32 {
        self.per_step.saturating_mul(combo.saturating_sub(1))
    }
}

/// Rolling count of consecutive placements that cleared at least one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComboCounter {
    value: u32,
}

impl ComboCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Record one placement. Returns the new value.
    pub fn record(&mut self, lines: u32) -> u32 {
        if lines > 0 {
            self.value += 1;
        } else {
            self.value = 0;
        }
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }
}

/// Score breakdown for one placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    pub line_clear_score: u32,
    pub combo_bonus: u32,
    pub total: u32,
}

/// Score a placement given the combo value after recording it.
pub fn score_placement(lines: u32, combo: u32, bonus: Option<ComboBonus>) -> ScoreResult {
    let line_clear_score = calculate_score(lines);
    let combo_bonus = match bonus {
        Some(b) if lines > 0 => b.bonus(combo),
        _ => 0,
    };
    ScoreResult {
        line_clear_score,
        combo_bonus,
        total: line_clear_score.saturating_add(combo_bonus),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_scores() {
        assert_eq!(calculate_score(0), 0);
        assert_eq!(calculate_score(1), 1000);
        assert_eq!(calculate_score(2), 2500);
        assert_eq!(calculate_score(3), 4500);
        assert_eq!(calculate_score(4), 7000);
    }

    #[test]
    fn test_huge_line_counts_saturate() {
        assert_eq!(calculate_score(u32::MAX), u32::MAX);
        assert_eq!(calculate_score(5_000_000), u32::MAX);
    }

    #[test]
    fn test_scores_grow_faster_than_lines() {
        for n in 1..5 {
            let per_line_now = calculate_score(n) / n;
            let per_line_next = calculate_score(n + 1) / (n + 1);
            assert!(per_line_next > per_line_now);
        }
    }

    #[test]
    fn test_combo_counter() {
        let mut combo = ComboCounter::new();
        assert_eq!(combo.record(1), 1);
        assert_eq!(combo.record(2), 2);
        assert_eq!(combo.record(4), 3);
        assert_eq!(combo.record(0), 0);
        assert_eq!(combo.record(0), 0);
        assert_eq!(combo.record(1), 1);
    }

    #[test]
    fn test_combo_bonus_add_on() {
        let bonus = ComboBonus { per_step: 100 };
        assert_eq!(score_placement(1, 1, Some(bonus)).total, 1000);
        let r = score_placement(2, 3, Some(bonus));
        assert_eq!(r.line_clear_score, 2500);
        assert_eq!(r.combo_bonus, 200);
        assert_eq!(r.total, 2700);
        // No clear, no bonus regardless of the counter.
        assert_eq!(score_placement(0, 5, Some(bonus)).total, 0);
        assert_eq!(score_placement(2, 3, None).combo_bonus, 0);
    }
}
