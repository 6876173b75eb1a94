//! Independent statistical methods that each produce a fixed set of burn scenarios.
//!
//! Every generator emits one estimate per card key for all 52 keys; keys absent
//! from the shoe simply evaluate to probability zero.

mod bias;
mod composition;
mod pattern;

pub use bias::{BIAS_LEVELS, bias_scenarios};
pub use composition::{BURN_COUNT_PRIORS, composition_scenarios};
pub use pattern::{PatternStyle, pattern_scenarios};

use crate::model::history::HandRecord;
use crate::model::rank::Rank;
use crate::model::shoe::ShoeComposition;

/// Burn count assumed when a method needs a single typical value.
pub const EXPECTED_BURN_CARDS: f64 = 5.0;

/// Per-rank relative frequency, indexed by [`Rank::index`], summing to one.
pub type RankFrequencies = [f64; 13];

/// Normalises raw per-rank tallies. An all-zero tally falls back to the shoe's rank shares.
pub fn normalize_rank_counts(counts: &[f64; 13], shoe: &ShoeComposition) -> RankFrequencies {
    let total: f64 = counts.iter().sum();
    if total > 0.0 {
        return counts.map(|count| count / total);
    }
    let mut shares = [0.0; 13];
    for rank in Rank::ORDERED {
        shares[rank.index()] = shoe.rank_share(rank);
    }
    shares
}

/// Rank frequencies across every card of every recorded hand.
pub fn history_rank_frequencies(history: &[HandRecord], shoe: &ShoeComposition) -> RankFrequencies {
    let mut counts = [0.0; 13];
    for hand in history {
        for card in hand.cards() {
            counts[card.rank.index()] += 1.0;
        }
    }
    normalize_rank_counts(&counts, shoe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::card::Card;
    use crate::model::history::Outcome;
    use crate::model::suit::Suit;

    #[test]
    fn empty_history_uses_shoe_shares() {
        let shoe = ShoeComposition::full(8);
        let freqs = history_rank_frequencies(&[], &shoe);
        for value in freqs {
            assert!((value - 1.0 / 13.0).abs() < 1e-12);
        }
    }

    #[test]
    fn history_frequencies_sum_to_one() {
        let shoe = ShoeComposition::full(1);
        let hand = HandRecord::new(
            vec![Card::new(Rank::Two, Suit::Clubs), Card::new(Rank::Two, Suit::Hearts)],
            vec![Card::new(Rank::King, Suit::Clubs)],
            Outcome::Player,
        );
        let freqs = history_rank_frequencies(&[hand], &shoe);
        assert!((freqs.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((freqs[Rank::Two.index()] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(freqs[Rank::Ace.index()], 0.0);
    }
}
