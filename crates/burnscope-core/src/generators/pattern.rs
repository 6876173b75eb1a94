use super::{EXPECTED_BURN_CARDS, RankFrequencies, history_rank_frequencies, normalize_rank_counts};
use crate::model::card::Card;
use crate::model::history::HandRecord;
use crate::model::shoe::{ShoeComposition, ratio};
use crate::scenario::{BurnEstimate, BurnScenario, EstimateMethod};

const RECENT_WINDOW: usize = 5;
const LONG_RUN_BLEND: f64 = 0.7;
const RECENT_BLEND: f64 = 0.3;
const OBSERVED_BONUS_WEIGHT: f64 = 0.1;
const OBSERVED_BONUS_SATURATION: f64 = 5.0;
const HISTORY_CONFIDENCE_SATURATION: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternStyle {
    Conservative,
    Moderate,
    Aggressive,
}

impl PatternStyle {
    pub const ALL: [PatternStyle; 3] = [
        PatternStyle::Conservative,
        PatternStyle::Moderate,
        PatternStyle::Aggressive,
    ];

    pub const fn multiplier(self) -> f64 {
        match self {
            PatternStyle::Conservative => 0.7,
            PatternStyle::Moderate => 1.0,
            PatternStyle::Aggressive => 1.3,
        }
    }

    pub const fn prior(self) -> f64 {
        match self {
            PatternStyle::Conservative => 0.3,
            PatternStyle::Moderate => 0.5,
            PatternStyle::Aggressive => 0.2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PatternStyle::Conservative => "conservative",
            PatternStyle::Moderate => "moderate",
            PatternStyle::Aggressive => "aggressive",
        }
    }
}

/// Adaptive scenarios that follow the ranks the dealer has been producing, with the
/// last few hands weighted more heavily to pick up a hot streak.
pub fn pattern_scenarios(
    shoe: &ShoeComposition,
    history: &[HandRecord],
    observed_burns: &[Card],
) -> Vec<BurnScenario> {
    let frequencies = blended_frequencies(shoe, history);
    let observed_bonus =
        OBSERVED_BONUS_WEIGHT * (observed_burns.len() as f64 / OBSERVED_BONUS_SATURATION).min(1.0);
    let confidence =
        0.5 + 0.2 * (history.len() as f64 / HISTORY_CONFIDENCE_SATURATION).min(1.0);

    PatternStyle::ALL
        .iter()
        .map(|&style| {
            let estimates = Card::all()
                .map(|card| {
                    let within_rank = ratio(u64::from(shoe.count(card)), shoe.rank_count(card.rank));
                    let probability = frequencies[card.rank.index()]
                        * within_rank
                        * EXPECTED_BURN_CARDS
                        * style.multiplier();
                    BurnEstimate::new(card, probability, confidence, EstimateMethod::Pattern)
                        .tagged("pattern")
                        .tagged(format!("style:{}", style.as_str()))
                })
                .collect();
            BurnScenario::new(
                format!("pattern-{}", style.as_str()),
                format!("{} adaptive pattern", style.as_str()),
                estimates,
                style.prior() + observed_bonus,
            )
        })
        .collect()
}

/// Long-run rank frequencies blended 70/30 with a recency-weighted window.
pub(crate) fn blended_frequencies(shoe: &ShoeComposition, history: &[HandRecord]) -> RankFrequencies {
    let long_run = history_rank_frequencies(history, shoe);
    let recent = recent_frequencies(shoe, history);
    let mut blended = [0.0; 13];
    for (index, slot) in blended.iter_mut().enumerate() {
        *slot = LONG_RUN_BLEND * long_run[index] + RECENT_BLEND * recent[index];
    }
    blended
}

/// Frequencies over the last [`RECENT_WINDOW`] hands; the newest hand weighs most.
fn recent_frequencies(shoe: &ShoeComposition, history: &[HandRecord]) -> RankFrequencies {
    let start = history.len().saturating_sub(RECENT_WINDOW);
    let mut counts = [0.0; 13];
    for (offset, hand) in history[start..].iter().enumerate() {
        let weight = (offset + 1) as f64;
        for card in hand.cards() {
            counts[card.rank.index()] += weight;
        }
    }
    normalize_rank_counts(&counts, shoe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::history::Outcome;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn hand_of(rank: Rank) -> HandRecord {
        HandRecord::new(
            vec![Card::new(rank, Suit::Clubs), Card::new(rank, Suit::Hearts)],
            vec![Card::new(rank, Suit::Spades), Card::new(rank, Suit::Diamonds)],
            Outcome::Banker,
        )
    }

    #[test]
    fn styles_scale_probabilities() {
        let shoe = ShoeComposition::full(8);
        let scenarios = pattern_scenarios(&shoe, &[], &[]);
        let card = Card::new(Rank::Four, Suit::Clubs);
        let p: Vec<f64> = scenarios
            .iter()
            .map(|s| s.estimate_for(card).unwrap().probability)
            .collect();
        assert!((p[0] / p[1] - 0.7).abs() < 1e-9);
        assert!((p[2] / p[1] - 1.3).abs() < 1e-9);
    }

    #[test]
    fn recent_hot_rank_outweighs_long_run() {
        let shoe = ShoeComposition::full(8);
        let mut history: Vec<HandRecord> = (0..20).map(|_| hand_of(Rank::Two)).collect();
        history.push(hand_of(Rank::King));
        let freqs = blended_frequencies(&shoe, &history);
        let long_only = history_rank_frequencies(&history, &shoe);
        assert!(freqs[Rank::King.index()] > long_only[Rank::King.index()]);
    }

    #[test]
    fn observed_burns_add_weight_bonus() {
        let shoe = ShoeComposition::full(8);
        let base = pattern_scenarios(&shoe, &[], &[]);
        let card = Card::new(Rank::Ace, Suit::Clubs);
        let boosted = pattern_scenarios(&shoe, &[], &[card; 10]);
        for (b, s) in base.iter().zip(&boosted) {
            assert!((s.weight() - b.weight() - 0.1).abs() < 1e-12);
        }
        assert_eq!(base[1].weight(), 0.5);
    }

    #[test]
    fn confidence_grows_with_history() {
        let shoe = ShoeComposition::full(8);
        let empty = pattern_scenarios(&shoe, &[], &[]);
        let history: Vec<HandRecord> = (0..30).map(|_| hand_of(Rank::Five)).collect();
        let deep = pattern_scenarios(&shoe, &history, &[]);
        assert!((empty[0].estimates()[0].confidence - 0.5).abs() < 1e-12);
        assert!((deep[0].estimates()[0].confidence - 0.7).abs() < 1e-12);
    }
}
