use crate::model::card::Card;
use crate::model::shoe::ShoeComposition;
use crate::scenario::{BurnEstimate, BurnScenario, EstimateMethod};
use std::collections::BTreeMap;

/// Plausible burn counts and how often house procedure produces each.
pub const BURN_COUNT_PRIORS: [(u32, f64); 5] =
    [(3, 0.15), (4, 0.25), (5, 0.35), (6, 0.20), (7, 0.05)];

const OBSERVED_CONFIDENCE: f64 = 0.9;
const INFERRED_CONFIDENCE: f64 = 0.6;

/// One scenario per plausible burn count; per-card probability follows the card's
/// share of the shoe after discounting copies already seen burned.
pub fn composition_scenarios(shoe: &ShoeComposition, observed_burns: &[Card]) -> Vec<BurnScenario> {
    let total = shoe.total();
    let mut observed: BTreeMap<Card, u32> = BTreeMap::new();
    for card in observed_burns {
        *observed.entry(*card).or_insert(0) += 1;
    }

    BURN_COUNT_PRIORS
        .iter()
        .map(|&(burn_count, prior)| {
            let estimates = Card::all()
                .map(|card| {
                    let seen = observed.get(&card).copied().unwrap_or(0);
                    let available = shoe.count(card).saturating_sub(seen);
                    let probability = if total == 0 {
                        0.0
                    } else {
                        available as f64 / total as f64 * burn_count as f64
                    };
                    let (confidence, method) = if seen > 0 {
                        (OBSERVED_CONFIDENCE, EstimateMethod::Observed)
                    } else {
                        (INFERRED_CONFIDENCE, EstimateMethod::Statistical)
                    };
                    let estimate = BurnEstimate::new(card, probability, confidence, method)
                        .tagged("composition")
                        .tagged(format!("burn_count:{burn_count}"));
                    if seen > 0 {
                        estimate.tagged(format!("observed_burns:{seen}"))
                    } else {
                        estimate
                    }
                })
                .collect();
            BurnScenario::new(
                format!("composition-{burn_count}"),
                format!("{burn_count} cards burned"),
                estimates,
                prior,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn weights_follow_burn_count_priors() {
        let scenarios = composition_scenarios(&ShoeComposition::full(8), &[]);
        let weights: Vec<f64> = scenarios.iter().map(BurnScenario::weight).collect();
        assert_eq!(weights, vec![0.15, 0.25, 0.35, 0.2, 0.05]);
        assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn balanced_shoe_gives_share_times_burn_count() {
        let scenarios = composition_scenarios(&ShoeComposition::full(8), &[]);
        let card = Card::new(Rank::Five, Suit::Diamonds);
        let estimate = scenarios[2].estimate_for(card).unwrap();
        assert!((estimate.probability - 5.0 / 52.0).abs() < 1e-12);
        assert_eq!(estimate.method, EstimateMethod::Statistical);
        assert_eq!(scenarios[2].estimates().len(), 52);
    }

    #[test]
    fn observed_burns_raise_confidence_and_lower_probability() {
        let shoe = ShoeComposition::full(8);
        let card = Card::new(Rank::Queen, Suit::Spades);
        let before = composition_scenarios(&shoe, &[]);
        let after = composition_scenarios(&shoe, &[card, card]);
        let b = before[0].estimate_for(card).unwrap();
        let a = after[0].estimate_for(card).unwrap();
        assert!(a.probability < b.probability);
        assert_eq!(a.confidence, 0.9);
        assert_eq!(a.method, EstimateMethod::Observed);
        assert!(a.evidence.iter().any(|tag| tag == "observed_burns:2"));
    }

    #[test]
    fn absent_cards_evaluate_to_zero() {
        let present = Card::new(Rank::Two, Suit::Clubs);
        let shoe = ShoeComposition::from_counts([(present, 4)]);
        let scenarios = composition_scenarios(&shoe, &[]);
        let absent = scenarios[0]
            .estimate_for(Card::new(Rank::Ace, Suit::Hearts))
            .unwrap();
        assert_eq!(absent.probability, 0.0);
        assert_eq!(scenarios[0].estimate_for(present).unwrap().probability, 1.0);
    }
}
