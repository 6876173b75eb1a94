//! Edge-impact and stake-sizing arithmetic for single scenarios and scenario sets.
//!
//! The cross-scenario combination is a normalised convex combination weighted by
//! scenario weight. It is a simplified model average, not a joint posterior; the
//! recommendation thresholds are calibrated against this form.

use crate::model::card::Card;
use crate::scenario::{BurnEstimate, BurnScenario};

/// Per-card edge contribution when a zero-value card is burned (favours banker).
pub const ZERO_VALUE_WEIGHT: f64 = 0.001;
/// Per-card edge contribution when a card worth 1-3 points is burned (favours player).
pub const LOW_VALUE_WEIGHT: f64 = -0.001;

pub const KELLY_ADJUSTMENT_MIN: f64 = 0.1;
pub const KELLY_ADJUSTMENT_MAX: f64 = 2.0;
pub const KELLY_MULTIPLIER_MIN: f64 = 0.1;
pub const KELLY_MULTIPLIER_MAX: f64 = 3.0;
pub const MONTE_CARLO_MIN: f64 = 0.1;
pub const MONTE_CARLO_MAX: f64 = 2.0;

const UNCERTAINTY_KELLY_PENALTY: f64 = 0.5;
const UNCERTAINTY_MONTE_CARLO_PENALTY: f64 = 0.3;
const LOWER_PERCENTILE: f64 = 0.1;
const UPPER_PERCENTILE: f64 = 0.9;

pub fn signed_card_weight(card: Card) -> f64 {
    if card.rank.is_zero_value() {
        ZERO_VALUE_WEIGHT
    } else if card.rank.is_low_value() {
        LOW_VALUE_WEIGHT
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioImpact {
    pub edge_impact: f64,
    pub uncertainty: f64,
    pub kelly_adjustment: f64,
}

pub fn scenario_impact(estimates: &[BurnEstimate]) -> ScenarioImpact {
    let edge_impact: f64 = estimates
        .iter()
        .map(|e| e.probability * e.confidence * signed_card_weight(e.card))
        .sum();

    let uncertainty = if estimates.is_empty() {
        1.0
    } else {
        let mean_confidence =
            estimates.iter().map(|e| e.confidence).sum::<f64>() / estimates.len() as f64;
        (1.0 - mean_confidence).clamp(0.0, 1.0)
    };

    let kelly_adjustment = (1.0 + edge_impact - uncertainty * UNCERTAINTY_KELLY_PENALTY)
        .clamp(KELLY_ADJUSTMENT_MIN, KELLY_ADJUSTMENT_MAX);

    ScenarioImpact {
        edge_impact,
        uncertainty,
        kelly_adjustment,
    }
}

/// Scenario-weighted summary across every scenario of an analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateImpact {
    pub weighted_edge_impact: f64,
    pub kelly_multiplier: f64,
    pub monte_carlo_adjustment: f64,
    pub weighted_uncertainty: f64,
    pub confidence_interval: (f64, f64),
}

/// Combines scenarios into one estimate. Returns `None` for an empty set.
///
/// When every weight is zero the scenarios are averaged uniformly.
pub fn aggregate(scenarios: &[BurnScenario]) -> Option<AggregateImpact> {
    if scenarios.is_empty() {
        return None;
    }

    let total_weight: f64 = scenarios.iter().map(BurnScenario::weight).sum();
    let weight_of = |scenario: &BurnScenario| {
        if total_weight > 0.0 {
            scenario.weight() / total_weight
        } else {
            1.0 / scenarios.len() as f64
        }
    };

    let mut weighted_edge_impact = 0.0;
    let mut weighted_kelly = 0.0;
    let mut weighted_uncertainty = 0.0;
    for scenario in scenarios {
        let w = weight_of(scenario);
        weighted_edge_impact += scenario.edge_impact() * w;
        weighted_kelly += scenario.kelly_adjustment() * w;
        weighted_uncertainty += scenario.uncertainty() * w;
    }

    let kelly_multiplier =
        (1.0 + weighted_kelly).clamp(KELLY_MULTIPLIER_MIN, KELLY_MULTIPLIER_MAX);
    let monte_carlo_adjustment = (1.0 - weighted_uncertainty * UNCERTAINTY_MONTE_CARLO_PENALTY)
        .clamp(MONTE_CARLO_MIN, MONTE_CARLO_MAX);

    let mut edges: Vec<f64> = scenarios.iter().map(BurnScenario::edge_impact).collect();
    edges.sort_by(f64::total_cmp);
    let confidence_interval = (
        percentile(&edges, LOWER_PERCENTILE),
        percentile(&edges, UPPER_PERCENTILE),
    );

    Some(AggregateImpact {
        weighted_edge_impact,
        kelly_multiplier,
        monte_carlo_adjustment,
        weighted_uncertainty: weighted_uncertainty.clamp(0.0, 1.0),
        confidence_interval,
    })
}

/// Nearest-rank percentile over an ascending slice: `sorted[floor(q * n)]`.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = ((q * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
    sorted[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;
    use crate::scenario::EstimateMethod;

    fn estimate(rank: Rank, probability: f64, confidence: f64) -> BurnEstimate {
        BurnEstimate::new(
            Card::new(rank, Suit::Clubs),
            probability,
            confidence,
            EstimateMethod::Statistical,
        )
    }

    #[test]
    fn signed_weights_follow_point_classes() {
        assert_eq!(signed_card_weight(Card::new(Rank::Queen, Suit::Hearts)), 0.001);
        assert_eq!(signed_card_weight(Card::new(Rank::Three, Suit::Hearts)), -0.001);
        assert_eq!(signed_card_weight(Card::new(Rank::Seven, Suit::Hearts)), 0.0);
    }

    #[test]
    fn scenario_impact_matches_hand_computation() {
        let estimates = vec![
            estimate(Rank::King, 0.5, 0.8),
            estimate(Rank::Ace, 0.25, 0.4),
            estimate(Rank::Eight, 1.0, 0.6),
        ];
        let impact = scenario_impact(&estimates);
        let expected_edge = 0.5 * 0.8 * 0.001 - 0.25 * 0.4 * 0.001;
        assert!((impact.edge_impact - expected_edge).abs() < 1e-12);
        assert!((impact.uncertainty - 0.4).abs() < 1e-12);
        assert!((impact.kelly_adjustment - (1.0 + expected_edge - 0.2)).abs() < 1e-12);
    }

    #[test]
    fn empty_scenario_is_fully_uncertain() {
        let impact = scenario_impact(&[]);
        assert_eq!(impact.edge_impact, 0.0);
        assert_eq!(impact.uncertainty, 1.0);
        assert_eq!(impact.kelly_adjustment, 0.5);
    }

    #[test]
    fn aggregate_normalises_weights() {
        let a = BurnScenario::new("a", "a", vec![estimate(Rank::King, 1.0, 1.0)], 0.75);
        let b = BurnScenario::new("b", "b", vec![estimate(Rank::Ace, 1.0, 1.0)], 0.25);
        let agg = aggregate(&[a, b]).unwrap();
        assert!((agg.weighted_edge_impact - 0.0005).abs() < 1e-12);
        assert_eq!(agg.weighted_uncertainty, 0.0);
        assert_eq!(agg.monte_carlo_adjustment, 1.0);
        assert!((agg.kelly_multiplier - 2.0005).abs() < 1e-9);
        assert!(agg.confidence_interval.0 <= agg.confidence_interval.1);
        assert_eq!(agg.confidence_interval, (-0.001, 0.001));
    }

    #[test]
    fn zero_weights_fall_back_to_uniform() {
        let a = BurnScenario::new("a", "a", vec![estimate(Rank::King, 1.0, 1.0)], 0.0);
        let b = BurnScenario::new("b", "b", vec![estimate(Rank::Ace, 1.0, 1.0)], 0.0);
        let agg = aggregate(&[a, b]).unwrap();
        assert!(agg.weighted_edge_impact.abs() < 1e-12);
        assert!(agg.kelly_multiplier.is_finite());
    }

    #[test]
    fn aggregate_of_nothing_is_none() {
        assert!(aggregate(&[]).is_none());
    }

    #[test]
    fn percentile_uses_nearest_rank() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert_eq!(percentile(&sorted, 0.1), 2.0);
        assert_eq!(percentile(&sorted, 0.9), 10.0);
        assert_eq!(percentile(&[4.0], 0.9), 4.0);
    }
}
