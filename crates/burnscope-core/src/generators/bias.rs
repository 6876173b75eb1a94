use super::EXPECTED_BURN_CARDS;
use crate::model::card::Card;
use crate::model::shoe::{ShoeComposition, ratio};
use crate::scenario::{BurnEstimate, BurnScenario, EstimateMethod};

/// Fraction of burn probability mass placed on high cards, per hypothesis.
pub const BIAS_LEVELS: [f64; 5] = [0.3, 0.4, 0.5, 0.6, 0.7];

const BIAS_PRIOR_CENTER: f64 = 0.5;
const BIAS_PRIOR_SPREAD: f64 = 0.1;
const MAX_CARD_PROBABILITY: f64 = 0.8;
const BIAS_CONFIDENCE: f64 = 0.5;

/// One scenario per high-card burn bias hypothesis. `penetration` is clamped to [0, 1].
pub fn bias_scenarios(shoe: &ShoeComposition, penetration: f64) -> Vec<BurnScenario> {
    let penetration = clamp_unit(penetration);
    let penetration_factor = 1.0 + penetration;
    let high_total = shoe.high_total();
    let low_total = shoe.low_total();
    let priors = bias_priors();

    BIAS_LEVELS
        .iter()
        .zip(priors)
        .map(|(&bias, prior)| {
            let estimates = Card::all()
                .map(|card| {
                    let count = shoe.count(card);
                    let class_share = if card.rank.is_high() {
                        bias * ratio(u64::from(count), high_total)
                    } else {
                        (1.0 - bias) * ratio(u64::from(count), low_total)
                    };
                    let probability = (class_share * EXPECTED_BURN_CARDS * penetration_factor)
                        .min(MAX_CARD_PROBABILITY);
                    BurnEstimate::new(card, probability, BIAS_CONFIDENCE, EstimateMethod::Statistical)
                        .tagged("bias")
                        .tagged(format!("high_bias:{bias:.1}"))
                })
                .collect();
            let percent = (bias * 100.0).round() as u32;
            BurnScenario::new(
                format!("bias-{percent}"),
                format!("{percent}% high-card burn bias"),
                estimates,
                prior,
            )
        })
        .collect()
}

/// Bell-shaped prior over the bias levels, normalised to sum to one.
fn bias_priors() -> [f64; 5] {
    let raw = BIAS_LEVELS.map(|bias| {
        let z = (bias - BIAS_PRIOR_CENTER) / BIAS_PRIOR_SPREAD;
        (-0.5 * z * z).exp()
    });
    let total: f64 = raw.iter().sum();
    raw.map(|value| value / total)
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
