use crate::evidence::{DealerTellEvidence, TellKind};
use crate::model::card::Card;
use crate::model::suit::Suit;
use crate::scenario::{BurnEstimate, BurnScenario, EstimateMethod};
use std::collections::BTreeSet;

const AGREEMENT_BONUS: f64 = 0.2;
const SCENARIO_WEIGHT_SCALE: f64 = 0.3;

/// How strongly a tell of this kind is trusted. Kinds without a factor carry no
/// rank evidence on their own and only feed the reliability score.
pub const fn tell_factor(kind: TellKind) -> Option<f64> {
    match kind {
        TellKind::Hesitation | TellKind::Timing => Some(0.7),
        TellKind::Positioning => Some(0.8),
        TellKind::HandMovement => Some(0.6),
        TellKind::FacialExpression | TellKind::CardHandling => None,
    }
}

/// Mean reliability-tier score, plus a bonus when events repeat the same
/// (rank, kind) pair. Zero with no events.
pub fn dealer_reliability(tells: &[DealerTellEvidence]) -> f64 {
    if tells.is_empty() {
        return 0.0;
    }
    let mean = tells.iter().map(|t| t.reliability.score()).sum::<f64>() / tells.len() as f64;
    let unique_pairs: BTreeSet<_> = tells.iter().map(|t| (t.estimated_rank, t.kind)).collect();
    let bonus = if unique_pairs.len() < tells.len() {
        AGREEMENT_BONUS
    } else {
        0.0
    };
    (mean + bonus).min(1.0)
}

/// Scenario built from dealer tells, grouped by tell kind. `None` when no tell names a rank.
pub fn tell_scenario(tells: &[DealerTellEvidence]) -> Option<BurnScenario> {
    let mut kinds: Vec<TellKind> = tells.iter().map(|t| t.kind).collect();
    kinds.sort();
    kinds.dedup();

    let mut estimates = Vec::new();
    for kind in kinds {
        let Some(factor) = tell_factor(kind) else {
            continue;
        };
        for tell in tells.iter().filter(|t| t.kind == kind) {
            let Some(rank) = tell.estimated_rank else {
                continue;
            };
            let suit = tell.estimated_suit.unwrap_or(Suit::PLACEHOLDER);
            let confidence = tell.clamped_confidence();
            estimates.push(
                BurnEstimate::new(
                    Card::new(rank, suit),
                    confidence * factor,
                    confidence,
                    EstimateMethod::Observed,
                )
                .tagged(format!("dealer_tell:{}", kind.as_str()))
                .tagged(format!("reliability:{:?}", tell.reliability).to_ascii_lowercase()),
            );
        }
    }

    if estimates.is_empty() {
        return None;
    }

    let weight = dealer_reliability(tells) * SCENARIO_WEIGHT_SCALE;
    Some(BurnScenario::new(
        "fusion-dealer-tells",
        "Dealer tell analysis",
        estimates,
        weight,
    ))
}
