//! Bayesian refinement of burn estimates given new qualitative evidence.
//!
//! Refinement is one-way: applying the same evidence twice moves the posterior
//! twice. Callers that need reproducibility track the number of passes (see
//! [`crate::analysis::ProfessionalBurnAnalysis::bayesian_passes`]).

use crate::evidence::{EvidenceKind, QualitativeEvidence};
use crate::scenario::{BurnEstimate, BurnScenario, EstimateMethod};

const BASE_LIKELIHOOD: f64 = 0.5;
const DEALER_TELL_BOOST: f64 = 0.3;
const PARTIAL_GLIMPSE_BOOST: f64 = 0.4;
const TIMING_PATTERN_BOOST: f64 = 0.1;
const MAX_LIKELIHOOD: f64 = 0.95;
const CONFIDENCE_STEP: f64 = 0.1;

pub const BAYESIAN_TAG: &str = "bayesian_update";

/// Likelihood that `estimate`'s card was burned given the evidence set.
pub fn likelihood(estimate: &BurnEstimate, evidence: &[QualitativeEvidence]) -> f64 {
    let mut likelihood = BASE_LIKELIHOOD;
    for item in evidence {
        let matches = item.rank == Some(estimate.card.rank);
        match item.kind {
            EvidenceKind::DealerTell if matches => likelihood += DEALER_TELL_BOOST,
            EvidenceKind::PartialGlimpse if matches => likelihood += PARTIAL_GLIMPSE_BOOST,
            EvidenceKind::TimingPattern => likelihood += TIMING_PATTERN_BOOST,
            _ => {}
        }
    }
    likelihood.min(MAX_LIKELIHOOD)
}

/// Bayes' rule with a symmetric alternative hypothesis. A zero denominator keeps the prior.
pub fn posterior(prior: f64, likelihood: f64) -> f64 {
    let numerator = likelihood * prior;
    let denominator = numerator + (1.0 - likelihood) * (1.0 - prior);
    if denominator > 0.0 {
        numerator / denominator
    } else {
        prior
    }
}

/// Returns refined copies of `estimates`; the inputs are untouched.
pub fn bayesian_update(
    estimates: &[BurnEstimate],
    evidence: &[QualitativeEvidence],
) -> Vec<BurnEstimate> {
    estimates
        .iter()
        .map(|estimate| {
            let updated = posterior(estimate.probability, likelihood(estimate, evidence));
            let mut refined = BurnEstimate::new(
                estimate.card,
                updated,
                estimate.confidence + CONFIDENCE_STEP,
                EstimateMethod::Bayesian,
            );
            refined.evidence = estimate.evidence.clone();
            refined.evidence.push(BAYESIAN_TAG.to_string());
            refined
        })
        .collect()
}

/// A new scenario holding the refined estimates, with impact recomputed.
pub fn refine_scenario(scenario: &BurnScenario, evidence: &[QualitativeEvidence]) -> BurnScenario {
    scenario.with_estimates(bayesian_update(scenario.estimates(), evidence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn estimate(rank: Rank, probability: f64) -> BurnEstimate {
        BurnEstimate::new(
            Card::new(rank, Suit::Hearts),
            probability,
            0.6,
            EstimateMethod::Statistical,
        )
        .tagged("composition")
    }

    #[test]
    fn neutral_evidence_leaves_probability() {
        let refined = bayesian_update(&[estimate(Rank::Four, 0.3)], &[]);
        assert!((refined[0].probability - 0.3).abs() < 1e-12);
        assert!((refined[0].confidence - 0.7).abs() < 1e-12);
        assert_eq!(refined[0].method, EstimateMethod::Bayesian);
        assert_eq!(refined[0].evidence, vec!["composition", BAYESIAN_TAG]);
    }

    #[test]
    fn matching_tell_raises_posterior() {
        let prior = estimate(Rank::King, 0.2);
        let refined = bayesian_update(&[prior.clone()], &[QualitativeEvidence::dealer_tell(Rank::King)]);
        let expected = 0.8 * 0.2 / (0.8 * 0.2 + 0.2 * 0.8);
        assert!((refined[0].probability - expected).abs() < 1e-12);
        let unrelated = bayesian_update(&[prior], &[QualitativeEvidence::dealer_tell(Rank::Two)]);
        assert!((unrelated[0].probability - 0.2).abs() < 1e-12);
    }

    #[test]
    fn likelihood_is_capped() {
        let e = estimate(Rank::Nine, 0.5);
        let evidence = [
            QualitativeEvidence::partial_glimpse(Rank::Nine),
            QualitativeEvidence::dealer_tell(Rank::Nine),
            QualitativeEvidence::timing_pattern(),
        ];
        assert_eq!(likelihood(&e, &evidence), 0.95);
    }

    #[test]
    fn timing_applies_to_every_card() {
        let e = estimate(Rank::Three, 0.5);
        assert!((likelihood(&e, &[QualitativeEvidence::timing_pattern()]) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn reapplying_evidence_moves_further() {
        let evidence = [QualitativeEvidence::partial_glimpse(Rank::Ace)];
        let once = bayesian_update(&[estimate(Rank::Ace, 0.1)], &evidence);
        let twice = bayesian_update(&once, &evidence);
        assert!(twice[0].probability > once[0].probability);
        assert_eq!(twice[0].evidence.len(), 3);
        assert!(twice[0].confidence <= 1.0);
    }

    #[test]
    fn certain_prior_is_stable() {
        assert_eq!(posterior(1.0, 0.5), 1.0);
        assert_eq!(posterior(0.0, 0.9), 0.0);
    }

    #[test]
    fn refine_scenario_returns_new_value() {
        let scenario = BurnScenario::new("s", "s", vec![estimate(Rank::Queen, 0.3)], 0.5);
        let refined = refine_scenario(&scenario, &[QualitativeEvidence::dealer_tell(Rank::Queen)]);
        assert!(refined.edge_impact() > scenario.edge_impact());
        assert_eq!(scenario.estimates()[0].method, EstimateMethod::Statistical);
    }
}
