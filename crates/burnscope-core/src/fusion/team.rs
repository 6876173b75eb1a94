use crate::evidence::{ObserverPosition, TeamPlayData};
use crate::model::card::Card;
use crate::model::suit::Suit;
use crate::scenario::{BurnEstimate, BurnScenario, EstimateMethod};
use std::collections::{BTreeMap, BTreeSet};

const CONSENSUS_BONUS: f64 = 0.5;
const TEAM_RELIABILITY: f64 = 0.85;
const COVERAGE_WEIGHT: f64 = 0.6;
const AGREEMENT_WEIGHT: f64 = 0.4;
const SCENARIO_WEIGHT_SCALE: f64 = 0.4;

/// Per-card consensus across observers.
#[derive(Debug, Clone, PartialEq)]
pub struct CardConsensus {
    pub card: Card,
    pub reporters: usize,
    pub mean_confidence: f64,
    pub team_confidence: f64,
}

/// Groups observations by card, counting each observer at most once per card.
/// When one observer id files several reports naming the same card, the first
/// report's confidence is kept.
pub fn card_consensus(reports: &[TeamPlayData]) -> Vec<CardConsensus> {
    let team_size = distinct_observers(reports);
    if team_size == 0 {
        return Vec::new();
    }

    let mut by_card: BTreeMap<Card, BTreeMap<&str, f64>> = BTreeMap::new();
    for report in reports {
        for observation in &report.burn_observations {
            let Some(rank) = observation.estimated_rank else {
                continue;
            };
            let card = Card::new(rank, observation.estimated_suit.unwrap_or(Suit::PLACEHOLDER));
            by_card
                .entry(card)
                .or_default()
                .entry(report.observer_id.as_str())
                .or_insert_with(|| report.clamped_confidence());
        }
    }

    by_card
        .into_iter()
        .map(|(card, observers)| {
            let reporters = observers.len();
            let mean_confidence = observers.values().sum::<f64>() / reporters as f64;
            let agreement = reporters as f64 / team_size as f64;
            let team_confidence = (mean_confidence * (1.0 + CONSENSUS_BONUS * agreement)).min(1.0);
            CardConsensus {
                card,
                reporters,
                mean_confidence,
                team_confidence,
            }
        })
        .collect()
}

/// Position coverage blended with the strongest single-card agreement ratio.
pub fn team_effectiveness(reports: &[TeamPlayData]) -> f64 {
    let team_size = distinct_observers(reports);
    if team_size == 0 {
        return 0.0;
    }
    let positions: BTreeSet<ObserverPosition> = reports.iter().map(|r| r.position).collect();
    let coverage = positions.len() as f64 / ObserverPosition::COUNT as f64;
    let strongest_agreement = card_consensus(reports)
        .iter()
        .map(|c| c.reporters as f64 / team_size as f64)
        .fold(0.0, f64::max);
    (COVERAGE_WEIGHT * coverage + AGREEMENT_WEIGHT * strongest_agreement).min(1.0)
}

/// Scenario from cross-referenced team observations. `None` when no observer named a card.
pub fn team_scenario(reports: &[TeamPlayData]) -> Option<BurnScenario> {
    let consensus = card_consensus(reports);
    if consensus.is_empty() {
        return None;
    }
    let estimates = consensus
        .iter()
        .map(|c| {
            BurnEstimate::new(
                c.card,
                c.team_confidence * TEAM_RELIABILITY,
                c.team_confidence,
                EstimateMethod::Observed,
            )
            .tagged("team_play")
            .tagged(format!("reporters:{}", c.reporters))
        })
        .collect();
    Some(BurnScenario::new(
        "fusion-team-play",
        "Team observer consensus",
        estimates,
        team_effectiveness(reports) * SCENARIO_WEIGHT_SCALE,
    ))
}

fn distinct_observers(reports: &[TeamPlayData]) -> usize {
    reports
        .iter()
        .map(|r| r.observer_id.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}
