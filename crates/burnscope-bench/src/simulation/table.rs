//! Deals one simulated shoe with a known burn so engine output can be scored
//! against ground truth.
//!
//! Hands use two cards per side and the plain modulo-10 comparison; third-card
//! drawing is not modelled. That is enough to produce realistic card flow and an
//! outcome history for the engine, which never resolves hands itself.

use burnscope_core::engine::AnalysisInput;
use burnscope_core::evidence::{DealerTellEvidence, ObserverPosition, Reliability, TeamPlayData, TellKind};
use burnscope_core::model::card::Card;
use burnscope_core::model::history::{HandRecord, Outcome};
use burnscope_core::model::rank::Rank;
use burnscope_core::model::shoe::{Shoe, ShoeComposition};
use rand::Rng;
use rand::rngs::StdRng;

use crate::config::SimulationConfig;

/// A dealt session: what the table could see, and what was actually burned.
#[derive(Debug, Clone)]
pub struct SimulatedSession {
    pub input: AnalysisInput,
    pub true_burns: Vec<Card>,
}

pub fn deal_session(config: &SimulationConfig, shoe_seed: u64, rng: &mut StdRng) -> SimulatedSession {
    let mut shoe = Shoe::shuffled_with_seed(config.decks, shoe_seed);
    let shoe_size = shoe.len();

    let burn_count = rng.gen_range(config.burn_min..=config.burn_max);
    let true_burns: Vec<Card> = (0..burn_count).filter_map(|_| shoe.draw()).collect();

    let mut visible = ShoeComposition::full(config.decks);
    let mut history = Vec::with_capacity(config.hands);
    for _ in 0..config.hands {
        let Some(hand) = deal_hand(&mut shoe) else {
            break;
        };
        for card in hand.cards() {
            visible.remove(*card);
        }
        history.push(hand);
    }

    // House procedure exposes the first burn card.
    let observed_burns: Vec<Card> = true_burns.first().copied().into_iter().collect();
    let tells = simulated_tells(&true_burns, config.tell_noise, rng);
    let team = simulated_team(&true_burns, config.tell_noise, rng);
    let dealt = shoe_size - shoe.len();

    SimulatedSession {
        input: AnalysisInput {
            shoe: visible,
            penetration: dealt as f64 / shoe_size as f64,
            history,
            observed_burns,
            tells,
            team,
            hour_of_day: rng.gen_range(0..24),
            hands_since_last_burn: config.hands as u32,
        },
        true_burns,
    }
}

fn deal_hand(shoe: &mut Shoe) -> Option<HandRecord> {
    let player = [shoe.draw()?, shoe.draw()?];
    let banker = [shoe.draw()?, shoe.draw()?];
    let total = |cards: &[Card; 2]| cards.iter().map(|c| u32::from(c.points())).sum::<u32>() % 10;
    let outcome = match total(&player).cmp(&total(&banker)) {
        std::cmp::Ordering::Greater => Outcome::Player,
        std::cmp::Ordering::Less => Outcome::Banker,
        std::cmp::Ordering::Equal => Outcome::Tie,
    };
    Some(HandRecord::new(player.to_vec(), banker.to_vec(), outcome))
}

fn noisy_rank(truth: Rank, noise: f64, rng: &mut StdRng) -> Rank {
    if rng.gen_bool(noise) {
        Rank::ORDERED[rng.gen_range(0..Rank::ORDERED.len())]
    } else {
        truth
    }
}

fn simulated_tells(burns: &[Card], noise: f64, rng: &mut StdRng) -> Vec<DealerTellEvidence> {
    let Some(target) = burns.get(1).or_else(|| burns.first()) else {
        return Vec::new();
    };
    let kinds = [TellKind::Hesitation, TellKind::Timing, TellKind::Positioning];
    let kind = kinds[rng.gen_range(0..kinds.len())];
    let reliability = if noise < 0.2 {
        Reliability::High
    } else if noise < 0.5 {
        Reliability::Medium
    } else {
        Reliability::Low
    };
    vec![
        DealerTellEvidence::new(kind, rng.gen_range(0.4..0.9), reliability)
            .with_rank(noisy_rank(target.rank, noise, rng)),
    ]
}

fn simulated_team(burns: &[Card], noise: f64, rng: &mut StdRng) -> Vec<TeamPlayData> {
    let Some(target) = burns.last() else {
        return Vec::new();
    };
    let positions = [ObserverPosition::FirstBase, ObserverPosition::ThirdBase];
    positions
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            let sighting = DealerTellEvidence::new(TellKind::HandMovement, 0.7, Reliability::Medium)
                .with_rank(noisy_rank(target.rank, noise, rng))
                .with_suit(target.suit);
            TeamPlayData::new(format!("observer-{i}"), position, rng.gen_range(0.5..0.9))
                .observe(sighting)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn config() -> SimulationConfig {
        SimulationConfig {
            seed: Some(1),
            sessions: 1,
            decks: 8,
            burn_min: 3,
            burn_max: 7,
            hands: 25,
            tell_noise: 0.0,
            monte_carlo_trials: 0,
        }
    }

    #[test]
    fn session_hides_burns_from_visible_shoe() {
        let mut rng = StdRng::seed_from_u64(5);
        let session = deal_session(&config(), 77, &mut rng);
        assert!((3..=7).contains(&session.true_burns.len()));
        assert_eq!(session.input.history.len(), 25);
        assert_eq!(session.input.shoe.total(), 416 - 100);
        assert_eq!(session.input.observed_burns, vec![session.true_burns[0]]);
        let expected = (session.true_burns.len() + 100) as f64 / 416.0;
        assert!((session.input.penetration - expected).abs() < 1e-12);
    }

    #[test]
    fn noiseless_tells_name_a_true_burn() {
        let mut rng = StdRng::seed_from_u64(8);
        let session = deal_session(&config(), 3, &mut rng);
        let ranks: Vec<Rank> = session.true_burns.iter().map(|c| c.rank).collect();
        for tell in &session.input.tells {
            assert!(ranks.contains(&tell.estimated_rank.expect("tell names a rank")));
        }
        assert_eq!(session.input.team.len(), 2);
    }

    #[test]
    fn same_seeds_deal_the_same_session() {
        let a = deal_session(&config(), 11, &mut StdRng::seed_from_u64(2));
        let b = deal_session(&config(), 11, &mut StdRng::seed_from_u64(2));
        assert_eq!(a.true_burns, b.true_burns);
        assert_eq!(a.input, b.input);
    }
}
