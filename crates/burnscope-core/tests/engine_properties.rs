use burnscope_core::analysis::ProfessionalBurnAnalysis;
use burnscope_core::engine::{AnalysisInput, BurnEngine};
use burnscope_core::evidence::{
    DealerTellEvidence, ObserverPosition, QualitativeEvidence, Reliability, TeamPlayData, TellKind,
};
use burnscope_core::fusion::team_effectiveness;
use burnscope_core::generators::composition_scenarios;
use burnscope_core::impact::aggregate;
use burnscope_core::metadata::{BurnMetadata, validate_metadata};
use burnscope_core::model::card::Card;
use burnscope_core::model::history::{HandRecord, Outcome};
use burnscope_core::model::rank::Rank;
use burnscope_core::model::shoe::{Shoe, ShoeComposition};
use burnscope_core::model::suit::Suit;
use burnscope_core::recommend::{EDGE_THRESHOLD, HIGH_UNCERTAINTY, RecommendedAction};

fn assert_bounds(analysis: &ProfessionalBurnAnalysis) {
    assert!((0.1..=3.0).contains(&analysis.kelly_multiplier));
    assert!((0.1..=2.0).contains(&analysis.monte_carlo_adjustment));
    assert!((0.0..=1.0).contains(&analysis.weighted_uncertainty));
    assert!(analysis.weighted_edge_impact.is_finite());
    assert!(analysis.confidence_interval.0 <= analysis.confidence_interval.1);
    for scenario in &analysis.scenarios {
        assert!((0.0..=1.0).contains(&scenario.weight()), "{}", scenario.id());
        assert!((0.1..=2.0).contains(&scenario.kelly_adjustment()));
        assert!((0.0..=1.0).contains(&scenario.uncertainty()));
        for estimate in scenario.estimates() {
            assert!((0.0..=1.0).contains(&estimate.probability));
            assert!((0.0..=1.0).contains(&estimate.confidence));
        }
    }
}

fn played_history(hands: usize, seed: u64) -> Vec<HandRecord> {
    let mut shoe = Shoe::shuffled_with_seed(8, seed);
    (0..hands)
        .filter_map(|i| {
            let player = vec![shoe.draw()?, shoe.draw()?];
            let banker = vec![shoe.draw()?, shoe.draw()?];
            let outcome = match i % 5 {
                0 | 3 => Outcome::Banker,
                4 => Outcome::Tie,
                _ => Outcome::Player,
            };
            Some(HandRecord::new(player, banker, outcome))
        })
        .collect()
}

fn rich_input() -> AnalysisInput {
    let tells = vec![
        DealerTellEvidence::new(TellKind::Hesitation, 0.8, Reliability::High).with_rank(Rank::King),
        DealerTellEvidence::new(TellKind::Timing, 1.7, Reliability::Low).with_rank(Rank::Two),
        DealerTellEvidence::new(TellKind::FacialExpression, 0.9, Reliability::Medium),
    ];
    let sighting = DealerTellEvidence::new(TellKind::Positioning, 0.9, Reliability::High)
        .with_rank(Rank::Nine)
        .with_suit(Suit::Diamonds);
    let team = vec![
        TeamPlayData::new("a", ObserverPosition::FirstBase, 0.9).observe(sighting.clone()),
        TeamPlayData::new("b", ObserverPosition::ThirdBase, 1.4).observe(sighting),
    ];
    AnalysisInput {
        shoe: Shoe::shuffled_with_seed(8, 11).composition(),
        penetration: 0.35,
        history: played_history(40, 5),
        observed_burns: vec![Card::new(Rank::Ace, Suit::Hearts)],
        tells,
        team,
        hour_of_day: 23,
        hands_since_last_burn: 12,
    }
}

#[test]
fn eight_deck_neutral_example() {
    let engine = BurnEngine::default();
    let analysis = engine.analyze(&AnalysisInput::new(ShoeComposition::full(8), 0.0));

    let weights: Vec<f64> = analysis
        .scenarios
        .iter()
        .filter(|s| s.id().starts_with("composition-"))
        .map(|s| s.weight())
        .collect();
    assert_eq!(weights, vec![0.15, 0.25, 0.35, 0.2, 0.05]);
    assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    assert!(analysis.weighted_edge_impact.abs() < 0.001);
    assert_eq!(analysis.recommended_action, RecommendedAction::Neutral);
    assert_bounds(&analysis);
}

#[test]
fn empty_shoe_returns_exact_neutral_default() {
    let engine = BurnEngine::default();
    let mut input = rich_input();
    input.shoe = ShoeComposition::empty();
    let analysis = engine.analyze(&input);
    assert_eq!(analysis, ProfessionalBurnAnalysis::neutral());
    assert!(analysis.scenarios.is_empty());
    assert_eq!(analysis.kelly_multiplier, 1.0);
    assert_eq!(analysis.monte_carlo_adjustment, 1.0);
    assert_eq!(analysis.recommended_action, RecommendedAction::Neutral);
}

#[test]
fn negative_counts_are_rejected() {
    let shoe = ShoeComposition::from_counts([
        (Card::new(Rank::Ace, Suit::Clubs), 4),
        (Card::new(Rank::King, Suit::Clubs), -1),
    ]);
    let analysis = BurnEngine::default().analyze(&AnalysisInput::new(shoe, 0.5));
    assert!(analysis.is_neutral_default());
}

#[test]
fn out_of_range_penetration_matches_full_penetration() {
    let engine = BurnEngine::default();
    let mut over = rich_input();
    over.penetration = 1.5;
    let mut full = rich_input();
    full.penetration = 1.0;
    assert_eq!(engine.analyze(&over), engine.analyze(&full));
}

#[test]
fn observed_burns_never_raise_remaining_probability() {
    let shoe = ShoeComposition::full(8);
    let card = Card::new(Rank::Queen, Suit::Spades);
    let mut observed = Vec::new();
    let mut previous: Vec<f64> = composition_scenarios(&shoe, &observed)
        .iter()
        .map(|s| s.estimate_for(card).map_or(0.0, |e| e.probability))
        .collect();
    for _ in 0..10 {
        observed.push(card);
        let current: Vec<f64> = composition_scenarios(&shoe, &observed)
            .iter()
            .map(|s| s.estimate_for(card).map_or(0.0, |e| e.probability))
            .collect();
        for (now, before) in current.iter().zip(&previous) {
            assert!(now <= before);
        }
        previous = current;
    }
    assert!(previous.iter().all(|p| *p == 0.0));
}

#[test]
fn confidence_interval_is_ordered() {
    let engine = BurnEngine::default();
    for seed in 0..6 {
        let mut input = rich_input();
        input.shoe = Shoe::shuffled_with_seed(6, seed).composition();
        input.history = played_history(seed as usize * 4, seed);
        let analysis = engine.analyze(&input);
        let (low, high) = analysis.confidence_interval;
        assert!(low <= high);
        assert_bounds(&analysis);
    }
}

#[test]
fn rich_input_respects_every_bound() {
    let engine = BurnEngine::default();
    let analysis = engine.analyze(&rich_input());
    let ids: Vec<&str> = analysis.scenarios.iter().map(|s| s.id()).collect();
    assert!(ids.contains(&"fusion-dealer-tells"));
    assert!(ids.contains(&"fusion-team-play"));
    assert!(ids.contains(&"fusion-ml"));
    assert_bounds(&analysis);

    let refined = engine.refine(&analysis, &[
        QualitativeEvidence::dealer_tell(Rank::King),
        QualitativeEvidence::partial_glimpse(Rank::King),
        QualitativeEvidence::timing_pattern(),
    ]);
    assert_eq!(refined.bayesian_passes, 1);
    assert_bounds(&refined);

    let recommendation = engine.recommend(&refined);
    assert!((0.001..=0.25).contains(&recommendation.kelly_percentage));
    assert!((0.0..=1.0).contains(&recommendation.confidence));
    assert!(!recommendation.reasoning.is_empty());
    assert!(validate_metadata(&BurnMetadata::summarize(&refined)));
}

#[test]
fn ml_can_be_disabled() {
    let config = burnscope_core::config::EngineConfig {
        ml_enabled: false,
        ..Default::default()
    };
    let analysis = BurnEngine::new(config).analyze(&rich_input());
    assert!(analysis.scenarios.iter().all(|s| s.id() != "fusion-ml"));
}

#[test]
fn depleted_high_cards_shift_bias_edge_negative() {
    let engine = BurnEngine::default();
    let balanced = engine.analyze(&AnalysisInput::new(ShoeComposition::full(8), 0.0));

    let mut shoe = ShoeComposition::full(8);
    let mut burned = Vec::new();
    let zero_value = [Rank::Ten, Rank::Jack, Rank::Queen, Rank::King];
    'outer: for round in 0..8 {
        for rank in zero_value {
            for suit in Suit::ALL {
                if burned.len() == 50 {
                    break 'outer;
                }
                let card = Card::new(rank, suit);
                assert!(shoe.remove(card), "round {round}");
                burned.push(card);
            }
        }
    }
    let mut input = AnalysisInput::new(shoe, 0.0);
    input.observed_burns = burned;
    let depleted = engine.analyze(&input);

    let bias_edge = |analysis: &ProfessionalBurnAnalysis| {
        let bias: Vec<_> = analysis
            .scenarios
            .iter()
            .filter(|s| s.id().starts_with("bias-"))
            .cloned()
            .collect();
        aggregate(&bias).map_or(0.0, |agg| agg.weighted_edge_impact)
    };
    assert!(bias_edge(&depleted) < 0.0);
    assert!(bias_edge(&depleted) < bias_edge(&balanced));
    assert!(depleted.weighted_edge_impact < balanced.weighted_edge_impact);
    // ±0.001 card weights keep the shift inside the edge band.
    assert!(depleted.weighted_edge_impact.abs() < EDGE_THRESHOLD);
    assert!(depleted.weighted_uncertainty <= HIGH_UNCERTAINTY);
    assert_eq!(depleted.recommended_action, RecommendedAction::Neutral);
    assert_bounds(&depleted);
}

#[test]
fn huge_counts_analyze_without_panicking() {
    let shoe = ShoeComposition::from_counts([
        (Card::new(Rank::Two, Suit::Clubs), 3_000_000_000),
        (Card::new(Rank::King, Suit::Clubs), 3_000_000_000),
    ]);
    let analysis = BurnEngine::default().analyze(&AnalysisInput::new(shoe, 0.5));
    assert!(!analysis.is_neutral_default());
    assert!(analysis.scenarios.iter().any(|s| s.id().starts_with("composition-")));
    assert_bounds(&analysis);
}

#[test]
fn full_team_coverage_beats_single_observer() {
    let sighting = DealerTellEvidence::new(TellKind::HandMovement, 0.7, Reliability::Medium)
        .with_rank(Rank::Eight)
        .with_suit(Suit::Clubs);
    let positions = [
        ObserverPosition::FirstBase,
        ObserverPosition::ThirdBase,
        ObserverPosition::BehindDealer,
        ObserverPosition::SideAngle,
    ];
    let team: Vec<TeamPlayData> = positions
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            TeamPlayData::new(format!("obs-{i}"), position, 0.7).observe(sighting.clone())
        })
        .collect();
    let solo = vec![team[0].clone()];
    assert!(team_effectiveness(&team) > team_effectiveness(&solo));
}
