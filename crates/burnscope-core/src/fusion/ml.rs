use crate::evidence::{DealerTellEvidence, TellKind};
use crate::generators::{EXPECTED_BURN_CARDS, RankFrequencies, history_rank_frequencies, normalize_rank_counts};
use crate::model::card::Card;
use crate::model::history::{HandRecord, OutcomeTally};
use crate::model::rank::Rank;
use crate::model::shoe::ShoeComposition;
use crate::model::suit::Suit;
use crate::scenario::{BurnEstimate, BurnScenario, EstimateMethod};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The predictor stays silent until the history holds more than this many hands.
pub const MIN_HISTORY_HANDS: usize = 10;

const OUTCOME_WINDOW: usize = 10;
const BASELINE_HIGH_RATIO: f64 = 7.0 / 13.0;
const STALENESS_SATURATION_HANDS: f64 = 80.0;
const MIN_RANK_MULTIPLIER: f64 = 0.05;
const SCENARIO_WEIGHT_SCALE: f64 = 0.25;

#[derive(Debug, Clone, Copy)]
pub struct BurnPredictorConfig {
    pub high_ratio_weight: f64,
    pub banker_trend_weight: f64,
    pub player_trend_weight: f64,
    pub hesitation_weight: f64,
    pub night_flatten: f64,
    pub staleness_blend: f64,
    pub confidence_saturation_hands: f64,
    pub top_picks: usize,
}

impl Default for BurnPredictorConfig {
    fn default() -> Self {
        Self {
            high_ratio_weight: 1.5,
            banker_trend_weight: 0.8,
            player_trend_weight: 0.8,
            hesitation_weight: 0.5,
            night_flatten: 0.2,
            staleness_blend: 0.3,
            confidence_saturation_hands: 50.0,
            top_picks: 5,
        }
    }
}

/// Everything the predictor reads, borrowed from the analysis input.
#[derive(Debug, Clone, Copy)]
pub struct MlContext<'a> {
    pub shoe: &'a ShoeComposition,
    pub history: &'a [HandRecord],
    pub tells: &'a [DealerTellEvidence],
    pub hour_of_day: u8,
    pub hands_since_last_burn: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MlFeatures {
    pub avg_hesitation: f64,
    pub recent_banker: f64,
    pub recent_player: f64,
    pub recent_tie: f64,
    pub high_card_ratio: f64,
    pub hour_of_day: f64,
    pub hands_since_last_burn: f64,
}

impl MlFeatures {
    pub fn extract(ctx: &MlContext<'_>) -> Self {
        let hesitations: Vec<f64> = ctx
            .tells
            .iter()
            .filter(|t| t.kind == TellKind::Hesitation)
            .map(DealerTellEvidence::clamped_confidence)
            .collect();
        let avg_hesitation = if hesitations.is_empty() {
            0.0
        } else {
            hesitations.iter().sum::<f64>() / hesitations.len() as f64
        };
        let tally = OutcomeTally::recent(ctx.history, OUTCOME_WINDOW);

        Self {
            avg_hesitation,
            recent_banker: tally.banker as f64,
            recent_player: tally.player as f64,
            recent_tie: tally.tie as f64,
            high_card_ratio: ctx.shoe.high_card_ratio(),
            hour_of_day: f64::from(ctx.hour_of_day % 24),
            hands_since_last_burn: f64::from(ctx.hands_since_last_burn),
        }
    }

    /// Banker-minus-player share of the recent window, in [-1, 1].
    pub fn outcome_trend(&self) -> f64 {
        (self.recent_banker - self.recent_player) / OUTCOME_WINDOW as f64
    }

    pub fn is_night_shift(&self) -> bool {
        self.hour_of_day >= 22.0 || self.hour_of_day < 6.0
    }

    pub fn staleness(&self) -> f64 {
        (self.hands_since_last_burn / STALENESS_SATURATION_HANDS).min(1.0)
    }
}

/// Advisory rank/suit prediction; never authoritative on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlBurnPrediction {
    pub predicted_ranks: Vec<(Rank, f64)>,
    pub predicted_suits: Vec<(Suit, f64)>,
    pub model_confidence: f64,
    pub training_data_size: usize,
    pub feature_importance: BTreeMap<String, f64>,
}

/// Lightweight linear tilt over history rank frequencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct BurnPredictor {
    config: BurnPredictorConfig,
}

impl BurnPredictor {
    pub const fn new(config: BurnPredictorConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> BurnPredictorConfig {
        self.config
    }

    /// Returns `None` while the history is too short to learn from.
    pub fn predict(&self, ctx: &MlContext<'_>) -> Option<MlBurnPrediction> {
        if ctx.history.len() <= MIN_HISTORY_HANDS {
            return None;
        }
        let cfg = self.config;
        let features = MlFeatures::extract(ctx);
        let base = history_rank_frequencies(ctx.history, ctx.shoe);

        let high_tilt = cfg.high_ratio_weight * (features.high_card_ratio - BASELINE_HIGH_RATIO);
        let trend = features.outcome_trend();
        let hesitation_ranks: Vec<Rank> = ctx
            .tells
            .iter()
            .filter(|t| t.kind == TellKind::Hesitation)
            .filter_map(|t| t.estimated_rank)
            .collect();

        let mut scores = [0.0; 13];
        for rank in Rank::ORDERED {
            let mut multiplier = 1.0;
            if rank.is_high() {
                multiplier *= 1.0 + high_tilt;
            }
            if rank.is_zero_value() {
                multiplier *= 1.0 + cfg.banker_trend_weight * trend;
            }
            if rank.is_low_value() {
                multiplier *= 1.0 - cfg.player_trend_weight * trend;
            }
            if hesitation_ranks.contains(&rank) {
                multiplier *= 1.0 + cfg.hesitation_weight * features.avg_hesitation;
            }
            scores[rank.index()] = base[rank.index()] * multiplier.max(MIN_RANK_MULTIPLIER);
        }
        let mut probs = normalize_rank_counts(&scores, ctx.shoe);

        let night = if features.is_night_shift() {
            cfg.night_flatten
        } else {
            0.0
        };
        let stale = cfg.staleness_blend * features.staleness();
        for rank in Rank::ORDERED {
            let slot = &mut probs[rank.index()];
            *slot = (1.0 - night) * *slot + night / 13.0;
            *slot = (1.0 - stale) * *slot + stale * ctx.shoe.rank_share(rank);
        }
        let probs = normalize_rank_counts(&probs, ctx.shoe);

        let mut feature_importance = BTreeMap::new();
        feature_importance.insert("high_card_ratio".to_string(), high_tilt.abs());
        feature_importance.insert(
            "outcome_trend".to_string(),
            cfg.banker_trend_weight * trend.abs(),
        );
        feature_importance.insert(
            "dealer_hesitation".to_string(),
            cfg.hesitation_weight * features.avg_hesitation,
        );
        feature_importance.insert("time_of_day".to_string(), night);
        feature_importance.insert("hands_since_last_burn".to_string(), stale);
        let importance_total: f64 = feature_importance.values().sum();
        if importance_total > 0.0 {
            for value in feature_importance.values_mut() {
                *value /= importance_total;
            }
        }

        Some(MlBurnPrediction {
            predicted_ranks: ranked_ranks(&probs),
            predicted_suits: ranked_suits(ctx.shoe),
            model_confidence: (ctx.history.len() as f64 / cfg.confidence_saturation_hands)
                .min(1.0),
            training_data_size: ctx.history.len(),
            feature_importance,
        })
    }
}

fn ranked_ranks(probs: &RankFrequencies) -> Vec<(Rank, f64)> {
    let mut ranked: Vec<(Rank, f64)> = Rank::ORDERED
        .iter()
        .map(|rank| (*rank, probs[rank.index()]))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

fn ranked_suits(shoe: &ShoeComposition) -> Vec<(Suit, f64)> {
    let total = shoe.total();
    let mut ranked: Vec<(Suit, f64)> = Suit::ALL
        .iter()
        .map(|suit| {
            let share = if total == 0 {
                0.25
            } else {
                shoe.suit_count(*suit) as f64 / total as f64
            };
            (*suit, share)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

/// Turns a prediction into a scenario of its top picks, each paired with the most
/// likely suit.
pub fn prediction_scenario(prediction: &MlBurnPrediction, top_picks: usize) -> BurnScenario {
    let (suit, suit_probability) = prediction
        .predicted_suits
        .first()
        .copied()
        .unwrap_or((Suit::PLACEHOLDER, 0.25));
    let estimates = prediction
        .predicted_ranks
        .iter()
        .take(top_picks)
        .map(|(rank, probability)| {
            BurnEstimate::new(
                Card::new(*rank, suit),
                probability * suit_probability * EXPECTED_BURN_CARDS,
                prediction.model_confidence,
                EstimateMethod::Pattern,
            )
            .tagged("ml_prediction")
            .tagged(format!("training_hands:{}", prediction.training_data_size))
        })
        .collect();
    BurnScenario::new(
        "fusion-ml",
        "Learned burn predictor",
        estimates,
        prediction.model_confidence * SCENARIO_WEIGHT_SCALE,
    )
}

/// Predictor output as a scenario, or `None` below the history threshold.
pub fn ml_scenario(ctx: &MlContext<'_>, predictor: &BurnPredictor) -> Option<BurnScenario> {
    predictor
        .predict(ctx)
        .map(|prediction| prediction_scenario(&prediction, predictor.config().top_picks))
}
