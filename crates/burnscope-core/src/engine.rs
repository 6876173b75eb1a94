//! Stateless entry points. Every call is a pure function of its input; the
//! engine holds configuration only.

use crate::analysis::ProfessionalBurnAnalysis;
use crate::bayes::refine_scenario;
use crate::config::EngineConfig;
use crate::evidence::{DealerTellEvidence, QualitativeEvidence, TeamPlayData};
use crate::fusion::{BurnPredictor, MlContext, ml_scenario, team_scenario, tell_scenario};
use crate::generators::{bias_scenarios, composition_scenarios, pattern_scenarios};
use crate::model::card::Card;
use crate::model::history::HandRecord;
use crate::model::shoe::ShoeComposition;
use crate::monte_carlo::{MonteCarloBudget, MonteCarloOutcome, simulate};
use crate::recommend::Recommendation;
use crate::telemetry::AnalysisMetrics;
use serde::{Deserialize, Serialize};
use tracing::{Level, debug, warn};

/// Everything one analysis call reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisInput {
    pub shoe: ShoeComposition,
    /// Fraction of the shoe already dealt, expected in [0, 1].
    pub penetration: f64,
    pub history: Vec<HandRecord>,
    pub observed_burns: Vec<Card>,
    pub tells: Vec<DealerTellEvidence>,
    pub team: Vec<TeamPlayData>,
    pub hour_of_day: u8,
    pub hands_since_last_burn: u32,
}

impl AnalysisInput {
    pub fn new(shoe: ShoeComposition, penetration: f64) -> Self {
        Self {
            shoe,
            penetration,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BurnEngine {
    config: EngineConfig,
    predictor: BurnPredictor,
}

impl BurnEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            predictor: BurnPredictor::default(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(EngineConfig::from_env())
    }

    pub fn with_predictor(mut self, predictor: BurnPredictor) -> Self {
        self.predictor = predictor;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs every generator and fusion step over `input`. Never fails: an empty or
    /// negative shoe yields [`ProfessionalBurnAnalysis::neutral`].
    pub fn analyze(&self, input: &AnalysisInput) -> ProfessionalBurnAnalysis {
        if !input.shoe.is_valid() {
            warn!(
                target: "burnscope_core::engine",
                total = input.shoe.total(),
                negative_input = input.shoe.had_negative_input(),
                message = "invalid shoe composition, returning neutral analysis"
            );
            return ProfessionalBurnAnalysis::neutral();
        }

        let penetration = sanitize_penetration(input.penetration);
        let mut scenarios = composition_scenarios(&input.shoe, &input.observed_burns);
        scenarios.extend(bias_scenarios(&input.shoe, penetration));
        scenarios.extend(pattern_scenarios(&input.shoe, &input.history, &input.observed_burns));

        scenarios.extend(tell_scenario(&input.tells));
        scenarios.extend(team_scenario(&input.team));
        if self.config.ml_enabled {
            let ctx = MlContext {
                shoe: &input.shoe,
                history: &input.history,
                tells: &input.tells,
                hour_of_day: input.hour_of_day,
                hands_since_last_burn: input.hands_since_last_burn,
            };
            scenarios.extend(ml_scenario(&ctx, &self.predictor));
        }

        let analysis = ProfessionalBurnAnalysis::from_scenarios(scenarios, 0);
        log_metrics("analyze", &analysis);
        analysis
    }

    /// Applies one Bayesian pass to every scenario and re-aggregates. The input
    /// analysis is left as it was.
    pub fn refine(
        &self,
        analysis: &ProfessionalBurnAnalysis,
        evidence: &[QualitativeEvidence],
    ) -> ProfessionalBurnAnalysis {
        let scenarios = analysis
            .scenarios
            .iter()
            .map(|scenario| refine_scenario(scenario, evidence))
            .collect();
        let refined =
            ProfessionalBurnAnalysis::from_scenarios(scenarios, analysis.bayesian_passes + 1);
        log_metrics("refine", &refined);
        refined
    }

    pub fn recommend(&self, analysis: &ProfessionalBurnAnalysis) -> Recommendation {
        Recommendation::from_analysis(analysis)
    }

    /// Replaces the Monte Carlo adjustment with a sampled one. The recommended
    /// action does not depend on the adjustment and is carried over.
    pub fn refine_with_monte_carlo(
        &self,
        analysis: &ProfessionalBurnAnalysis,
        budget: &MonteCarloBudget,
    ) -> (ProfessionalBurnAnalysis, MonteCarloOutcome) {
        let outcome = simulate(
            &analysis.scenarios,
            budget,
            self.config.monte_carlo_seed,
            analysis.monte_carlo_adjustment,
        );
        let refined = ProfessionalBurnAnalysis {
            monte_carlo_adjustment: outcome.adjustment,
            ..analysis.clone()
        };
        (refined, outcome)
    }

    /// Monte Carlo refinement bounded by the configured trials and time cap.
    pub fn refine_with_configured_monte_carlo(
        &self,
        analysis: &ProfessionalBurnAnalysis,
    ) -> (ProfessionalBurnAnalysis, MonteCarloOutcome) {
        self.refine_with_monte_carlo(analysis, &MonteCarloBudget::from_config(&self.config))
    }
}

fn sanitize_penetration(penetration: f64) -> f64 {
    if !penetration.is_finite() {
        warn!(
            target: "burnscope_core::engine",
            penetration,
            message = "non-finite penetration treated as 0"
        );
        return 0.0;
    }
    if !(0.0..=1.0).contains(&penetration) {
        warn!(
            target: "burnscope_core::engine",
            penetration,
            message = "penetration outside [0, 1] clamped"
        );
    }
    penetration.clamp(0.0, 1.0)
}

fn log_metrics(stage: &'static str, analysis: &ProfessionalBurnAnalysis) {
    if !tracing::enabled!(target: "burnscope_core::engine", Level::DEBUG) {
        return;
    }
    let metrics = AnalysisMetrics::from_analysis(analysis);
    debug!(
        target: "burnscope_core::engine",
        stage,
        scenarios = metrics.scenario_count,
        weight_entropy = metrics.weight_entropy,
        mean_confidence = metrics.mean_confidence,
        interval_width = metrics.interval_width,
        edge = analysis.weighted_edge_impact,
        kelly = analysis.kelly_multiplier,
        action = analysis.recommended_action.as_str(),
        passes = analysis.bayesian_passes,
        message = "burn analysis"
    );
}
