use crate::impact::AggregateImpact;
use crate::recommend::{RecommendedAction, decide_action};
use crate::scenario::BurnScenario;
use serde::{Deserialize, Serialize};

/// Aggregate result of one analysis call. The engine keeps no state; the caller
/// owns any persistence of this value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalBurnAnalysis {
    pub scenarios: Vec<BurnScenario>,
    pub weighted_edge_impact: f64,
    pub kelly_multiplier: f64,
    pub monte_carlo_adjustment: f64,
    pub confidence_interval: (f64, f64),
    pub recommended_action: RecommendedAction,
    pub weighted_uncertainty: f64,
    /// Number of Bayesian refinement passes applied to produce this value.
    pub bayesian_passes: u32,
}

impl ProfessionalBurnAnalysis {
    /// Safe default returned for missing or invalid shoe input.
    pub fn neutral() -> Self {
        Self {
            scenarios: Vec::new(),
            weighted_edge_impact: 0.0,
            kelly_multiplier: 1.0,
            monte_carlo_adjustment: 1.0,
            confidence_interval: (0.0, 0.0),
            recommended_action: RecommendedAction::Neutral,
            weighted_uncertainty: 0.0,
            bayesian_passes: 0,
        }
    }

    pub fn from_scenarios(scenarios: Vec<BurnScenario>, bayesian_passes: u32) -> Self {
        let Some(aggregate) = crate::impact::aggregate(&scenarios) else {
            return Self {
                bayesian_passes,
                ..Self::neutral()
            };
        };
        let AggregateImpact {
            weighted_edge_impact,
            kelly_multiplier,
            monte_carlo_adjustment,
            weighted_uncertainty,
            confidence_interval,
        } = aggregate;
        Self {
            recommended_action: decide_action(&aggregate),
            scenarios,
            weighted_edge_impact,
            kelly_multiplier,
            monte_carlo_adjustment,
            confidence_interval,
            weighted_uncertainty,
            bayesian_passes,
        }
    }

    pub fn is_neutral_default(&self) -> bool {
        self.scenarios.is_empty()
            && self.kelly_multiplier == 1.0
            && self.monte_carlo_adjustment == 1.0
            && self.recommended_action == RecommendedAction::Neutral
    }

    pub fn aggregate(&self) -> AggregateImpact {
        AggregateImpact {
            weighted_edge_impact: self.weighted_edge_impact,
            kelly_multiplier: self.kelly_multiplier,
            monte_carlo_adjustment: self.monte_carlo_adjustment,
            weighted_uncertainty: self.weighted_uncertainty,
            confidence_interval: self.confidence_interval,
        }
    }
}
