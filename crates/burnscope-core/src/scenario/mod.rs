//! Burn estimates and the immutable scenarios that group them.

use crate::evidence::unit;
use crate::impact::{ScenarioImpact, scenario_impact};
use crate::model::card::Card;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateMethod {
    Observed,
    Statistical,
    Bayesian,
    Pattern,
}

/// Belief that one specific card was among the burned cards.
///
/// Probabilities across a scenario need not sum to one: burn events for
/// different cards are not mutually exclusive at this granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnEstimate {
    pub card: Card,
    pub probability: f64,
    pub confidence: f64,
    pub method: EstimateMethod,
    pub evidence: Vec<String>,
}

impl BurnEstimate {
    /// Builds an estimate with probability and confidence clamped into [0, 1].
    pub fn new(card: Card, probability: f64, confidence: f64, method: EstimateMethod) -> Self {
        Self {
            card,
            probability: unit(probability),
            confidence: unit(confidence),
            method,
            evidence: Vec::new(),
        }
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.evidence.push(tag.into());
        self
    }
}

/// One mutually exclusive explanation of what was burned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnScenario {
    id: String,
    name: String,
    estimates: Vec<BurnEstimate>,
    weight: f64,
    edge_impact: f64,
    kelly_adjustment: f64,
    uncertainty: f64,
}

impl BurnScenario {
    /// Creates a scenario, deriving its edge impact, uncertainty and Kelly adjustment
    /// from the estimates.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        estimates: Vec<BurnEstimate>,
        weight: f64,
    ) -> Self {
        let ScenarioImpact {
            edge_impact,
            uncertainty,
            kelly_adjustment,
        } = scenario_impact(&estimates);
        Self {
            id: id.into(),
            name: name.into(),
            estimates,
            weight: unit(weight),
            edge_impact,
            kelly_adjustment,
            uncertainty,
        }
    }

    /// Returns a new scenario with the same identity and weight but different estimates.
    pub fn with_estimates(&self, estimates: Vec<BurnEstimate>) -> Self {
        Self::new(self.id.clone(), self.name.clone(), estimates, self.weight)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn estimates(&self) -> &[BurnEstimate] {
        &self.estimates
    }

    pub fn estimate_for(&self, card: Card) -> Option<&BurnEstimate> {
        self.estimates.iter().find(|estimate| estimate.card == card)
    }

    /// Prior likelihood that this scenario is the correct explanation.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn edge_impact(&self) -> f64 {
        self.edge_impact
    }

    pub fn kelly_adjustment(&self) -> f64 {
        self.kelly_adjustment
    }

    pub fn uncertainty(&self) -> f64 {
        self.uncertainty
    }
}
