use super::tells::{DealerTellEvidence, unit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObserverPosition {
    FirstBase,
    ThirdBase,
    BehindDealer,
    SideAngle,
}

impl ObserverPosition {
    pub const COUNT: usize = 4;
}

/// One observer's report for the current shoe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPlayData {
    pub observer_id: String,
    pub position: ObserverPosition,
    #[serde(default)]
    pub burn_observations: Vec<DealerTellEvidence>,
    pub confidence: f64,
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl TeamPlayData {
    pub fn new(observer_id: impl Into<String>, position: ObserverPosition, confidence: f64) -> Self {
        Self {
            observer_id: observer_id.into(),
            position,
            burn_observations: Vec::new(),
            confidence,
            timestamp_ms: 0,
        }
    }

    pub fn observe(mut self, observation: DealerTellEvidence) -> Self {
        self.burn_observations.push(observation);
        self
    }

    pub fn clamped_confidence(&self) -> f64 {
        unit(self.confidence)
    }
}
