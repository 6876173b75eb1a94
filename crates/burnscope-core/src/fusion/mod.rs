//! Converts dealer tells, team observer reports and a learned predictor into
//! additional burn scenarios. Fused scenarios are appended to the generated ones,
//! never substituted for them.

mod ml;
mod team;
mod tells;

pub use ml::{
    BurnPredictor, BurnPredictorConfig, MIN_HISTORY_HANDS, MlBurnPrediction, MlContext,
    MlFeatures, ml_scenario, prediction_scenario,
};
pub use team::{CardConsensus, card_consensus, team_effectiveness, team_scenario};
pub use tells::{dealer_reliability, tell_factor, tell_scenario};
