//! Burn-card estimation for baccarat shoes.
//!
//! [`engine::BurnEngine`] turns a remaining-shoe composition plus optional
//! history, dealer tells and team reports into weighted burn scenarios, then
//! folds them into an edge estimate and a stake-sizing recommendation.

pub mod analysis;
pub mod bayes;
pub mod config;
pub mod engine;
pub mod evidence;
pub mod fusion;
pub mod generators;
pub mod impact;
pub mod metadata;
pub mod model;
pub mod monte_carlo;
pub mod recommend;
pub mod scenario;
pub mod telemetry;

pub use analysis::ProfessionalBurnAnalysis;
pub use engine::{AnalysisInput, BurnEngine};
pub use recommend::{Recommendation, RecommendedAction};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "burnscope"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "burnscope");
        assert!(!AppInfo::version().is_empty());
    }
}
