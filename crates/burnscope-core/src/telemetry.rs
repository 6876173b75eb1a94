use crate::analysis::ProfessionalBurnAnalysis;
use serde::Serialize;

/// Shape of an analysis, cheap enough to log on every call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisMetrics {
    pub scenario_count: usize,
    /// Shannon entropy (nats) of the normalised scenario weights.
    pub weight_entropy: f64,
    pub mean_confidence: f64,
    pub interval_width: f64,
}

impl AnalysisMetrics {
    pub fn from_analysis(analysis: &ProfessionalBurnAnalysis) -> Self {
        let scenarios = &analysis.scenarios;
        let total_weight: f64 = scenarios.iter().map(|s| s.weight()).sum();
        let weight_entropy = if total_weight > 0.0 {
            scenarios
                .iter()
                .map(|s| s.weight() / total_weight)
                .filter(|p| *p > 0.0)
                .map(|p| -p * p.ln())
                .sum()
        } else {
            0.0
        };

        let (sum, count) = scenarios
            .iter()
            .flat_map(|s| s.estimates())
            .fold((0.0, 0usize), |(sum, count), e| (sum + e.confidence, count + 1));
        let mean_confidence = if count > 0 { sum / count as f64 } else { 0.0 };

        let (low, high) = analysis.confidence_interval;
        Self {
            scenario_count: scenarios.len(),
            weight_entropy,
            mean_confidence,
            interval_width: high - low,
        }
    }
}
