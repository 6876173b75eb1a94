use crate::analysis::ProfessionalBurnAnalysis;
use crate::impact::AggregateImpact;
use core::fmt;
use serde::{Deserialize, Serialize};

pub const EDGE_THRESHOLD: f64 = 0.005;
pub const AGGRESSIVE_KELLY_FLOOR: f64 = 1.1;
pub const CONSERVATIVE_KELLY_CEILING: f64 = 0.9;
pub const HIGH_UNCERTAINTY: f64 = 0.6;
pub const BASE_KELLY_FRACTION: f64 = 0.02;
pub const KELLY_PERCENTAGE_MIN: f64 = 0.001;
pub const KELLY_PERCENTAGE_MAX: f64 = 0.25;

pub const STANDARD_BETTING: &str =
    "Standard betting: burn analysis shows no significant edge or uncertainty signal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    Conservative,
    Neutral,
    Aggressive,
}

impl RecommendedAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            RecommendedAction::Conservative => "conservative",
            RecommendedAction::Neutral => "neutral",
            RecommendedAction::Aggressive => "aggressive",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "conservative" => Some(RecommendedAction::Conservative),
            "neutral" => Some(RecommendedAction::Neutral),
            "aggressive" => Some(RecommendedAction::Aggressive),
            _ => None,
        }
    }
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A threshold that fired while deciding the action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    PositiveEdge { edge: f64, kelly: f64 },
    NegativeEdge { edge: f64 },
    HighUncertainty { uncertainty: f64 },
    LowKelly { kelly: f64 },
}

impl Signal {
    pub const fn is_conservative(self) -> bool {
        !matches!(self, Signal::PositiveEdge { .. })
    }

    fn describe(self) -> String {
        match self {
            Signal::PositiveEdge { edge, kelly } => format!(
                "Positive burn edge {edge:+.4} with Kelly multiplier {kelly:.2} supports larger stakes"
            ),
            Signal::NegativeEdge { edge } => {
                format!("Negative burn edge {edge:+.4} favours reducing exposure")
            }
            Signal::HighUncertainty { uncertainty } => {
                format!("High burn estimation uncertainty ({uncertainty:.2})")
            }
            Signal::LowKelly { kelly } => {
                format!("Kelly multiplier {kelly:.2} below {CONSERVATIVE_KELLY_CEILING:.2}")
            }
        }
    }
}

/// Every threshold the aggregate crosses, conservative signals first.
pub fn signals(aggregate: &AggregateImpact) -> Vec<Signal> {
    let mut fired = Vec::new();
    let edge = aggregate.weighted_edge_impact;
    let kelly = aggregate.kelly_multiplier;
    if edge < -EDGE_THRESHOLD {
        fired.push(Signal::NegativeEdge { edge });
    }
    if aggregate.weighted_uncertainty > HIGH_UNCERTAINTY {
        fired.push(Signal::HighUncertainty {
            uncertainty: aggregate.weighted_uncertainty,
        });
    }
    if kelly < CONSERVATIVE_KELLY_CEILING {
        fired.push(Signal::LowKelly { kelly });
    }
    if edge > EDGE_THRESHOLD && kelly > AGGRESSIVE_KELLY_FLOOR {
        fired.push(Signal::PositiveEdge { edge, kelly });
    }
    fired
}

/// Conservative signals override a positive edge; otherwise a positive edge is
/// aggressive and anything else neutral.
pub fn decide_action(aggregate: &AggregateImpact) -> RecommendedAction {
    let fired = signals(aggregate);
    if fired.iter().any(|s| s.is_conservative()) {
        RecommendedAction::Conservative
    } else if fired.is_empty() {
        RecommendedAction::Neutral
    } else {
        RecommendedAction::Aggressive
    }
}

/// Human-readable explanation listing every fired threshold.
pub fn reasoning(aggregate: &AggregateImpact) -> String {
    let fired = signals(aggregate);
    if fired.is_empty() {
        return STANDARD_BETTING.to_string();
    }
    let mut parts: Vec<String> = fired.iter().map(|s| s.describe()).collect();
    let overridden = fired.iter().any(|s| !s.is_conservative())
        && fired.iter().any(|s| s.is_conservative());
    if overridden {
        parts.push("conservative signals override the positive edge".to_string());
    }
    parts.join("; ")
}

/// Stake-sizing advice derived from an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kelly_percentage: f64,
    pub edge_adjustment: f64,
    pub confidence: f64,
    pub action: RecommendedAction,
    pub reasoning: String,
}

impl Recommendation {
    pub fn from_analysis(analysis: &ProfessionalBurnAnalysis) -> Self {
        let aggregate = analysis.aggregate();
        let kelly_percentage = (BASE_KELLY_FRACTION
            * analysis.kelly_multiplier
            * analysis.monte_carlo_adjustment)
            .clamp(KELLY_PERCENTAGE_MIN, KELLY_PERCENTAGE_MAX);
        Self {
            kelly_percentage,
            edge_adjustment: analysis.weighted_edge_impact,
            confidence: (1.0 - analysis.weighted_uncertainty).clamp(0.0, 1.0),
            action: analysis.recommended_action,
            reasoning: reasoning(&aggregate),
        }
    }
}
