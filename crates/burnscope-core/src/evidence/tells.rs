use crate::model::rank::Rank;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TellKind {
    Hesitation,
    Positioning,
    Timing,
    FacialExpression,
    HandMovement,
    CardHandling,
}

impl TellKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            TellKind::Hesitation => "hesitation",
            TellKind::Positioning => "positioning",
            TellKind::Timing => "timing",
            TellKind::FacialExpression => "facial_expression",
            TellKind::HandMovement => "hand_movement",
            TellKind::CardHandling => "card_handling",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    Low,
    Medium,
    High,
}

impl Reliability {
    pub const fn score(self) -> f64 {
        match self {
            Reliability::Low => 0.3,
            Reliability::Medium => 0.6,
            Reliability::High => 0.9,
        }
    }
}

/// A pre-classified behavioural cue reported by an observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealerTellEvidence {
    pub kind: TellKind,
    pub confidence: f64,
    #[serde(default)]
    pub timestamp_ms: u64,
    #[serde(default)]
    pub estimated_rank: Option<Rank>,
    #[serde(default)]
    pub estimated_suit: Option<Suit>,
    pub reliability: Reliability,
}

impl DealerTellEvidence {
    pub fn new(kind: TellKind, confidence: f64, reliability: Reliability) -> Self {
        Self {
            kind,
            confidence,
            timestamp_ms: 0,
            estimated_rank: None,
            estimated_suit: None,
            reliability,
        }
    }

    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.estimated_rank = Some(rank);
        self
    }

    pub fn with_suit(mut self, suit: Suit) -> Self {
        self.estimated_suit = Some(suit);
        self
    }

    pub fn at(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    /// Reported confidence clamped to [0, 1]; non-finite values count as zero.
    pub fn clamped_confidence(&self) -> f64 {
        unit(self.confidence)
    }
}

pub(crate) fn unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
