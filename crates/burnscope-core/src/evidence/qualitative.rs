use crate::model::rank::Rank;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    DealerTell,
    PartialGlimpse,
    TimingPattern,
    Statistical,
    Observed,
}

/// New evidence fed to the Bayesian updater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitativeEvidence {
    pub kind: EvidenceKind,
    #[serde(default)]
    pub rank: Option<Rank>,
}

impl QualitativeEvidence {
    pub const fn new(kind: EvidenceKind, rank: Option<Rank>) -> Self {
        Self { kind, rank }
    }

    pub const fn dealer_tell(rank: Rank) -> Self {
        Self::new(EvidenceKind::DealerTell, Some(rank))
    }

    pub const fn partial_glimpse(rank: Rank) -> Self {
        Self::new(EvidenceKind::PartialGlimpse, Some(rank))
    }

    pub const fn timing_pattern() -> Self {
        Self::new(EvidenceKind::TimingPattern, None)
    }
}
