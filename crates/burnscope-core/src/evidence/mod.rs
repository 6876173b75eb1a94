//! Evidence supplied by external observers: dealer tells, team reports and
//! qualitative cues for Bayesian refinement.

mod qualitative;
mod team;
mod tells;

pub use qualitative::{EvidenceKind, QualitativeEvidence};
pub use team::{ObserverPosition, TeamPlayData};
pub use tells::{DealerTellEvidence, Reliability, TellKind};
pub(crate) use tells::unit;
