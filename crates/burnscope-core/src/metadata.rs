//! Compact, loosely-typed summary of an analysis for attaching to external
//! records, plus the validator that decides whether such a record is usable.

use crate::analysis::ProfessionalBurnAnalysis;
use crate::impact::{KELLY_MULTIPLIER_MAX, KELLY_MULTIPLIER_MIN, MONTE_CARLO_MAX, MONTE_CARLO_MIN};
use crate::recommend::RecommendedAction;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BurnMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_edge_impact: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kelly_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monte_carlo_adjustment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_uncertainty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_action: Option<String>,
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to parse burn metadata: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("burn metadata failed validation")]
    Invalid,
}

impl BurnMetadata {
    pub fn summarize(analysis: &ProfessionalBurnAnalysis) -> Self {
        Self {
            weighted_edge_impact: Some(analysis.weighted_edge_impact),
            kelly_multiplier: Some(analysis.kelly_multiplier),
            monte_carlo_adjustment: Some(analysis.monte_carlo_adjustment),
            confidence_low: Some(analysis.confidence_interval.0),
            confidence_high: Some(analysis.confidence_interval.1),
            weighted_uncertainty: Some(analysis.weighted_uncertainty),
            scenario_count: Some(analysis.scenarios.len()),
            recommended_action: Some(analysis.recommended_action.as_str().to_string()),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, MetadataError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Parses and rejects anything [`validate_metadata`] would refuse.
    pub fn from_json_validated(raw: &str) -> Result<Self, MetadataError> {
        let meta = Self::from_json(raw)?;
        if validate_metadata(&meta) {
            Ok(meta)
        } else {
            Err(MetadataError::Invalid)
        }
    }

    pub fn to_json(&self) -> Result<String, MetadataError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Edge impact, Kelly multiplier and Monte Carlo adjustment are required and
/// must sit in their ranges; the remaining fields are checked only when present.
pub fn validate_metadata(meta: &BurnMetadata) -> bool {
    let Some(edge) = meta.weighted_edge_impact else {
        return false;
    };
    let Some(kelly) = meta.kelly_multiplier else {
        return false;
    };
    let Some(adjustment) = meta.monte_carlo_adjustment else {
        return false;
    };
    if !edge.is_finite()
        || !(KELLY_MULTIPLIER_MIN..=KELLY_MULTIPLIER_MAX).contains(&kelly)
        || !(MONTE_CARLO_MIN..=MONTE_CARLO_MAX).contains(&adjustment)
    {
        return false;
    }

    let interval_ok = match (meta.confidence_low, meta.confidence_high) {
        (Some(low), Some(high)) => low.is_finite() && high.is_finite() && low <= high,
        (Some(bound), None) | (None, Some(bound)) => bound.is_finite(),
        (None, None) => true,
    };
    let uncertainty_ok = meta
        .weighted_uncertainty
        .is_none_or(|u| (0.0..=1.0).contains(&u));
    let action_ok = meta
        .recommended_action
        .as_deref()
        .is_none_or(|label| RecommendedAction::parse(label).is_some());

    interval_ok && uncertainty_ok && action_ok
}
