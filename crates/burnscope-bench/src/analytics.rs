use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use burnscope_core::recommend::RecommendedAction;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::BenchmarkConfig;

const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline engine '{0}' not present in results")]
    MissingBaseline(String),
    #[error("engine '{0}' reported results but is missing from configuration")]
    UnknownEngine(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Per-session scoring of one engine variant against the true burns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionScore {
    pub estimated_edge: f64,
    pub true_edge: f64,
    pub action: RecommendedAction,
    pub kelly_percentage: f64,
    pub top_rank_hit: bool,
    pub analyze_ms: f64,
}

impl SessionScore {
    pub fn edge_error(&self) -> f64 {
        (self.estimated_edge - self.true_edge).abs()
    }

    pub fn sign_agrees(&self) -> bool {
        self.estimated_edge.signum() == self.true_edge.signum() || self.true_edge == 0.0
    }
}

pub struct AnalyticsCollector {
    baseline: String,
    engines: HashMap<String, EngineAccumulator>,
    order: Vec<String>,
    // Per session index, edge error of every engine; used for paired comparisons.
    errors_by_session: BTreeMap<usize, HashMap<String, f64>>,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        let order: Vec<String> = config.engines.iter().map(|e| e.name.clone()).collect();
        Self {
            baseline: config.baseline().to_string(),
            engines: order
                .iter()
                .map(|name| (name.clone(), EngineAccumulator::default()))
                .collect(),
            order,
            errors_by_session: BTreeMap::new(),
        }
    }

    pub fn record(
        &mut self,
        session: usize,
        engine: &str,
        score: &SessionScore,
    ) -> Result<(), AnalyticsError> {
        let acc = self
            .engines
            .get_mut(engine)
            .ok_or_else(|| AnalyticsError::UnknownEngine(engine.to_string()))?;
        acc.record(score);
        self.errors_by_session
            .entry(session)
            .or_default()
            .insert(engine.to_string(), score.edge_error());
        Ok(())
    }

    pub fn finalize(mut self) -> Result<AnalyticsSummary, AnalyticsError> {
        if self.engines.get(&self.baseline).is_none_or(|acc| acc.sessions == 0) {
            return Err(AnalyticsError::MissingBaseline(self.baseline));
        }

        let mut reports = Vec::with_capacity(self.order.len());
        for name in &self.order {
            if let Some(acc) = self.engines.remove(name) {
                let diffs: Vec<f64> = self
                    .errors_by_session
                    .values()
                    .filter_map(|errors| Some(errors.get(name)? - errors.get(&self.baseline)?))
                    .collect();
                let (p_value, paired) = if *name == self.baseline {
                    (1.0, 0)
                } else {
                    wilcoxon_signed_rank(&diffs)
                };
                reports.push(acc.into_report(name.clone(), p_value, paired));
            }
        }

        Ok(AnalyticsSummary {
            baseline: self.baseline,
            engines: reports,
        })
    }
}

#[derive(Default)]
struct EngineAccumulator {
    sessions: usize,
    actions: BTreeMap<RecommendedAction, usize>,
    top_rank_hits: usize,
    sign_agreements: usize,
    edge_errors: Vec<f64>,
    kelly_percentages: Vec<f64>,
    total_ms: f64,
}

impl EngineAccumulator {
    fn record(&mut self, score: &SessionScore) {
        self.sessions += 1;
        *self.actions.entry(score.action).or_insert(0) += 1;
        self.top_rank_hits += usize::from(score.top_rank_hit);
        self.sign_agreements += usize::from(score.sign_agrees());
        self.edge_errors.push(score.edge_error());
        self.kelly_percentages.push(score.kelly_percentage);
        self.total_ms += score.analyze_ms;
    }

    fn into_report(self, name: String, p_value: f64, paired_sessions: usize) -> EngineReport {
        let rate = |count: usize| {
            if self.sessions == 0 {
                0.0
            } else {
                count as f64 / self.sessions as f64
            }
        };
        let count = |action: RecommendedAction| self.actions.get(&action).copied().unwrap_or(0);
        EngineReport {
            name,
            sessions: self.sessions,
            conservative: count(RecommendedAction::Conservative),
            neutral: count(RecommendedAction::Neutral),
            aggressive: count(RecommendedAction::Aggressive),
            top_rank_hit_rate: rate(self.top_rank_hits),
            sign_agreement_rate: rate(self.sign_agreements),
            mean_edge_error: mean(&self.edge_errors),
            kelly_ci95: confidence_interval(&self.kelly_percentages),
            avg_analyze_ms: if self.sessions == 0 {
                0.0
            } else {
                self.total_ms / self.sessions as f64
            },
            p_value,
            paired_sessions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineReport {
    pub name: String,
    pub sessions: usize,
    pub conservative: usize,
    pub neutral: usize,
    pub aggressive: usize,
    pub top_rank_hit_rate: f64,
    pub sign_agreement_rate: f64,
    pub mean_edge_error: f64,
    pub kelly_ci95: (f64, f64),
    pub avg_analyze_ms: f64,
    /// Paired test of edge error against the baseline.
    pub p_value: f64,
    pub paired_sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub engines: Vec<EngineReport>,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut out = String::from("# Burn Estimation Summary\n\n");
        out.push_str(&format!("Baseline engine: `{}`\n\n", self.baseline));
        out.push_str("| Engine | Sessions | Conservative | Neutral | Aggressive | Top-rank hit % | Sign agree % | Mean edge error | Kelly % 95% CI | Avg ms | p-value |\n");
        out.push_str("|--------|----------|--------------|---------|------------|----------------|--------------|-----------------|----------------|--------|---------|\n");
        for engine in &self.engines {
            out.push_str(&format!(
                "| {name} | {sessions} | {cons} | {neutral} | {aggr} | {hit:.1}% | {sign:.1}% | {err:.5} | [{lo:.4}, {hi:.4}] | {ms:.2} | {p:.3} |\n",
                name = engine.name,
                sessions = engine.sessions,
                cons = engine.conservative,
                neutral = engine.neutral,
                aggr = engine.aggressive,
                hit = engine.top_rank_hit_rate * 100.0,
                sign = engine.sign_agreement_rate * 100.0,
                err = engine.mean_edge_error,
                lo = engine.kelly_ci95.0 * 100.0,
                hi = engine.kelly_ci95.1 * 100.0,
                ms = engine.avg_analyze_ms,
                p = engine.p_value,
            ));
        }
        fs::write(path.as_ref(), out).map_err(|source| AnalyticsError::Io {
            context: "writing summary markdown",
            source,
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn standard_normal() -> Option<Normal> {
    Normal::new(0.0, 1.0).ok()
}

/// Normal-approximation interval for the mean.
pub fn confidence_interval(values: &[f64]) -> (f64, f64) {
    let m = mean(values);
    if values.len() < 2 {
        return (m, m);
    }
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0);
    let z = standard_normal()
        .map(|normal| normal.inverse_cdf(0.5 + CONFIDENCE_LEVEL / 2.0))
        .unwrap_or(1.96);
    let margin = z * (variance / values.len() as f64).sqrt();
    (m - margin, m + margin)
}

/// Two-sided Wilcoxon signed-rank test (normal approximation with tie and
/// continuity correction). Zero differences are dropped. Returns `(p, n)`.
pub fn wilcoxon_signed_rank(diffs: &[f64]) -> (f64, usize) {
    let mut nonzero: Vec<f64> = diffs.iter().copied().filter(|d| d.abs() > f64::EPSILON).collect();
    let n = nonzero.len();
    if n == 0 {
        return (1.0, 0);
    }
    nonzero.sort_by(|a, b| a.abs().total_cmp(&b.abs()));

    let mut w_plus = 0.0;
    let mut tie_correction = 0.0;
    let mut start = 0;
    while start < n {
        let mut end = start;
        while end + 1 < n && (nonzero[end + 1].abs() - nonzero[start].abs()).abs() < 1e-12 {
            end += 1;
        }
        let shared_rank = (start + end + 2) as f64 / 2.0;
        w_plus += nonzero[start..=end].iter().filter(|d| **d > 0.0).count() as f64 * shared_rank;
        let ties = (end - start + 1) as f64;
        if ties > 1.0 {
            tie_correction += (ties.powi(3) - ties) / 48.0;
        }
        start = end + 1;
    }

    let n_f = n as f64;
    let total_rank = n_f * (n_f + 1.0) / 2.0;
    let w = w_plus.min(total_rank - w_plus);
    let mean_w = total_rank / 2.0;
    let variance = n_f * (n_f + 1.0) * (2.0 * n_f + 1.0) / 24.0 - tie_correction;
    let Some(normal) = standard_normal().filter(|_| variance > 0.0) else {
        return (1.0, n);
    };
    let z = (((w - mean_w).abs() - 0.5) / variance.sqrt()).max(0.0);
    ((2.0 * (1.0 - normal.cdf(z))).clamp(0.0, 1.0), n)
}
