mod table;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use burnscope_core::analysis::ProfessionalBurnAnalysis;
use burnscope_core::engine::BurnEngine;
use burnscope_core::impact::signed_card_weight;
use burnscope_core::metadata::{BurnMetadata, validate_metadata};
use burnscope_core::model::card::Card;
use burnscope_core::model::rank::Rank;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError, SessionScore};
use crate::config::{BenchmarkConfig, EngineVariant, ResolvedOutputs};

pub use table::{SimulatedSession, deal_session};

const SESSION_STREAM: u64 = 0x7461_626c_6521;

/// Deals simulated shoes and scores every configured engine variant on them.
pub struct SimulationRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    engines: Vec<(EngineVariant, BurnEngine)>,
    logging_enabled: bool,
}

pub struct RunSummary {
    pub sessions: usize,
    pub engines: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SessionRow {
    run_id: String,
    session_id: String,
    session_index: usize,
    shoe_seed: u64,
    engine: String,
    burn_count: usize,
    true_burns: Vec<Card>,
    penetration: f64,
    scenarios: usize,
    estimated_edge: f64,
    true_edge: f64,
    kelly_multiplier: f64,
    monte_carlo_adjustment: f64,
    weighted_uncertainty: f64,
    action: String,
    kelly_percentage: f64,
    top_rank: Option<Rank>,
    top_rank_hit: bool,
    metadata_valid: bool,
    analyze_ms: f64,
}

impl SimulationRunner {
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Self {
        let engines = config
            .engines
            .iter()
            .map(|variant| {
                let engine = BurnEngine::new(variant.engine_config(&config.simulation));
                (variant.clone(), engine)
            })
            .collect();
        Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            engines,
        }
    }

    /// Runs every session, streaming one JSONL row per session and engine.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.simulation.seed.unwrap_or(0));
        let mut analytics = AnalyticsCollector::new(&self.config);
        let mut rows_written = 0usize;

        for session_index in 0..self.config.simulation.sessions {
            let shoe_seed = rng.next_u64();
            let mut session_rng = StdRng::seed_from_u64(shoe_seed ^ SESSION_STREAM);
            let session = deal_session(&self.config.simulation, shoe_seed, &mut session_rng);

            for (variant, engine) in &self.engines {
                let (row, score) = self.score_session(session_index, shoe_seed, &session, variant, engine);
                analytics.record(session_index, &variant.name, &score)?;
                serde_json::to_writer(&mut writer, &row)?;
                writer.write_all(b"\n")?;
                rows_written += 1;
            }
        }
        writer.flush()?;

        let summary = analytics.finalize()?;
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = self.logging_enabled.then(|| {
            self.outputs
                .summary_md
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
                .join("telemetry.jsonl")
        });

        Ok(RunSummary {
            sessions: self.config.simulation.sessions,
            engines: self.engines.len(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
        })
    }

    fn score_session(
        &self,
        session_index: usize,
        shoe_seed: u64,
        session: &SimulatedSession,
        variant: &EngineVariant,
        engine: &BurnEngine,
    ) -> (SessionRow, SessionScore) {
        let started = Instant::now();
        let mut analysis = engine.analyze(&session.input);
        if variant.monte_carlo {
            analysis = engine.refine_with_configured_monte_carlo(&analysis).0;
        }
        let recommendation = engine.recommend(&analysis);
        let analyze_ms = started.elapsed().as_secs_f64() * 1_000.0;

        let true_edge: f64 = session.true_burns.iter().map(|c| signed_card_weight(*c)).sum();
        let top_rank = top_rank(&analysis);
        let top_rank_hit =
            top_rank.is_some_and(|rank| session.true_burns.iter().any(|c| c.rank == rank));
        let session_id = format!("S{session_index:05}");

        if self.logging_enabled {
            event!(
                target: "burnscope_bench::session",
                Level::INFO,
                run_id = %self.config.run_id,
                session_id = %session_id,
                engine = %variant.name,
                estimated_edge = analysis.weighted_edge_impact,
                true_edge,
                action = recommendation.action.as_str(),
                top_rank_hit,
                analyze_ms,
                "session scored"
            );
        }

        let score = SessionScore {
            estimated_edge: analysis.weighted_edge_impact,
            true_edge,
            action: recommendation.action,
            kelly_percentage: recommendation.kelly_percentage,
            top_rank_hit,
            analyze_ms,
        };
        let row = SessionRow {
            run_id: self.config.run_id.clone(),
            session_id,
            session_index,
            shoe_seed,
            engine: variant.name.clone(),
            burn_count: session.true_burns.len(),
            true_burns: session.true_burns.clone(),
            penetration: session.input.penetration,
            scenarios: analysis.scenarios.len(),
            estimated_edge: analysis.weighted_edge_impact,
            true_edge,
            kelly_multiplier: analysis.kelly_multiplier,
            monte_carlo_adjustment: analysis.monte_carlo_adjustment,
            weighted_uncertainty: analysis.weighted_uncertainty,
            action: recommendation.action.as_str().to_string(),
            kelly_percentage: recommendation.kelly_percentage,
            top_rank,
            top_rank_hit,
            metadata_valid: validate_metadata(&BurnMetadata::summarize(&analysis)),
            analyze_ms,
        };
        (row, score)
    }
}

/// Rank with the highest scenario-weighted burn probability, summed over suits.
pub fn top_rank(analysis: &ProfessionalBurnAnalysis) -> Option<Rank> {
    let total_weight: f64 = analysis.scenarios.iter().map(|s| s.weight()).sum();
    if total_weight <= 0.0 {
        return None;
    }
    let mut by_rank = [0.0f64; 13];
    for scenario in &analysis.scenarios {
        let w = scenario.weight() / total_weight;
        for estimate in scenario.estimates() {
            by_rank[estimate.card.rank.index()] += w * estimate.probability;
        }
    }
    by_rank
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .and_then(|(index, _)| Rank::from_value(index as u8 + 1))
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize session row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}
