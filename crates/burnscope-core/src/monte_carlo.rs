//! Sampling refinement of the Monte Carlo adjustment.
//!
//! Each trial picks one scenario by weight, then draws every estimate of that
//! scenario as an independent Bernoulli burn. The spread of the sampled edge
//! shrinks the adjustment: a noisy edge means smaller stakes.

use crate::config::EngineConfig;
use crate::impact::{MONTE_CARLO_MAX, MONTE_CARLO_MIN, signed_card_weight};
use crate::scenario::BurnScenario;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const DISPERSION_PENALTY: f64 = 0.3;
const MAX_WORKERS: usize = 8;
const CHECK_INTERVAL: u32 = 64;
const CHUNK_TRIALS: u32 = 256;
const CHUNK_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Bounds on one refinement run. Whichever of trial count, deadline or flag
/// trips first ends the run.
#[derive(Debug, Clone, Default)]
pub struct MonteCarloBudget {
    pub trials: u32,
    pub time_cap: Option<Duration>,
    pub cancel: Option<Arc<AtomicBool>>,
}

impl MonteCarloBudget {
    pub fn trials(trials: u32) -> Self {
        Self {
            trials,
            ..Self::default()
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            trials: config.monte_carlo_trials,
            time_cap: config.monte_carlo_time_cap(),
            cancel: None,
        }
    }

    pub fn with_time_cap(mut self, cap: Duration) -> Self {
        self.time_cap = Some(cap);
        self
    }

    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloOutcome {
    pub trials_run: u32,
    pub mean_edge: f64,
    pub std_edge: f64,
    pub adjustment: f64,
    pub cancelled: bool,
}

impl MonteCarloOutcome {
    fn untouched(base: f64, cancelled: bool) -> Self {
        Self {
            trials_run: 0,
            mean_edge: 0.0,
            std_edge: 0.0,
            adjustment: base,
            cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Tally {
    trials: u32,
    sum: f64,
    sum_sq: f64,
    stopped_early: bool,
}

impl Tally {
    fn merge(self, other: Tally) -> Tally {
        Tally {
            trials: self.trials + other.trials,
            sum: self.sum + other.sum,
            sum_sq: self.sum_sq + other.sum_sq,
            stopped_early: self.stopped_early || other.stopped_early,
        }
    }
}

/// `base × (1 − 0.3 × σ/(σ + |μ|))`, clamped to the Monte Carlo range.
pub fn dispersion_adjustment(base: f64, mean: f64, std: f64) -> f64 {
    let dispersion = if std > 0.0 { std / (std + mean.abs()) } else { 0.0 };
    (base * (1.0 - DISPERSION_PENALTY * dispersion)).clamp(MONTE_CARLO_MIN, MONTE_CARLO_MAX)
}

/// Runs the sampler across worker threads. Trials are cut into fixed chunks of
/// `CHUNK_TRIALS`, each seeded from `(seed, chunk)` and merged in chunk order, so
/// with no deadline and no cancel flag the result depends only on `seed`,
/// `budget.trials` and the scenarios, never on the thread count.
pub fn simulate(
    scenarios: &[BurnScenario],
    budget: &MonteCarloBudget,
    seed: u64,
    base_adjustment: f64,
) -> MonteCarloOutcome {
    if budget.trials == 0 || scenarios.is_empty() {
        return MonteCarloOutcome::untouched(base_adjustment, false);
    }
    if budget.is_cancelled() {
        return MonteCarloOutcome::untouched(base_adjustment, true);
    }

    let weights: Vec<f64> = scenarios.iter().map(BurnScenario::weight).collect();
    let picker = WeightedIndex::new(&weights).ok();
    let deadline = budget.time_cap.map(|cap| Instant::now() + cap);
    let workers = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(MAX_WORKERS);

    let tally = run_chunks(budget.trials, workers, |chunk, quota| {
        let mut rng = StdRng::seed_from_u64(chunk_seed(seed, chunk));
        run_chunk(scenarios, picker.as_ref(), quota, deadline, budget, &mut rng)
    });

    if tally.trials == 0 {
        return MonteCarloOutcome::untouched(base_adjustment, tally.stopped_early);
    }
    let n = f64::from(tally.trials);
    let mean_edge = tally.sum / n;
    let variance = (tally.sum_sq / n - mean_edge * mean_edge).max(0.0);
    let std_edge = variance.sqrt();
    let adjustment = dispersion_adjustment(base_adjustment, mean_edge, std_edge);

    debug!(
        target: "burnscope_core::monte_carlo",
        trials = tally.trials,
        workers,
        mean_edge,
        std_edge,
        adjustment,
        stopped_early = tally.stopped_early,
        message = "monte carlo refinement finished"
    );

    MonteCarloOutcome {
        trials_run: tally.trials,
        mean_edge,
        std_edge,
        adjustment,
        cancelled: tally.stopped_early,
    }
}

fn chunk_seed(seed: u64, chunk: usize) -> u64 {
    seed ^ (chunk as u64).wrapping_add(1).wrapping_mul(CHUNK_SEED_STRIDE)
}

/// Workers pull chunk indices from a shared counter. Per-chunk tallies are merged
/// in index order so floating-point sums do not depend on scheduling. A worker
/// that panics loses its chunks and marks the run as stopped early.
fn run_chunks<F>(trials: u32, workers: usize, sample_chunk: F) -> Tally
where
    F: Fn(usize, u32) -> Tally + Sync,
{
    let chunks = trials.div_ceil(CHUNK_TRIALS) as usize;
    let workers = workers.clamp(1, chunks.max(1));
    let next_chunk = AtomicUsize::new(0);

    let (mut finished, lost_worker) = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let next_chunk = &next_chunk;
                let sample_chunk = &sample_chunk;
                scope.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let chunk = next_chunk.fetch_add(1, Ordering::Relaxed);
                        if chunk >= chunks {
                            break;
                        }
                        let start = chunk as u32 * CHUNK_TRIALS;
                        let quota = CHUNK_TRIALS.min(trials - start);
                        let tally = sample_chunk(chunk, quota);
                        let stop = tally.stopped_early;
                        done.push((chunk, tally));
                        if stop {
                            break;
                        }
                    }
                    done
                })
            })
            .collect();

        let mut finished = Vec::with_capacity(chunks);
        let mut lost_worker = false;
        for handle in handles {
            match handle.join() {
                Ok(done) => finished.extend(done),
                Err(_) => lost_worker = true,
            }
        }
        (finished, lost_worker)
    });

    if lost_worker {
        warn!(
            target: "burnscope_core::monte_carlo",
            message = "monte carlo worker panicked, its trials were dropped"
        );
    }
    finished.sort_by_key(|(chunk, _)| *chunk);
    let mut tally = finished
        .into_iter()
        .map(|(_, tally)| tally)
        .fold(Tally::default(), Tally::merge);
    tally.stopped_early |= lost_worker;
    tally
}

fn run_chunk(
    scenarios: &[BurnScenario],
    picker: Option<&WeightedIndex<f64>>,
    quota: u32,
    deadline: Option<Instant>,
    budget: &MonteCarloBudget,
    rng: &mut StdRng,
) -> Tally {
    let mut tally = Tally::default();
    for trial in 0..quota {
        if trial % CHECK_INTERVAL == 0 {
            let expired = deadline.is_some_and(|d| Instant::now() >= d);
            if expired || budget.is_cancelled() {
                tally.stopped_early = true;
                break;
            }
        }
        let index = match picker {
            Some(picker) => picker.sample(rng),
            None => rng.gen_range(0..scenarios.len()),
        };
        let edge = sample_edge(&scenarios[index], rng);
        tally.trials += 1;
        tally.sum += edge;
        tally.sum_sq += edge * edge;
    }
    tally
}

fn sample_edge<R: Rng + ?Sized>(scenario: &BurnScenario, rng: &mut R) -> f64 {
    scenario
        .estimates()
        .iter()
        .filter(|estimate| rng.r#gen::<f64>() < estimate.probability)
        .map(|estimate| estimate.confidence * signed_card_weight(estimate.card))
        .sum()
}
