use burnscope_core::engine::{AnalysisInput, BurnEngine};
use burnscope_core::evidence::{DealerTellEvidence, QualitativeEvidence, Reliability, TellKind};
use burnscope_core::model::history::{HandRecord, Outcome};
use burnscope_core::model::rank::Rank;
use burnscope_core::model::shoe::Shoe;
use burnscope_core::monte_carlo::MonteCarloBudget;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn input_for(seed: u64, hands: usize) -> AnalysisInput {
    let mut shoe = Shoe::shuffled_with_seed(8, seed);
    let mut history = Vec::with_capacity(hands);
    for i in 0..hands {
        let (Some(p1), Some(b1), Some(p2), Some(b2)) =
            (shoe.draw(), shoe.draw(), shoe.draw(), shoe.draw())
        else {
            break;
        };
        let outcome = if i % 2 == 0 { Outcome::Banker } else { Outcome::Player };
        history.push(HandRecord::new(vec![p1, p2], vec![b1, b2], outcome));
    }
    AnalysisInput {
        penetration: 1.0 - shoe.len() as f64 / 416.0,
        shoe: shoe.composition(),
        history,
        tells: vec![
            DealerTellEvidence::new(TellKind::Hesitation, 0.7, Reliability::Medium)
                .with_rank(Rank::Queen),
        ],
        ..AnalysisInput::default()
    }
}

fn analyze_bench(c: &mut Criterion) {
    let engine = BurnEngine::default();
    let mut group = c.benchmark_group("analyze");
    for (seed, hands) in [(7u64, 0usize), (7, 30), (19, 60)] {
        let input = input_for(seed, hands);
        group.bench_function(format!("analyze_{seed}_{hands}"), |b| {
            b.iter(|| black_box(engine.analyze(black_box(&input))))
        });
    }
    let analysis = engine.analyze(&input_for(7, 30));
    let evidence = [QualitativeEvidence::dealer_tell(Rank::Queen)];
    group.bench_function("refine", |b| {
        b.iter(|| black_box(engine.refine(&analysis, &evidence)))
    });
    group.bench_function("monte_carlo_1000", |b| {
        let budget = MonteCarloBudget::trials(1_000);
        b.iter(|| black_box(engine.refine_with_monte_carlo(&analysis, &budget)))
    });
    group.finish();
}

criterion_group!(benches, analyze_bench);
criterion_main!(benches);
