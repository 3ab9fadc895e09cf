//! Rollout and batch throughput.
//!
//! Run with: cargo bench --bench rollout

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::{SeedableRng, rngs::StdRng};

use tcl_sim::model::ThermalModel;
use tcl_sim::sim::batch::{BatchRunner, ExecutionMode, TrialSampler, checksum};
use tcl_sim::sim::rollout::RolloutEngine;
use tcl_sim::sim::types::HORIZON;

fn bench_single_rollout(c: &mut Criterion) {
    let model = ThermalModel::new(1200, 2100).expect("reference model");
    let engine = RolloutEngine::default();
    let mut rng = StdRng::seed_from_u64(7);
    let trial = TrialSampler::for_horizon(HORIZON).sample(&mut rng);

    c.bench_function("rollout_day", |b| {
        b.iter(|| {
            engine
                .run(&model, black_box(trial.t_start), black_box(&trial.schedule))
                .expect("rollout")
        })
    });
}

fn bench_batch(c: &mut Criterion) {
    let model = ThermalModel::new(1200, 2100).expect("reference model");
    let runner = BatchRunner::new(model, RolloutEngine::default());

    let mut group = c.benchmark_group("batch");
    group.sample_size(20);
    for mode in ExecutionMode::ALL {
        group.bench_with_input(BenchmarkId::new(mode.as_str(), 2000), &mode, |b, &mode| {
            let runner = runner.with_mode(mode);
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(74_329_834_795);
                let rewards = runner.run(2000, &mut rng).expect("batch");
                checksum(&rewards)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_rollout, bench_batch);
criterion_main!(benches);
