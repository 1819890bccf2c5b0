use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use ordini::bank::CounterBank;
use ordini::discipline::Discipline;
use ordini::worker::WorkerGroup;

const NUM_THREADS: usize = 4;
const ITERATIONS_PER_THREAD: u64 = 100_000;

fn bench_disciplines(c: &mut Criterion) {
    let mut group = c.benchmark_group("counter_increment");

    for discipline in Discipline::ALL {
        group.bench_function(
            BenchmarkId::new(
                discipline.name(),
                format!("{}threads x {}iter", NUM_THREADS, ITERATIONS_PER_THREAD),
            ),
            |b| {
                b.iter(|| {
                    let bank = CounterBank::new(&[discipline]);
                    WorkerGroup::run(&bank, discipline, NUM_THREADS, ITERATIONS_PER_THREAD, false);
                    black_box(bank.load(discipline))
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_disciplines);
criterion_main!(benches);
