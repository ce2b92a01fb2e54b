use RustedPEMDAS::arithmetic::evaluator::evaluate_expression;
use RustedPEMDAS::arithmetic::problem::generate_problem;
use RustedPEMDAS::arithmetic::settings::QuizSettings;
use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

fn bench_generate_by_level(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate problem");
    for level in 1..=5 {
        let settings = QuizSettings::with_difficulty(level);
        let mut rng = StdRng::seed_from_u64(level as u64);
        group.bench_function(format!("level {}", level), |b| {
            b.iter(|| generate_problem(black_box(&settings), &mut rng))
        });
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    c.bench_function("evaluate expression", |b| {
        b.iter(|| evaluate_expression(black_box("√(9 + 7) × (5 - 2)^2 ÷ 4 + 6.5 - (-3)")))
    });
}

criterion_group!(benches, bench_generate_by_level, bench_evaluate);
criterion_main!(benches);
