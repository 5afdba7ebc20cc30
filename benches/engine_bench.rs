//! Criterion benchmarks for the pure hot paths of the engine.
//!
//! Run with:
//!   cargo bench
//!
//! Covers:
//!   - XP formula evaluation
//!   - Incremental running mean
//!   - Difficulty rating derivation

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizcore::analytics::{difficulty_rating, incremental_mean};
use quizcore::model::{Difficulty, QuizMode};
use quizcore::progression::compute_xp;

fn bench_compute_xp(c: &mut Criterion) {
    c.bench_function("xp_perfect_practice", |b| {
        b.iter(|| {
            compute_xp(
                black_box(5),
                black_box(5),
                black_box(50),
                QuizMode::Practice,
                Difficulty::Medium,
                black_box(0),
            )
        });
    });

    c.bench_function("xp_streaked_hard_test", |b| {
        b.iter(|| {
            compute_xp(
                black_box(18),
                black_box(20),
                black_box(240),
                QuizMode::Test,
                Difficulty::Hard,
                black_box(12),
            )
        });
    });
}

fn bench_incremental_mean(c: &mut Criterion) {
    let scores: Vec<f64> = (0..100).map(|i| (i * 37 % 101) as f64).collect();
    c.bench_function("incremental_mean_100_steps", |b| {
        b.iter(|| {
            let mut avg = 0.0;
            for (i, s) in scores.iter().enumerate() {
                avg = incremental_mean(avg, black_box(*s), (i + 1) as u64);
            }
            black_box(avg)
        });
    });
}

fn bench_difficulty_rating(c: &mut Criterion) {
    c.bench_function("difficulty_rating", |b| {
        b.iter(|| difficulty_rating(black_box(37), black_box(112)));
    });
}

criterion_group!(
    benches,
    bench_compute_xp,
    bench_incremental_mean,
    bench_difficulty_rating
);
criterion_main!(benches);
