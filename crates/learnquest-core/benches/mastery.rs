use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use learnquest_core::mastery::analyze;
use learnquest_core::model::{AttemptRecord, Difficulty, LearnerProfile};

fn make_log(len: usize, concepts: usize) -> Vec<AttemptRecord> {
    (0..len)
        .map(|i| AttemptRecord {
            level_id: (i % 12) as u32 + 1,
            question_index: i % 5,
            is_correct: i % 3 != 0,
            concept: format!("concept-{}", i % concepts),
            difficulty: Difficulty::Beginner,
            timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap(),
        })
        .collect()
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_weaknesses");

    let small = make_log(50, 5);
    group.bench_function("50 attempts, 5 concepts", |b| {
        b.iter(|| analyze(black_box(&small)))
    });

    let full = make_log(1000, 20);
    group.bench_function("1000 attempts, 20 concepts", |b| {
        b.iter(|| analyze(black_box(&full)))
    });

    let wide = make_log(1000, 400);
    group.bench_function("1000 attempts, 400 concepts", |b| {
        b.iter(|| analyze(black_box(&wide)))
    });

    group.finish();
}

fn bench_push_attempt(c: &mut Criterion) {
    let mut group = c.benchmark_group("attempt_log");
    let log = make_log(1000, 20);

    group.bench_function("push into full log", |b| {
        let mut profile = LearnerProfile {
            attempt_log: log.clone(),
            ..Default::default()
        };
        b.iter(|| profile.push_attempt(black_box(log[0].clone())))
    });

    group.finish();
}

criterion_group!(benches, bench_analyze, bench_push_attempt);
criterion_main!(benches);
