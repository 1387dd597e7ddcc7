//! Benchmarks for window updates and amplitude evaluation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use head_pose_amplitude::{
    amplitude::{evaluate, AmplitudeEvaluator, Statistics},
    window::SampleWindow,
};

fn noisy_pitches(count: usize) -> Vec<f64> {
    // Simulating a nodding head with detector noise
    (0..count)
        .map(|i| {
            let t = i as f64 / 30.0;
            0.35 * (std::f64::consts::TAU * 0.5 * t).sin() + 0.02 * (rand::random::<f64>() - 0.5)
        })
        .collect()
}

fn benchmark_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("window");
    let pitches = noisy_pitches(300);

    for capacity in [5, 30, 120] {
        group.bench_with_input(BenchmarkId::new("push_300", capacity), &pitches, |b, data| {
            b.iter(|| {
                let mut window = SampleWindow::new(capacity).unwrap();
                for &pitch in data {
                    window.push(black_box(pitch)).unwrap();
                }
                black_box(window.len())
            });
        });

        let mut window = SampleWindow::new(capacity).unwrap();
        for &pitch in &pitches {
            window.push(pitch).unwrap();
        }

        group.bench_with_input(BenchmarkId::new("snapshot", capacity), &window, |b, window| {
            b.iter(|| black_box(window.snapshot()));
        });

        group.bench_with_input(BenchmarkId::new("tick", capacity), &window, |b, window| {
            let mut evaluator = AmplitudeEvaluator::new();
            b.iter(|| black_box(evaluator.tick(window)));
        });
    }

    group.finish();
}

fn benchmark_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for size in [5, 30, 120] {
        let samples = noisy_pitches(size);

        group.bench_with_input(BenchmarkId::new("range", size), &samples, |b, samples| {
            b.iter(|| black_box(evaluate(black_box(samples))));
        });

        group.bench_with_input(BenchmarkId::new("statistics", size), &samples, |b, samples| {
            b.iter(|| black_box(Statistics::from_samples(black_box(samples))));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_window, benchmark_evaluate);
criterion_main!(benches);
