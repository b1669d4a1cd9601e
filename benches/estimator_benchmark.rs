use std::f64::consts::PI;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use freq_estimation::{
    detector::internals::{autocorrelation_direct, autocorrelation_fft},
    freq_from_autocorr, freq_from_crossings, freq_from_fft, freq_from_hps, freq_from_voiced,
    utils::peak::parabolic,
};

pub fn utils_benchmark(c: &mut Criterion) {
    let v = (0..1024)
        .map(|v| ((v as f64) / PI / 30.).sin())
        .collect::<Vec<f64>>();
    let vv = v.as_slice();

    c.bench_function("parabolic", |b| {
        b.iter(|| parabolic(black_box(vv), black_box(148)).unwrap())
    });

    c.bench_function("autocorrelation_fft", |b| {
        b.iter(|| autocorrelation_fft(black_box(vv)).unwrap())
    });

    c.bench_function("autocorrelation_direct", |b| {
        b.iter(|| autocorrelation_direct(black_box(vv)).unwrap())
    });
}

pub fn estimator_benchmark(c: &mut Criterion) {
    const SAMPLE_RATE: f64 = 44100.0;
    const SIZE: usize = 4096;

    // Signal coming from some source (microphone, generated, etc...)
    let dt = 1.0 / SAMPLE_RATE;
    let freq = 300.0;
    let signal: Vec<f64> = (0..SIZE)
        .map(|x| (2.0 * PI * x as f64 * dt * freq).sin())
        .collect();
    let harmonic: Vec<f64> = (0..SIZE)
        .map(|x| {
            (1..=5)
                .map(|h| (2.0 * PI * x as f64 * dt * freq * h as f64).sin() / h as f64)
                .sum::<f64>()
        })
        .collect();

    c.bench_function("freq_from_crossings", |b| {
        b.iter(|| freq_from_crossings(black_box(&signal), SAMPLE_RATE, "linear").unwrap())
    });

    c.bench_function("freq_from_fft", |b| {
        b.iter(|| freq_from_fft(black_box(&signal), SAMPLE_RATE).unwrap())
    });

    c.bench_function("freq_from_autocorr", |b| {
        b.iter(|| freq_from_autocorr(black_box(&signal), SAMPLE_RATE).unwrap())
    });

    c.bench_function("freq_from_hps", |b| {
        b.iter(|| freq_from_hps(black_box(&harmonic), SAMPLE_RATE))
    });

    c.bench_function("freq_from_voiced", |b| {
        b.iter(|| freq_from_voiced(black_box(&harmonic), SAMPLE_RATE).unwrap())
    });
}

criterion_group!(benches, estimator_benchmark, utils_benchmark);
criterion_main!(benches);
