//! Impulse conversion benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lib_dsp::impulse::{s21_to_impulse, ConversionConfig, InverseMethod};
use lib_types::{Complex64, Hertz, Measurement};

fn synthetic_sweep(points: usize) -> Measurement {
    let df = 1e6;
    let center = points as f64 * df / 2.0;
    Measurement::from_points((1..=points).map(|i| {
        let f = i as f64 * df;
        let mag = (-((f - center) / (0.1 * center)).powi(2)).exp();
        (Hertz(f), Complex64::from_polar(mag, -2.0 * std::f64::consts::PI * f * 5e-8))
    }))
}

fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("s21_to_impulse");

    for points in [201usize, 801, 1601, 6401].iter() {
        let sweep = synthetic_sweep(*points);

        for method in [InverseMethod::Complex, InverseMethod::HalfSpectrum] {
            let config = ConversionConfig {
                method,
                ..Default::default()
            };
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", method), points),
                &(&sweep, &config),
                |b, (s, cfg)| {
                    b.iter(|| s21_to_impulse(black_box(s), black_box(cfg)));
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_conversion);
criterion_main!(benches);
