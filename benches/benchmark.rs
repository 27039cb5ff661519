use criterion::{criterion_group, criterion_main, Criterion};
use huginn_minutiae::minutiae::wrap_angle;
use huginn_minutiae::{
    CandidateRecord, DetectionResult, ExtractionConfig, Frame, IdentificationSearch, Minutia,
    MinutiaExtractor, MinutiaKind, MinutiaeMatcher, PixelMatrix, RegionExecutor,
};
use std::hint::black_box;
use std::time::Duration;

/// Number of enrolled candidates for the identification benchmark
const GALLERY_SIZE: usize = 200;

/// Concentric dark rings with a few breaks, roughly the ridge spacing of a 500 dpi scan.
fn synthetic_fingerprint(size: usize) -> PixelMatrix {
    let mut m = PixelMatrix::filled(size, size, 255.0);
    let c = size as f64 / 2.0;
    for y in 0..size {
        for x in 0..size {
            let (dx, dy) = (x as f64 - c, y as f64 - c);
            let r = dx.hypot(dy);
            let broken = (dy.atan2(dx) * 5.0).sin() > 0.97;
            if r % 9.0 < 3.5 && !broken {
                m.set(x, y, 20.0);
            }
        }
    }
    m
}

fn pseudo_random_features(seed: u64, count: usize) -> DetectionResult {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as u32
    };
    let minutiae = (0..count)
        .map(|_| {
            let x = (next() % 400) as i32;
            let y = (next() % 400) as i32;
            let angle = wrap_angle(f64::from(next() % 6283) / 1000.0);
            let kind = if next() % 2 == 0 { MinutiaKind::RidgeEnding } else { MinutiaKind::Bifurcation };
            Minutia::new(x, y, angle, kind)
        })
        .collect();
    DetectionResult::new(Frame::new(0, 0, 400, 400), minutiae)
}

fn bench_extraction(c: &mut Criterion) {
    let image = synthetic_fingerprint(256);

    let mut group = c.benchmark_group("extraction");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(20));
    for granularity in [1, 4, 0] {
        let extractor =
            MinutiaExtractor::new(ExtractionConfig::default(), RegionExecutor::new(granularity));
        group.bench_function(format!("extract_256px_granularity_{granularity}"), |b| {
            b.iter(|| {
                let _ = black_box(extractor.extract(black_box(&image)));
            })
        });
    }
    group.finish();
}

fn bench_matching(c: &mut Criterion) {
    let probe = pseudo_random_features(1, 40);
    let candidate = pseudo_random_features(2, 40);
    let matcher = MinutiaeMatcher::default();

    let mut group = c.benchmark_group("matching");
    group.bench_function("match_40x40_unrelated", |b| {
        b.iter(|| black_box(matcher.match_features(black_box(&probe), black_box(&candidate))))
    });
    group.bench_function("match_40x40_self", |b| {
        b.iter(|| black_box(matcher.match_features(black_box(&probe), black_box(&probe))))
    });
    group.finish();
}

fn bench_identification(c: &mut Criterion) {
    let probe = pseudo_random_features(7, 35);
    let candidates: Vec<CandidateRecord> = (0..GALLERY_SIZE as u64)
        .map(|seed| CandidateRecord::new(format!("c{seed}"), pseudo_random_features(seed + 100, 35)))
        .collect();

    let mut group = c.benchmark_group("identification");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(30));
    for workers in [1, 4, 0] {
        let search = IdentificationSearch::new(MinutiaeMatcher::default(), workers);
        group.bench_function(format!("identify_{GALLERY_SIZE}_workers_{workers}"), |b| {
            b.iter(|| {
                let _ = black_box(search.identify(black_box(&probe), black_box(&candidates)));
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_extraction, bench_matching, bench_identification);
criterion_main!(benches);
