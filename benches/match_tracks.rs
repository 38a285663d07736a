//! Benchmarks for the track matcher.
//!
//! ```text
//! cargo bench --bench match_tracks
//! cargo bench match_tracks -- match_tracks/bs2000
//! ```
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hifitime::Duration;

use polarlows::{
    matching::{match_tracks, MatchConfig},
    time::compact_date_to_epoch,
    Fix, Track,
};

/// `n` tracks of 12 hourly fixes, starting every 3 h, drifting north-east from a
/// deterministic grid of origins.
fn synthetic_tracks(n: usize, lon_shift: f64) -> Vec<Track> {
    let t0 = compact_date_to_epoch("200901010000").unwrap();
    (0..n)
        .map(|i| {
            let start = t0 + Duration::from_hours(3.0 * (i % 40) as f64);
            let (lon0, lat0) = (-20.0 + (i * 7 % 70) as f64 + lon_shift, 66.0 + (i % 15) as f64);
            let fixes: Vec<Fix> = (0..12)
                .map(|k| {
                    Fix::new(
                        start + Duration::from_hours(k as f64),
                        lon0 + 0.3 * k as f64,
                        lat0 + 0.2 * k as f64,
                        0,
                    )
                })
                .collect();
            Track::new(i as u32, fixes).unwrap()
        })
        .collect()
}

fn bench_match_tracks(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_tracks");

    for n in [50usize, 200, 800] {
        let candidates = synthetic_tracks(n, 0.0);
        let references = synthetic_tracks(n / 2, 0.5);
        group.throughput(Throughput::Elements((n * n / 2) as u64));

        for config in [
            MatchConfig::Simple { thresh_dist: 200.0 },
            MatchConfig::Bs2000 { beta: 25.0 },
        ] {
            group.bench_with_input(BenchmarkId::new(config.method(), n), &n, |b, _| {
                b.iter(|| {
                    match_tracks(black_box(&candidates), black_box(&references), &config).unwrap()
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_match_tracks);
criterion_main!(benches);
