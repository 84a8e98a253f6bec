use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use revgeo::{Coordinate, ExecutionMode, Geocoder, Place, PrecisionTier, ReferenceStore};

fn reference_places(n: usize) -> Vec<Place> {
    let mut state = 0x9e37_79b9_7f4a_7c15u64;
    (0..n)
        .map(|i| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let lat = (state >> 11) as f64 / (1u64 << 53) as f64 * 180.0 - 90.0;
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let lon = (state >> 11) as f64 / (1u64 << 53) as f64 * 360.0 - 180.0;
            Place::new(Coordinate::new(lat, lon)).with_attribute("id", Some(i.to_string()))
        })
        .collect()
}

fn query_batch(n: usize) -> Vec<Coordinate> {
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            Coordinate::new(t * 170.0 - 85.0, (t * 7919.0) % 360.0 - 180.0)
        })
        .collect()
}

fn build(mode: ExecutionMode, workers: usize) -> Geocoder {
    let store = ReferenceStore::new(reference_places(100_000), None);
    Geocoder::build(store, PrecisionTier::Fine, mode, workers).unwrap()
}

fn bench_batch_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_sizes");

    let sequential = build(ExecutionMode::Sequential, 1);
    let parallel = build(ExecutionMode::Parallel, 4);

    for size in [1, 100, 10_000, 100_000].iter() {
        let batch = query_batch(*size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("sequential", size), &batch, |b, batch| {
            b.iter(|| sequential.query(black_box(batch)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("parallel_4", size), &batch, |b, batch| {
            b.iter(|| parallel.query(black_box(batch)).unwrap())
        });
    }

    group.finish();
}

fn bench_worker_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("worker_counts");
    let batch = query_batch(50_000);
    group.throughput(Throughput::Elements(batch.len() as u64));

    for workers in [1, 2, 4, 8].iter() {
        let geocoder = build(ExecutionMode::Parallel, *workers);
        group.bench_with_input(BenchmarkId::from_parameter(workers), &batch, |b, batch| {
            b.iter(|| geocoder.query(black_box(batch)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_batch_sizes, bench_worker_counts);
criterion_main!(benches);
