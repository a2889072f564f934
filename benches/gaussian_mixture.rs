use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use em_clustering::{DataPoint, EmClustering};
use ndarray::Array1;
use ndarray_rand::rand::{Rng, SeedableRng};
use ndarray_rand::rand_distr::StandardNormal;
use rand_isaac::Isaac64Rng;

fn blobs(n_points: usize, n_features: usize, rng: &mut Isaac64Rng) -> Vec<DataPoint> {
    (0..n_points)
        .map(|i| {
            let center = if i % 2 == 0 { 5. } else { -5. };
            let attributes = Array1::from_iter(
                (0..n_features).map(|_| center + rng.sample::<f64, _>(StandardNormal)),
            );
            DataPoint::new(attributes, 2)
        })
        .collect()
}

fn gaussian_mixture_bench(c: &mut Criterion) {
    let mut rng = Isaac64Rng::seed_from_u64(40);
    let mut benchmark = c.benchmark_group("gaussian_mixture");
    for &n_points in &[100usize, 1000] {
        let points = blobs(n_points, 3, &mut rng);
        let fit_rng = Isaac64Rng::seed_from_u64(42);
        benchmark.bench_with_input(
            BenchmarkId::new("fit", n_points),
            &n_points,
            |bencher, _| {
                bencher.iter(|| {
                    black_box(
                        EmClustering::params_with_rng(2, fit_rng.clone())
                            .n_iterations(10)
                            .check()
                            .unwrap()
                            .fit(points.clone())
                            .expect("EM fitting fail"),
                    )
                })
            },
        );
    }
    benchmark.finish();
}

criterion_group!(benches, gaussian_mixture_bench);
criterion_main!(benches);
