use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use medoids::{
    algorithms::{Clara, KMedoids, SampleSize, Strategy},
    measure::matrix::DissimilarityMatrix,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn l2_norm(a: &(f64, f64), b: &(f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn generate_points(num_clusters: usize, num_elements: usize) -> Vec<(f64, f64)> {
    let mut rng = ChaCha8Rng::seed_from_u64(num_elements as u64);
    let centers: Vec<(f64, f64)> = (0..num_clusters)
        .map(|_| (rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0)))
        .collect();

    (0..num_elements)
        .map(|i| {
            let (cx, cy) = centers[i % num_clusters];
            (cx + rng.gen_range(-5.0..5.0), cy + rng.gen_range(-5.0..5.0))
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("algorithms");
    group.warm_up_time(Duration::from_secs_f64(0.5));
    group.measurement_time(Duration::from_secs_f64(2.0));
    group.sample_size(10);

    let sizes = [
        ("tiny", 2, 4),
        ("small", 4, 32),
        ("medium", 8, 256),
        ("large", 16, 1024),
    ];

    macro_rules! bench_strategies {
        [$( $name:ident => $strategy:expr ),*] => {
            $(
                for &(size_name, num_clusters, num_elements) in &sizes {
                    let points = generate_points(num_clusters, num_elements);
                    let d = DissimilarityMatrix::from_points(&points, l2_norm).with_metric(true);
                    let kmedoids = KMedoids::new(num_clusters)
                        .expect("valid cluster count")
                        .with_strategy($strategy);
                    let benchmark_id = BenchmarkId::from_parameter(&format!(
                        "{}/{}(k={},n={})",
                        stringify!($name), size_name, num_clusters, num_elements
                    ));
                    group.bench_function(benchmark_id, |b| {
                        b.iter(|| black_box(kmedoids.fit(&d)))
                    });
                }
            )*
        }
    }

    bench_strategies![
        PAM => Strategy::pam(),
        FastPAM1 => Strategy::fast_pam1(),
        FastPAM => Strategy::default(),
        EagerPAM => Strategy::eager_pam(),
        FasterPAM => Strategy::faster_pam()
    ];

    let points = generate_points(16, 4096);
    let d = DissimilarityMatrix::from_points(&points, l2_norm).with_metric(true);
    let clara = Clara::new(KMedoids::new(16).expect("valid cluster count"))
        .with_sample_size(SampleSize::Absolute(512))
        .expect("valid sample size");
    group.bench_function(BenchmarkId::from_parameter("CLARA/huge(k=16,n=4096)"), |b| {
        b.iter(|| black_box(clara.fit(&d)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
