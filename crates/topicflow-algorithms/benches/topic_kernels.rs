use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use topicflow_algorithms::{kmeans, project_2d, EmbeddingMatrix, KMeansConfig, PcaConfig};

/// Pseudo-embeddings with a little structure so k-means has work to do
fn synthetic_batch(rows: usize, dims: usize) -> Vec<Vec<f32>> {
    (0..rows)
        .map(|i| {
            (0..dims)
                .map(|j| (((i * 31 + j * 17) % 97) as f32 / 97.0) + (i % 4) as f32)
                .collect()
        })
        .collect()
}

/// Benchmark 2D projection over typical conversation sizes
fn bench_pca(c: &mut Criterion) {
    let mut group = c.benchmark_group("pca_project_2d");

    for rows in [10, 50, 200].iter() {
        let matrix = EmbeddingMatrix::from_rows(&synthetic_batch(*rows, 384)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(rows), rows, |b, _| {
            b.iter(|| {
                let points = project_2d(&matrix, &PcaConfig::default());
                criterion::black_box(points.len());
            });
        });
    }
    group.finish();
}

/// Benchmark k-means with the default restart count
fn bench_kmeans(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans");

    for rows in [10, 50, 200].iter() {
        let matrix = EmbeddingMatrix::from_rows(&synthetic_batch(*rows, 384)).unwrap();
        let config = KMeansConfig::new(5);
        group.bench_with_input(BenchmarkId::from_parameter(rows), rows, |b, _| {
            b.iter(|| {
                let result = kmeans(&matrix, &config);
                criterion::black_box(result.inertia);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pca, bench_kmeans);
criterion_main!(benches);
