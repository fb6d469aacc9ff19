use criterion::measurement::Measurement;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkGroup, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use rand::distr::{Distribution, Uniform};
use rand::{rngs::StdRng, SeedableRng};
use single_toolkit::{
    apply_permutation_in_place, build_permutation, sort_data_with, DataSet, Options,
    ParallelIndexSort, SortKey, SortOptions, SortOrder, StableIndexSort,
};
use std::time::Duration;

#[derive(Clone)]
pub struct SortConfig {
    seed: u64,
    shapes: Vec<(usize, usize)>,
    measurement_time: u64,
    sample_size: usize,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            shapes: vec![(1_000, 4), (10_000, 4), (100_000, 8), (1_000_000, 2)],
            measurement_time: 10,
            sample_size: 10,
        }
    }
}

fn create_test_data(rows: usize, cols: usize, seed: u64) -> DataSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let value_dist = Uniform::try_from(0.0..1.0).unwrap();
    let vector = Array1::from_shape_fn(rows, |_| value_dist.sample(&mut rng));
    let matrix = Array2::from_shape_fn((rows, cols), |_| value_dist.sample(&mut rng));
    DataSet::from_matrix(matrix).with_vector(vector).unwrap()
}

fn configure_group<'a, M: Measurement>(
    c: &'a mut Criterion<M>,
    name: &str,
    config: &SortConfig,
) -> BenchmarkGroup<'a, M> {
    let mut group = c.benchmark_group(name);
    group.measurement_time(Duration::from_secs(config.measurement_time));
    group.sample_size(config.sample_size);
    group
}

pub fn bench_sort_data(c: &mut Criterion) {
    let config = SortConfig::default();
    let options = Options::builder().verbose(0).build();
    let mut group = configure_group(c, "Sort_Data", &config);

    for &(rows, cols) in config.shapes.iter() {
        let seed = config.seed + (rows * cols) as u64;
        let data = create_test_data(rows, cols, seed);
        let label = format!("{}x{}", rows, cols);

        group.bench_with_input(BenchmarkId::new("ascending", &label), &data, |b, data| {
            b.iter_batched(
                || data.clone(),
                |mut d| {
                    let sort = SortOptions::by_column(0);
                    sort_data_with(Some(&mut d), &sort, &options, &StableIndexSort).unwrap();
                    d
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("descending", &label), &data, |b, data| {
            b.iter_batched(
                || data.clone(),
                |mut d| {
                    sort_data_with(
                        Some(&mut d),
                        &SortOptions::by_column(0).descending(),
                        &options,
                        &StableIndexSort,
                    )
                    .unwrap();
                    d
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("parallel", &label), &data, |b, data| {
            b.iter_batched(
                || data.clone(),
                |mut d| {
                    let sort = SortOptions::by_vector();
                    sort_data_with(Some(&mut d), &sort, &options, &ParallelIndexSort).unwrap();
                    d
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

pub fn bench_permutation(c: &mut Criterion) {
    let config = SortConfig::default();
    let mut group = configure_group(c, "Permutation", &config);

    for &(rows, cols) in config.shapes.iter() {
        let seed = config.seed + (rows * cols) as u64;
        let data = create_test_data(rows, cols, seed);
        let perm = build_permutation(
            &data,
            SortKey::Column(0),
            SortOrder::Ascending,
            &StableIndexSort,
        )
        .unwrap();
        let label = format!("{}x{}", rows, cols);

        group.bench_with_input(BenchmarkId::new("build", &label), &data, |b, data| {
            b.iter(|| {
                build_permutation(data, SortKey::Column(0), SortOrder::Ascending, &StableIndexSort)
                    .unwrap()
            });
        });

        group.bench_with_input(BenchmarkId::new("apply_in_place", &label), &data, |b, data| {
            b.iter_batched(
                || data.clone(),
                |mut d| {
                    apply_permutation_in_place(&mut d, &perm).unwrap();
                    d
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(sort_benches, bench_sort_data, bench_permutation);
criterion_main!(sort_benches);
