use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use fracstruct::fracvector::frac_math::{frac_cos, frac_sqrt, ratio, string_to_fraction};
use fracstruct::fracvector::FracVector;
use fracstruct::supercell::{build_supercell, cubic_supercell_transformation};

/// Exact linear algebra, string parsing and supercell construction.
/// - cargo bench --bench fracvector_benchmark
/// - cargo bench --bench fracvector_benchmark --features parallel
fn bench_linear_algebra(c: &mut Criterion) {
    let mut group = c.benchmark_group("fracvector_linear_algebra");

    let m = FracVector::create([[2, 3, 5], [3, 2, 3], [9, 5, 7]]).unwrap();
    let fcc = FracVector::create([["0", "1/2", "1/2"], ["1/2", "0", "1/2"], ["1/2", "1/2", "0"]]).unwrap();

    group.bench_function("det_3x3", |b| {
        b.iter(|| black_box(&m).det());
    });

    group.bench_function("inv_3x3", |b| {
        b.iter(|| black_box(&m).inv());
    });

    group.bench_function("matmul_fcc", |b| {
        b.iter(|| black_box(&fcc).mul(black_box(&m)));
    });

    group.finish();
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("fracvector_parsing");

    for text in ["0.33342(10)", "0.3333", "1/3", "-12.5e-3"] {
        group.bench_with_input(BenchmarkId::new("string_to_fraction", text), &text, |b, text| {
            b.iter(|| string_to_fraction(black_box(text), None));
        });
    }

    group.bench_function("create_nested_strings", |b| {
        b.iter(|| FracVector::create(black_box([["0.25", "1/3", "0.5(1)"], ["1", "2", "3"]])));
    });

    group.finish();
}

fn bench_transcendentals(c: &mut Criterion) {
    let mut group = c.benchmark_group("fracvector_transcendentals");
    let prec = ratio(1, 10_000_000_000);

    group.bench_function("sqrt_2", |b| {
        b.iter(|| frac_sqrt(black_box(&ratio(2, 1)), &prec));
    });

    group.bench_function("cos_60_degrees", |b| {
        b.iter(|| frac_cos(black_box(&ratio(60, 1)), &prec, true));
    });

    group.finish();
}

fn bench_supercells(c: &mut Criterion) {
    let mut group = c.benchmark_group("supercells");
    group.sample_size(20);

    let fcc = FracVector::create([["0", "1/2", "1/2"], ["1/2", "0", "1/2"], ["1/2", "1/2", "0"]]).unwrap();
    let groups = vec![
        FracVector::create([[0, 0, 0]]).unwrap(),
        FracVector::create([["1/2", "1/2", "1/2"]]).unwrap(),
    ];

    for n in [1, 2, 3] {
        let t = FracVector::eye(3).scale(&ratio(n, 1));
        group.bench_with_input(BenchmarkId::new("build_supercell_diagonal", n), &t, |b, t| {
            b.iter(|| build_supercell(black_box(&fcc), black_box(&groups), t, 20));
        });
    }

    group.bench_function("cubic_search_fcc", |b| {
        b.iter(|| cubic_supercell_transformation(black_box(&fcc), Some(20)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_linear_algebra,
    bench_parsing,
    bench_transcendentals,
    bench_supercells
);
criterion_main!(benches);
