use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use fracstruct::fracvector::frac_math::ratio;
use fracstruct::phasediagram::PhaseDiagram;
use fracstruct::symmetries::Spacegroup;

/// Simple benchmark to verify the basic setup works
fn bench_quick_test(c: &mut Criterion) {
    let mut group = c.benchmark_group("quick_test");

    group.bench_function("spacegroup_from_hall", |b| {
        b.iter(|| Spacegroup::parse(black_box("-F 4 2 3")));
    });

    group.bench_function("spacegroup_from_number", |b| {
        b.iter(|| Spacegroup::from_number(black_box(225), None));
    });

    group.bench_function("binary_hull", |b| {
        b.iter(|| {
            let mut pd = PhaseDiagram::new();
            pd.add_phase_counts(&["A"], &[ratio(1, 1)], "A", Some(ratio(0, 1))).unwrap();
            pd.add_phase_counts(&["B"], &[ratio(1, 1)], "B", Some(ratio(0, 1))).unwrap();
            pd.add_phase_counts(&["A", "B"], &[ratio(1, 1), ratio(1, 1)], "AB", Some(ratio(-1, 1)))
                .unwrap();
            pd.add_phase_counts(&["A", "B"], &[ratio(2, 1), ratio(1, 1)], "A2B", Some(ratio(-1, 2)))
                .unwrap();
            black_box(pd.hull_indices().map(|h| h.len()))
        });
    });

    group.finish();
}

criterion_group!(quick_benches, bench_quick_test);
criterion_main!(quick_benches);
