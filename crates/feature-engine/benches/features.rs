use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::{compute_features, FeatureEngineer, FeatureSchema, OperatingSample};

fn bench_features(c: &mut Criterion) {
    let sample = OperatingSample {
        torque_nm: 62.5,
        rotational_speed_rpm: 2450,
        tool_wear_min: 180,
        ..Default::default()
    };

    c.bench_function("compute_features", |b| {
        b.iter(|| compute_features(black_box(&sample)))
    });

    let engineer = FeatureEngineer::new(FeatureSchema::extended());
    c.bench_function("compute_extended_row", |b| {
        b.iter(|| engineer.compute(black_box(&sample)))
    });
}

criterion_group!(benches, bench_features);
criterion_main!(benches);
