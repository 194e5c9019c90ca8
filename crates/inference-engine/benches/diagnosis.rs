use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::{compute_features, FeatureSchema, OperatingSample};
use inference_engine::{ClassifierRegistry, FailureMode, FailurePredictor, LogisticClassifier};

fn bench_diagnosis(c: &mut Criterion) {
    let schema = FeatureSchema::extended();
    let registry = FailureMode::ALL.into_iter().enumerate().fold(
        ClassifierRegistry::new(schema.clone()),
        |registry, (i, mode)| {
            let coefficients = vec![0.001 * (i + 1) as f64; schema.len()];
            match LogisticClassifier::new(schema.clone(), coefficients, -3.0) {
                Ok(model) => registry.with(mode, Box::new(model)),
                Err(_) => registry,
            }
        },
    );

    let predictor = FailurePredictor::default();
    let sample = OperatingSample {
        torque_nm: 55.0,
        rotational_speed_rpm: 1800,
        tool_wear_min: 120,
        ..Default::default()
    };

    c.bench_function("diagnose_four_modes", |b| {
        b.iter(|| {
            let features = compute_features(black_box(&sample));
            predictor.diagnose(&features, Some(&registry))
        })
    });
}

criterion_group!(benches, bench_diagnosis);
criterion_main!(benches);
