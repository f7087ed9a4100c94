use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use triage_core::EstimatorKind;
use triage_training::preprocessing::{fit_scaler, transform};
use triage_training::{Dataset, Fit};

/// Fit cost of each estimator kind on the reference training split.
fn bench_fit(c: &mut Criterion) {
    let (train, _) = Dataset::reference().expect("reference").split(0.2, 42).expect("split");
    let scaler = fit_scaler(train.rows());
    let z = transform(&scaler, train.rows());

    let mut group = c.benchmark_group("fit");
    for kind in [EstimatorKind::Plain, EstimatorKind::Regularized] {
        group.bench_with_input(BenchmarkId::from_parameter(kind), &kind, |b, kind| {
            b.iter(|| kind.fit(black_box(&z), black_box(train.targets())).expect("fit"));
        });
    }
    group.finish();
}

/// Single-row scoring, the per-request cost of the service.
fn bench_predict_row(c: &mut Criterion) {
    let (train, test) = Dataset::reference().expect("reference").split(0.2, 42).expect("split");
    let scaler = fit_scaler(train.rows());
    let z = transform(&scaler, train.rows());
    let model = EstimatorKind::Plain.fit(&z, train.targets()).expect("fit");
    let pipeline = triage_core::Pipeline::new(scaler, model);
    let row = test.rows()[0].clone();

    c.bench_function("predict_row", |b| {
        b.iter(|| pipeline.predict_row(black_box(&row)));
    });
}

criterion_group!(benches, bench_fit, bench_predict_row);
criterion_main!(benches);
