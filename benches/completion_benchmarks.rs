use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use prodtrack_api::services::completion::{
    compute_completion, PlanSlot, ProductionPlan, RecordedOutput,
};
use prodtrack_api::services::derived::{apply_derived_fields, Measurements};

struct Entry {
    process: &'static str,
    actual_qty: String,
}

impl RecordedOutput for Entry {
    fn process(&self) -> &str {
        self.process
    }

    fn actual_qty(&self) -> &str {
        &self.actual_qty
    }
}

const PROCESSES: [&str; 6] = ["cut", "weld", "paint", "pack", "inspect", "ship"];

fn plan() -> ProductionPlan {
    ProductionPlan::new(
        "A",
        PROCESSES[..4]
            .iter()
            .map(|process| PlanSlot {
                process: process.to_string(),
                qty: 5_000,
            })
            .collect(),
    )
}

fn entries(count: usize) -> Vec<Entry> {
    (0..count)
        .map(|i| Entry {
            process: PROCESSES[i % PROCESSES.len()],
            actual_qty: if i % 17 == 0 {
                String::new()
            } else {
                format!("{}.{}", i % 300, i % 10)
            },
        })
        .collect()
}

fn completion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_completion");
    let plan = plan();

    for size in [100usize, 1_000, 10_000] {
        let records = entries(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| compute_completion(black_box(Some(&plan)), black_box(records)));
        });
    }

    group.finish();
}

fn derived_fields_benchmark(c: &mut Criterion) {
    let template = Measurements {
        adjustment_time: "30".into(),
        downtime_duration: "45".into(),
        single_time: "20".into(),
        total_weight: "105.5".into(),
        tare_weight: "5.5".into(),
        unit_weight: "0.1".into(),
        ..Default::default()
    };

    c.bench_function("apply_derived_fields", |b| {
        b.iter(|| {
            let mut values = template.clone();
            apply_derived_fields(black_box(&mut values), black_box(480));
            values
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(5));
    targets = completion_benchmark, derived_fields_benchmark
}
criterion_main!(benches);
