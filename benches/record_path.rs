//! RECORD PATH BENCHMARKS
//!
//! The synchronous part of `record` runs on application threads, often the
//! UI thread: gate check, timestamp, encoding and enqueue.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glean_events::core::ConfigBuilder;
use glean_events::metrics::{CommonMetricData, EventMetric};
use glean_events::Glean;
use std::collections::HashMap;

glean_events::extra_keys! {
    enum ClickKeys {
        Button => "button",
        Screen => "screen",
    }
}

fn bench_gated_off(c: &mut Criterion) {
    let glean = Glean::in_memory(ConfigBuilder::new().build().unwrap()).unwrap();
    // Never initialized: every call stops at the gate.
    let click: EventMetric<ClickKeys> =
        EventMetric::new(&glean, CommonMetricData::new("ui", "click", "metrics"));

    c.bench_function("record_gated_off", |b| {
        b.iter(|| click.record(black_box(None)));
    });
}

fn bench_record_with_extras(c: &mut Criterion) {
    let glean = Glean::in_memory(ConfigBuilder::new().build().unwrap()).unwrap();
    glean.initialize();
    let click: EventMetric<ClickKeys> =
        EventMetric::new(&glean, CommonMetricData::new("ui", "click", "metrics"));

    let mut group = c.benchmark_group("record_enqueue");
    group.bench_function("no_extras", |b| {
        b.iter(|| click.record(black_box(None)));
    });
    group.bench_function("two_extras", |b| {
        b.iter(|| {
            let extra = HashMap::from([
                (ClickKeys::Button, "ok".to_string()),
                (ClickKeys::Screen, "home".to_string()),
            ]);
            click.record(black_box(Some(extra)));
        });
    });
    group.finish();

    glean.shutdown().unwrap();
}

criterion_group!(benches, bench_gated_off, bench_record_with_extras);
criterion_main!(benches);
