//! Ordering and read-after-write guarantees under concurrent recording.

mod common;

use common::{extra, ClickKeys, TestGlean};
use glean_events::metrics::{CommonMetricData, EventMetric};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_threads_keep_per_thread_order() {
    const THREADS: usize = 4;
    const PER_THREAD: usize = 100;

    let harness = TestGlean::new();
    let click: Arc<EventMetric<ClickKeys>> = Arc::new(EventMetric::new(
        &harness.glean,
        CommonMetricData::new("ui", "click", "metrics"),
    ));

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let click = Arc::clone(&click);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    let screen = format!("thread-{}", t);
                    let button = i.to_string();
                    click.record(Some(extra([
                        (ClickKeys::Screen, screen.as_str()),
                        (ClickKeys::Button, button.as_str()),
                    ])));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let events = click.test_get_value(&harness.ctx, None).unwrap();
    assert_eq!(events.len(), THREADS * PER_THREAD);

    // Interleaving across threads is arbitrary; order within a thread is not.
    let mut next_index: HashMap<String, usize> = HashMap::new();
    for event in &events {
        let extra = event.extra.as_ref().unwrap();
        let expected = next_index.entry(extra["screen"].clone()).or_insert(0);
        assert_eq!(extra["button"], expected.to_string());
        *expected += 1;
    }
    assert!(next_index.values().all(|count| *count == PER_THREAD));
}

#[test]
fn test_read_after_write_from_another_thread() {
    let harness = TestGlean::new();
    let glean = harness.glean.clone();

    let recorder = thread::spawn(move || {
        let launch: EventMetric =
            EventMetric::new(&glean, CommonMetricData::new("app", "launch", "metrics"));
        for _ in 0..10 {
            launch.record(None);
        }
        launch
    });
    let launch = recorder.join().unwrap();

    // The join establishes happens-before, so draining must observe all ten.
    let events = launch.test_get_value(&harness.ctx, None).unwrap();
    assert_eq!(events.len(), 10);
}

#[test]
fn test_every_launched_task_executes() {
    let harness = TestGlean::new();
    let click: EventMetric<ClickKeys> =
        EventMetric::new(&harness.glean, CommonMetricData::new("ui", "click", "metrics"));

    for _ in 0..25 {
        click.record(None);
    }
    click.test_has_value(&harness.ctx, None).unwrap();

    let stats = harness.glean.dispatcher().stats();
    assert_eq!(stats.launched, 25);
    assert_eq!(stats.executed, 25);
    assert_eq!(stats.dropped, 0);
}
