//! Common test utilities and fixtures.

// Each integration test binary uses a different subset of these helpers.
#![allow(dead_code)]

use glean_events::core::ConfigBuilder;
use glean_events::native::{InMemoryStore, NativeStore};
use glean_events::{Glean, TestContext};
use std::collections::HashMap;
use std::sync::Arc;

glean_events::extra_keys! {
    /// Attributes of the `ui.click` event.
    pub enum ClickKeys {
        Button => "button",
        Screen => "screen",
    }
}

/// Route library logs to the test writer. Safe to call from every test.
pub fn enable_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Build an owned extra map from `(key, value)` pairs.
pub fn extra<const N: usize>(pairs: [(ClickKeys, &str); N]) -> HashMap<ClickKeys, String> {
    pairs
        .into_iter()
        .map(|(key, value)| (key, value.to_string()))
        .collect()
}

/// A testing-mode Glean instance together with its store and test token.
pub struct TestGlean {
    pub glean: Glean,
    pub store: Arc<InMemoryStore>,
    pub ctx: TestContext,
}

impl TestGlean {
    /// Initialized instance, ready to record.
    pub fn new() -> Self {
        let harness = Self::uninitialized();
        harness.glean.initialize();
        harness
    }

    /// Instance whose recording gate is still closed.
    pub fn uninitialized() -> Self {
        enable_test_logging();
        let config = ConfigBuilder::new()
            .testing_mode(true)
            .thread_name("glean.dispatcher.test")
            .build()
            .unwrap();
        let store = Arc::new(InMemoryStore::new());
        let glean = Glean::new(config, Arc::clone(&store) as Arc<dyn NativeStore>).unwrap();
        let ctx = TestContext::acquire(&glean).unwrap();
        Self { glean, store, ctx }
    }
}
