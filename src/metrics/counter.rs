//! Counter metric.

use super::CommonMetricData;
use crate::core::{GleanError, Result};
use crate::glean::Glean;
use crate::native::NativeHandle;
use crate::testing::TestContext;
use std::sync::Arc;
use tracing::trace;

/// A monotonically increasing count.
pub struct CounterMetric {
    glean: Glean,
    meta: Arc<CommonMetricData>,
    handle: NativeHandle,
}

impl CounterMetric {
    /// Register the counter with the native store.
    pub fn new(glean: &Glean, meta: CommonMetricData) -> Self {
        let handle = glean.store().create_counter_metric(meta.definition());
        Self {
            glean: glean.clone(),
            meta: Arc::new(meta),
            handle,
        }
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    pub fn meta(&self) -> &CommonMetricData {
        &self.meta
    }

    /// Increase the counter by `amount`. Non-positive amounts are reported
    /// by the store as an `invalid_value` error.
    pub fn add(&self, amount: i32) {
        if !self.glean.should_record(self.handle) {
            trace!(metric = %self.meta.identifier(), "Counter gated off; not recording");
            return;
        }

        let store = Arc::clone(self.glean.store());
        let handle = self.handle;
        self.glean
            .dispatcher()
            .launch(move || store.add_to_counter(handle, amount));
    }

    pub fn test_has_value(&self, ctx: &TestContext, ping_name: Option<&str>) -> Result<bool> {
        match self.test_get_value(ctx, ping_name) {
            Ok(_) => Ok(true),
            Err(e) if e.is_no_value() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Current value in `ping_name` (default: the first ping it is sent in).
    ///
    /// Returns [`GleanError::NoValue`] when nothing is stored.
    pub fn test_get_value(&self, ctx: &TestContext, ping_name: Option<&str>) -> Result<i32> {
        ctx.drain(&self.glean)?;
        let identifier = self.meta.identifier();
        let Some(ping) = self.meta.resolve_ping(ping_name) else {
            return Err(GleanError::no_value(identifier, ""));
        };

        self.glean
            .store()
            .counter_test_get_value(self.handle, ping)
            .ok_or_else(|| GleanError::no_value(identifier, ping))
    }
}

impl std::fmt::Debug for CounterMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterMetric")
            .field("identifier", &self.meta.identifier())
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigBuilder;

    #[test]
    fn test_add_accumulates() {
        let config = ConfigBuilder::new().testing_mode(true).build().unwrap();
        let glean = Glean::in_memory(config).unwrap();
        glean.initialize();
        let ctx = TestContext::acquire(&glean).unwrap();
        let counter = CounterMetric::new(&glean, CommonMetricData::new("net", "retries", "metrics"));

        assert!(!counter.test_has_value(&ctx, None).unwrap());
        counter.add(2);
        counter.add(3);

        assert_eq!(counter.test_get_value(&ctx, None).unwrap(), 5);
        assert!(counter.test_has_value(&ctx, Some("metrics")).unwrap());
    }

    #[test]
    fn test_uninitialized_counter_stays_empty() {
        let config = ConfigBuilder::new().testing_mode(true).build().unwrap();
        let glean = Glean::in_memory(config).unwrap();
        let ctx = TestContext::acquire(&glean).unwrap();
        let counter = CounterMetric::new(&glean, CommonMetricData::new("net", "retries", "metrics"));

        counter.add(1);

        assert!(counter.test_get_value(&ctx, None).unwrap_err().is_no_value());
    }
}
