//! Event metric: record occurrences with optional attributes.

use super::extra_keys::{EncodedExtra, ExtraKeys, NoExtraKeys};
use super::recorded_event::{decode_events, RecordedEvent};
use super::CommonMetricData;
use crate::core::{monotonic_millis, GleanError, Result};
use crate::glean::Glean;
use crate::native::NativeHandle;
use crate::testing::TestContext;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::trace;

/// An event metric whose attributes are keyed by `K`.
///
/// Declared once; [`EventMetric::record`] validates and dispatches, the
/// native store enforces limits.
pub struct EventMetric<K: ExtraKeys = NoExtraKeys> {
    glean: Glean,
    meta: Arc<CommonMetricData>,
    handle: NativeHandle,
    _keys: PhantomData<fn() -> K>,
}

impl<K: ExtraKeys> EventMetric<K> {
    /// Register the event with the native store.
    ///
    /// `K::ALLOWED_KEYS` is declared as the metric's allowed extra keys.
    pub fn new(glean: &Glean, meta: CommonMetricData) -> Self {
        let allowed_extra_keys = if K::ALLOWED_KEYS.is_empty() {
            None
        } else {
            Some(K::ALLOWED_KEYS)
        };
        let handle = glean
            .store()
            .create_event_metric(meta.definition(), allowed_extra_keys);

        Self {
            glean: glean.clone(),
            meta: Arc::new(meta),
            handle,
            _keys: PhantomData,
        }
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    pub fn meta(&self) -> &CommonMetricData {
        &self.meta
    }

    /// Record one occurrence of the event.
    ///
    /// The gate check and the timestamp happen on the calling thread; storing
    /// happens later on the dispatcher. Never blocks.
    pub fn record(&self, extra: Option<HashMap<K, String>>) {
        if !self.glean.should_record(self.handle) {
            trace!(metric = %self.meta.identifier(), "Event gated off; not recording");
            return;
        }

        // Captured now: the dispatcher may run this much later.
        let timestamp = monotonic_millis();
        let encoded = EncodedExtra::encode(extra);

        let store = Arc::clone(self.glean.store());
        let handle = self.handle;
        self.glean.dispatcher().launch(move || {
            store.record_event(handle, timestamp, &encoded.keys, &encoded.values);
        });
    }

    /// Whether any event is stored for this metric in `ping_name`
    /// (default: the first ping it is sent in).
    pub fn test_has_value(&self, ctx: &TestContext, ping_name: Option<&str>) -> Result<bool> {
        ctx.drain(&self.glean)?;
        let Some(ping) = self.meta.resolve_ping(ping_name) else {
            return Ok(false);
        };
        Ok(self.glean.store().event_test_has_value(self.handle, ping))
    }

    /// Stored events for this metric in `ping_name` (default: the first ping
    /// it is sent in), oldest first.
    ///
    /// Returns [`GleanError::NoValue`] when nothing is stored.
    pub fn test_get_value(
        &self,
        ctx: &TestContext,
        ping_name: Option<&str>,
    ) -> Result<Vec<RecordedEvent>> {
        ctx.drain(&self.glean)?;
        let identifier = self.meta.identifier();
        let Some(ping) = self.meta.resolve_ping(ping_name) else {
            return Err(GleanError::no_value(identifier, ""));
        };

        let json = self
            .glean
            .store()
            .event_test_get_value_as_json(self.handle, ping);
        decode_events(json.as_deref(), &identifier, ping)
    }
}

impl<K: ExtraKeys> std::fmt::Debug for EventMetric<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventMetric")
            .field("identifier", &self.meta.identifier())
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigBuilder;

    crate::extra_keys! {
        enum ClickKeys {
            Button => "button",
        }
    }

    fn test_glean() -> (Glean, TestContext) {
        let config = ConfigBuilder::new().testing_mode(true).build().unwrap();
        let glean = Glean::in_memory(config).unwrap();
        glean.initialize();
        let ctx = TestContext::acquire(&glean).unwrap();
        (glean, ctx)
    }

    #[test]
    fn test_record_then_read_back() {
        let (glean, ctx) = test_glean();
        let click: EventMetric<ClickKeys> =
            EventMetric::new(&glean, CommonMetricData::new("ui", "click", "metrics"));

        click.record(Some(HashMap::from([(ClickKeys::Button, "ok".to_string())])));

        let events = click.test_get_value(&ctx, None).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].identifier, "ui.click");
        assert_eq!(
            events[0].extra.as_ref().and_then(|e| e.get("button")).map(String::as_str),
            Some("ok")
        );
    }

    #[test]
    fn test_timestamp_is_captured_at_call_time() {
        let (glean, ctx) = test_glean();
        let event: EventMetric = EventMetric::new(&glean, CommonMetricData::new("app", "tick", "metrics"));

        // Keep the worker busy so the record task runs well after the call.
        glean
            .dispatcher()
            .launch(|| std::thread::sleep(std::time::Duration::from_millis(100)));
        let before = monotonic_millis();
        event.record(None);

        let events = event.test_get_value(&ctx, None).unwrap();
        assert!(events[0].timestamp < before + 100);
    }

    #[test]
    fn test_no_pings_means_no_value() {
        let (glean, ctx) = test_glean();
        let mut meta = CommonMetricData::new("ui", "orphan", "metrics");
        meta.send_in_pings.clear();
        let event: EventMetric = EventMetric::new(&glean, meta);

        event.record(None);

        assert!(!event.test_has_value(&ctx, None).unwrap());
        assert!(event.test_get_value(&ctx, None).unwrap_err().is_no_value());
    }
}
