//! In-memory native store.
//!
//! Metric definitions live in an append-only arena; a handle is the arena
//! index plus one. Values are keyed by `(ping, identifier)`. Validation
//! failures are counted as error counters under the `glean.error` category,
//! the same way the persistent store does it.

use super::{MetricDefinition, NativeHandle, NativeStore, INVALID_HANDLE};
use crate::metrics::Lifetime;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Longest extra value, in bytes, stored without truncation.
pub const MAX_LENGTH_EXTRA_KEY_VALUE: usize = 100;

/// Category under which validation errors are counted.
pub const ERROR_CATEGORY: &str = "glean.error";

/// Error kinds the store counts. Names are part of the storage format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    InvalidValue,
    InvalidLabel,
}

impl StoreErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [StoreErrorKind; 2] = [StoreErrorKind::InvalidValue, StoreErrorKind::InvalidLabel];

    /// Name used in the error counter identifier.
    pub const fn name(self) -> &'static str {
        match self {
            StoreErrorKind::InvalidValue => "invalid_value",
            StoreErrorKind::InvalidLabel => "invalid_label",
        }
    }
}

#[derive(Debug)]
enum MetricKind {
    Event { allowed_extra_keys: Vec<String> },
    Counter,
}

#[derive(Debug)]
struct StoredMetric {
    identifier: String,
    category: String,
    name: String,
    send_in_pings: Vec<String>,
    #[allow(dead_code)]
    lifetime: Lifetime,
    disabled: bool,
    kind: MetricKind,
}

#[derive(Debug, Clone, Serialize)]
struct StoredEvent {
    timestamp: u64,
    category: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<BTreeMap<String, String>>,
}

type StorageKey = (String, String);

/// Reference [`NativeStore`] keeping everything in memory.
pub struct InMemoryStore {
    metrics: RwLock<Vec<Arc<StoredMetric>>>,
    events: DashMap<StorageKey, Vec<StoredEvent>>,
    counters: DashMap<StorageKey, i32>,
    upload_enabled: AtomicBool,
}

impl InMemoryStore {
    /// Create an empty store with recording enabled.
    pub fn new() -> Self {
        Self {
            metrics: RwLock::new(Vec::new()),
            events: DashMap::new(),
            counters: DashMap::new(),
            upload_enabled: AtomicBool::new(true),
        }
    }

    /// Number of registered metric definitions.
    pub fn metric_count(&self) -> usize {
        self.metrics.read().len()
    }

    /// Drop every stored value, keeping the definitions.
    pub fn clear_values(&self) {
        self.events.clear();
        self.counters.clear();
    }

    fn register(&self, definition: MetricDefinition<'_>, kind: MetricKind) -> NativeHandle {
        let identifier = if definition.category.is_empty() {
            definition.name.to_string()
        } else {
            format!("{}.{}", definition.category, definition.name)
        };
        let metric = Arc::new(StoredMetric {
            identifier,
            category: definition.category.to_string(),
            name: definition.name.to_string(),
            send_in_pings: definition.send_in_pings.to_vec(),
            lifetime: definition.lifetime,
            disabled: definition.disabled,
            kind,
        });

        let mut metrics = self.metrics.write();
        metrics.push(Arc::clone(&metric));
        let handle = metrics.len() as NativeHandle;
        debug!(metric = %metric.identifier, handle, "Registered metric");
        handle
    }

    fn lookup(&self, handle: NativeHandle) -> Option<Arc<StoredMetric>> {
        if handle == INVALID_HANDLE {
            return None;
        }
        let index = usize::try_from(handle - 1).ok()?;
        self.metrics.read().get(index).cloned()
    }

    fn record_error(&self, metric: &StoredMetric, kind: StoreErrorKind, message: &str) {
        warn!(metric = %metric.identifier, error = kind.name(), "{}", message);

        let error_identifier = format!("{}.{}/{}", ERROR_CATEGORY, kind.name(), metric.identifier);
        for ping in &metric.send_in_pings {
            *self
                .counters
                .entry((ping.clone(), error_identifier.clone()))
                .or_insert(0) += 1;
        }
    }

    fn build_extra(
        &self,
        metric: &StoredMetric,
        allowed_extra_keys: &[String],
        keys: &[i32],
        values: &[String],
    ) -> Option<BTreeMap<String, String>> {
        if keys.len() != values.len() {
            self.record_error(
                metric,
                StoreErrorKind::InvalidValue,
                &format!("Mismatched extra keys ({}) and values ({})", keys.len(), values.len()),
            );
            return None;
        }

        let mut extra = BTreeMap::new();
        for (&key, value) in keys.iter().zip(values) {
            let Some(name) = usize::try_from(key).ok().and_then(|i| allowed_extra_keys.get(i)) else {
                self.record_error(
                    metric,
                    StoreErrorKind::InvalidValue,
                    &format!("Invalid key index {}", key),
                );
                return None;
            };

            let value = if value.len() > MAX_LENGTH_EXTRA_KEY_VALUE {
                self.record_error(
                    metric,
                    StoreErrorKind::InvalidValue,
                    &format!(
                        "Value for extra key '{}' longer than {} bytes; truncated",
                        name, MAX_LENGTH_EXTRA_KEY_VALUE
                    ),
                );
                truncate_at_char_boundary(value, MAX_LENGTH_EXTRA_KEY_VALUE)
            } else {
                value.clone()
            };
            extra.insert(name.clone(), value);
        }
        Some(extra)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeStore for InMemoryStore {
    fn create_event_metric(
        &self,
        definition: MetricDefinition<'_>,
        allowed_extra_keys: Option<&[&str]>,
    ) -> NativeHandle {
        let allowed_extra_keys = allowed_extra_keys
            .map(|keys| keys.iter().map(|k| (*k).to_string()).collect())
            .unwrap_or_default();
        self.register(definition, MetricKind::Event { allowed_extra_keys })
    }

    fn create_counter_metric(&self, definition: MetricDefinition<'_>) -> NativeHandle {
        self.register(definition, MetricKind::Counter)
    }

    fn should_record(&self, handle: NativeHandle) -> bool {
        if !self.upload_enabled.load(Ordering::Relaxed) {
            return false;
        }
        self.lookup(handle).map_or(false, |metric| !metric.disabled)
    }

    fn record_event(&self, handle: NativeHandle, timestamp: u64, keys: &[i32], values: &[String]) {
        let Some(metric) = self.lookup(handle) else {
            error!(handle, "record_event called with an unknown handle");
            return;
        };
        let MetricKind::Event { allowed_extra_keys } = &metric.kind else {
            error!(metric = %metric.identifier, "record_event called on a non-event metric");
            return;
        };

        let extra = if keys.is_empty() && values.is_empty() {
            None
        } else {
            match self.build_extra(&metric, allowed_extra_keys, keys, values) {
                Some(extra) => Some(extra),
                None => return,
            }
        };

        let event = StoredEvent {
            timestamp,
            category: metric.category.clone(),
            name: metric.name.clone(),
            extra,
        };
        for ping in &metric.send_in_pings {
            self.events
                .entry((ping.clone(), metric.identifier.clone()))
                .or_default()
                .push(event.clone());
        }
    }

    fn add_to_counter(&self, handle: NativeHandle, amount: i32) {
        let Some(metric) = self.lookup(handle) else {
            error!(handle, "add_to_counter called with an unknown handle");
            return;
        };
        if !matches!(metric.kind, MetricKind::Counter) {
            error!(metric = %metric.identifier, "add_to_counter called on a non-counter metric");
            return;
        }
        if amount <= 0 {
            self.record_error(
                &metric,
                StoreErrorKind::InvalidValue,
                &format!("Added negative or zero value {}", amount),
            );
            return;
        }

        for ping in &metric.send_in_pings {
            let mut value = self
                .counters
                .entry((ping.clone(), metric.identifier.clone()))
                .or_insert(0);
            *value = value.saturating_add(amount);
        }
    }

    fn event_test_has_value(&self, handle: NativeHandle, ping: &str) -> bool {
        let Some(metric) = self.lookup(handle) else {
            return false;
        };
        self.events
            .get(&(ping.to_string(), metric.identifier.clone()))
            .map_or(false, |events| !events.is_empty())
    }

    fn event_test_get_value_as_json(&self, handle: NativeHandle, ping: &str) -> Option<String> {
        let metric = self.lookup(handle)?;
        let events = self.events.get(&(ping.to_string(), metric.identifier.clone()))?;
        if events.is_empty() {
            return None;
        }

        match serde_json::to_string(events.value()) {
            Ok(json) => Some(json),
            Err(e) => {
                error!(metric = %metric.identifier, error = %e, "Failed to serialize stored events");
                None
            },
        }
    }

    fn counter_test_get_value(&self, handle: NativeHandle, ping: &str) -> Option<i32> {
        let metric = self.lookup(handle)?;
        self.counters
            .get(&(ping.to_string(), metric.identifier.clone()))
            .map(|value| *value)
    }

    fn set_upload_enabled(&self, enabled: bool) {
        self.upload_enabled.store(enabled, Ordering::Relaxed);
    }
}

/// Truncate `value` to at most `max_bytes`, never splitting a character.
fn truncate_at_char_boundary(value: &str, max_bytes: usize) -> String {
    if value.len() <= max_bytes {
        return value.to_string();
    }
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}
