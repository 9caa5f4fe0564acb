//! Contract with the native metric store.
//!
//! The store owns metric definitions and their values. This layer only holds
//! the handles it hands out and forwards calls to it; every write happens
//! from a dispatcher task.

use crate::metrics::Lifetime;

pub mod memory;

pub use memory::{InMemoryStore, MAX_LENGTH_EXTRA_KEY_VALUE};

/// Opaque reference to a store-owned metric definition. `0` is never valid.
pub type NativeHandle = u64;

/// Handle value meaning "not yet created / invalid".
pub const INVALID_HANDLE: NativeHandle = 0;

/// Parameters of a metric definition as declared to the store.
#[derive(Debug, Clone, Copy)]
pub struct MetricDefinition<'a> {
    pub category: &'a str,
    pub name: &'a str,
    pub send_in_pings: &'a [String],
    pub lifetime: Lifetime,
    pub disabled: bool,
}

/// Calls consumed from the native store.
///
/// Implementations validate and persist values; they log and count their own
/// validation failures instead of returning them.
pub trait NativeStore: Send + Sync {
    /// Register an event metric and return its handle.
    fn create_event_metric(
        &self,
        definition: MetricDefinition<'_>,
        allowed_extra_keys: Option<&[&str]>,
    ) -> NativeHandle;

    /// Register a counter metric and return its handle.
    fn create_counter_metric(&self, definition: MetricDefinition<'_>) -> NativeHandle;

    /// Whether the metric behind `handle` should record right now.
    ///
    /// Called on the caller's thread; must be a cheap lookup.
    fn should_record(&self, handle: NativeHandle) -> bool;

    /// Store one event. `keys` and `values` are parallel sequences.
    fn record_event(&self, handle: NativeHandle, timestamp: u64, keys: &[i32], values: &[String]);

    /// Add `amount` to a counter.
    fn add_to_counter(&self, handle: NativeHandle, amount: i32);

    /// Whether any event is stored for the metric in `ping`.
    fn event_test_has_value(&self, handle: NativeHandle, ping: &str) -> bool;

    /// Stored events for the metric in `ping` as a JSON array, `None` if nothing is stored.
    fn event_test_get_value_as_json(&self, handle: NativeHandle, ping: &str) -> Option<String>;

    /// Current counter value in `ping`, `None` if nothing is stored.
    fn counter_test_get_value(&self, handle: NativeHandle, ping: &str) -> Option<i32>;

    /// Enable or disable recording for every metric.
    fn set_upload_enabled(&self, enabled: bool);
}
