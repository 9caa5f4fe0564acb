//! Decoding of stored events returned by test queries.

use crate::core::{GleanError, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// One event as stored by the native store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WireEvent")]
pub struct RecordedEvent {
    pub category: String,
    pub name: String,
    /// `category.name`, or `name` when the category is empty
    pub identifier: String,
    /// Monotonic milliseconds captured when `record` was called
    pub timestamp: u64,
    pub extra: Option<HashMap<String, String>>,
}

#[derive(Deserialize)]
struct WireEvent {
    timestamp: u64,
    category: String,
    name: String,
    #[serde(default)]
    extra: Option<HashMap<String, String>>,
}

impl From<WireEvent> for RecordedEvent {
    fn from(wire: WireEvent) -> Self {
        let identifier = if wire.category.is_empty() {
            wire.name.clone()
        } else {
            format!("{}.{}", wire.category, wire.name)
        };
        Self {
            category: wire.category,
            name: wire.name,
            identifier,
            timestamp: wire.timestamp,
            extra: wire.extra,
        }
    }
}

/// Decode the JSON array returned by the store for `identifier` in `ping`.
///
/// A missing response or an empty array is [`GleanError::NoValue`]; malformed
/// JSON is [`GleanError::Decode`]. Events keep the array's order.
pub(crate) fn decode_events(
    json: Option<&str>,
    identifier: &str,
    ping: &str,
) -> Result<Vec<RecordedEvent>> {
    let Some(json) = json else {
        return Err(GleanError::no_value(identifier, ping));
    };

    let events: Vec<RecordedEvent> = serde_json::from_str(json)?;
    if events.is_empty() {
        return Err(GleanError::no_value(identifier, ping));
    }
    Ok(events)
}
