//! Metric types exposed to applications.
//!
//! Every metric is declared once against a [`Glean`](crate::Glean) instance,
//! which registers its definition with the native store and keeps the
//! returned handle for the lifetime of the process.

pub mod counter;
pub mod event;
pub mod extra_keys;
pub mod recorded_event;

pub use counter::CounterMetric;
pub use event::EventMetric;
pub use extra_keys::{EncodedExtra, ExtraKeys, NoExtraKeys};
pub use recorded_event::RecordedEvent;

use crate::native::MetricDefinition;
use serde::{Deserialize, Serialize};

/// How long a metric's value persists before being reset.
///
/// Only the ordinal crosses into the native store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum Lifetime {
    /// Reset after each ping is sent
    Ping = 0,
    /// Reset when the application restarts
    Application = 1,
    /// Kept across restarts
    User = 2,
}

impl Lifetime {
    /// Ordinal passed to the native store.
    pub const fn ordinal(self) -> i32 {
        self as i32
    }
}

/// Metadata shared by all metric types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonMetricData {
    /// Metric category, may be empty
    pub category: String,
    /// Metric name
    pub name: String,
    /// Pings this metric is sent in
    pub send_in_pings: Vec<String>,
    /// Lifetime of the stored value
    pub lifetime: Lifetime,
    /// Disabled metrics never record
    pub disabled: bool,
}

impl CommonMetricData {
    /// Metadata for an enabled, ping-lifetime metric sent in one ping.
    pub fn new<C, N, P>(category: C, name: N, ping: P) -> Self
    where
        C: Into<String>,
        N: Into<String>,
        P: Into<String>,
    {
        Self {
            category: category.into(),
            name: name.into(),
            send_in_pings: vec![ping.into()],
            lifetime: Lifetime::Ping,
            disabled: false,
        }
    }

    /// `category.name`, or just `name` when the category is empty.
    pub fn identifier(&self) -> String {
        if self.category.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.category, self.name)
        }
    }

    /// The ping test queries read from when none is given.
    pub fn default_ping(&self) -> Option<&str> {
        self.send_in_pings.first().map(String::as_str)
    }

    pub(crate) fn definition(&self) -> MetricDefinition<'_> {
        MetricDefinition {
            category: &self.category,
            name: &self.name,
            send_in_pings: &self.send_in_pings,
            lifetime: self.lifetime,
            disabled: self.disabled,
        }
    }

    /// Resolve the ping a test query targets.
    pub(crate) fn resolve_ping<'a>(&'a self, ping_name: Option<&'a str>) -> Option<&'a str> {
        ping_name.or_else(|| self.default_ping())
    }
}
