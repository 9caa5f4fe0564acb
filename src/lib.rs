//! glean-events - event recording for the Glean telemetry client.
//!
//! Applications declare typed event metrics, record occurrences with optional
//! attributes, and in tests read back exactly what was recorded.
//!
//! # Features
//!
//! - **Cheap gating**: disabled or uninitialized metrics cost one lookup
//! - **Ordered recording**: one serial dispatcher stores events in call order
//! - **Read-after-write tests**: test queries drain the dispatcher first
//! - **Typed extra keys**: attribute keys are declared per metric
//!
//! # Architecture
//!
//! - `core`: errors, configuration and the monotonic clock
//! - `dispatcher`: the serial background task queue
//! - `native`: the native store contract and an in-memory store
//! - `metrics`: event and counter metrics
//! - `error_recording`: test access to per-metric validation errors
//!
//! # Example
//!
//! ```
//! use glean_events::core::ConfigBuilder;
//! use glean_events::metrics::{CommonMetricData, EventMetric};
//! use glean_events::{Glean, TestContext};
//! use std::collections::HashMap;
//!
//! glean_events::extra_keys! {
//!     pub enum ClickKeys {
//!         Button => "button",
//!     }
//! }
//!
//! # fn main() -> glean_events::Result<()> {
//! let config = ConfigBuilder::new().testing_mode(true).build()?;
//! let glean = Glean::in_memory(config)?;
//! glean.initialize();
//!
//! let click: EventMetric<ClickKeys> =
//!     EventMetric::new(&glean, CommonMetricData::new("ui", "click", "metrics"));
//! click.record(Some(HashMap::from([(ClickKeys::Button, "ok".to_string())])));
//!
//! let ctx = TestContext::acquire(&glean)?;
//! let events = click.test_get_value(&ctx, None)?;
//! assert_eq!(events[0].identifier, "ui.click");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod core;
pub mod dispatcher;
pub mod error_recording;
pub mod glean;
pub mod logging;
pub mod metrics;
pub mod native;
pub mod testing;

// Re-export core types for convenience
pub use crate::core::{Config, GleanError, Result};
pub use crate::glean::Glean;
pub use crate::testing::TestContext;
