//! Monotonic clock for event timestamps.

use once_cell::sync::Lazy;
use std::time::Instant;

static CLOCK_ORIGIN: Lazy<Instant> = Lazy::new(Instant::now);

/// Milliseconds elapsed on a monotonic clock since the first call in this process.
///
/// Never goes backwards, regardless of wall-clock adjustments.
#[inline]
pub fn monotonic_millis() -> u64 {
    let elapsed = CLOCK_ORIGIN.elapsed().as_millis();
    u64::try_from(elapsed).unwrap_or(u64::MAX)
}
