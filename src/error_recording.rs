//! Test access to the validation errors the native store counts per metric.
//!
//! The store counts errors as ordinary counters in the `glean.error`
//! category, named `<error name>/<metric identifier>`. Reading one back is
//! just a counter test read.

use crate::core::Result;
use crate::glean::Glean;
use crate::metrics::{CommonMetricData, CounterMetric, Lifetime};
use crate::testing::TestContext;

/// Category the native store counts errors under.
pub const ERROR_CATEGORY: &str = "glean.error";

/// Kinds of validation error a metric can record.
///
/// Names must match the native store's own error taxonomy exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// The value was rejected or truncated
    InvalidValue,
    /// The label of a labeled metric was rejected
    InvalidLabel,
}

impl ErrorType {
    /// Every error type, in declaration order.
    pub const ALL: [ErrorType; 2] = [ErrorType::InvalidValue, ErrorType::InvalidLabel];

    /// Lowercase snake-case name used in the error counter's name.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorType::InvalidValue => "invalid_value",
            ErrorType::InvalidLabel => "invalid_label",
        }
    }
}

/// Number of `error_type` errors recorded for the metric `identifier` in
/// `ping_name`. Zero when none were recorded.
pub fn test_get_num_recorded_errors(
    glean: &Glean,
    ctx: &TestContext,
    identifier: &str,
    error_type: ErrorType,
    ping_name: &str,
) -> Result<i32> {
    let error_metric = CounterMetric::new(
        glean,
        CommonMetricData {
            category: ERROR_CATEGORY.to_string(),
            name: format!("{}/{}", error_type.as_str(), identifier),
            send_in_pings: vec![ping_name.to_string()],
            lifetime: Lifetime::Ping,
            disabled: false,
        },
    );

    match error_metric.test_get_value(ctx, Some(ping_name)) {
        Ok(count) => Ok(count),
        Err(e) if e.is_no_value() => Ok(0),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::memory::{StoreErrorKind, ERROR_CATEGORY as STORE_ERROR_CATEGORY};

    #[test]
    fn test_names_match_store_taxonomy() {
        assert_eq!(ERROR_CATEGORY, STORE_ERROR_CATEGORY);
        assert_eq!(ErrorType::ALL.len(), StoreErrorKind::ALL.len());
        for (ours, theirs) in ErrorType::ALL.iter().zip(StoreErrorKind::ALL.iter()) {
            assert_eq!(ours.as_str(), theirs.name());
        }
    }

    #[test]
    fn test_names_are_snake_case() {
        for error_type in ErrorType::ALL {
            let name = error_type.as_str();
            assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '_'), "{}", name);
        }
    }
}
