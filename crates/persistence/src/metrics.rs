//! Table storage metrics collection.
//!
//! Provides functions for recording storage-related metrics.

use metrics::{counter, histogram};
use std::time::Instant;

/// Record the duration of a table service request.
pub fn record_operation_duration(operation: &str, duration_secs: f64) {
    histogram!(
        "storage_operation_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}

/// Count a failed table service request by failure kind.
pub fn record_operation_failure(operation: &str, kind: &'static str) {
    counter!(
        "storage_operation_failures_total",
        "operation" => operation.to_string(),
        "kind" => kind
    )
    .increment(1);
}

/// A helper to time table operations and record metrics.
///
/// Usage:
/// ```ignore
/// let timer = OperationTimer::new("insert_entity");
/// let result = client.post(url).send().await;
/// timer.record();
/// result
/// ```
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            start: Instant::now(),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_operation_duration(&self.operation, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_timer_creation() {
        let timer = OperationTimer::new("insert_entity");
        assert_eq!(timer.operation(), "insert_entity");
    }

    #[test]
    fn test_operation_timer_record_without_recorder() {
        // No global recorder installed; recording is a no-op.
        OperationTimer::new(String::from("create_table")).record();
        record_operation_failure("insert_entity", "timeout");
    }
}
