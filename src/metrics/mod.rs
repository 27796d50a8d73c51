// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Counters for the order lifecycle:
// - orders created
// - operation failures, by operation and reason
// - status transitions, by edge
// - list queries, by requester role
// - operation latency
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the order engine
pub struct Metrics {
    registry: Registry,

    pub orders_created: IntCounter,
    pub order_failures: IntCounterVec,
    pub status_transitions: IntCounterVec,
    pub list_queries: IntCounterVec,
    pub operation_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_created = IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        let order_failures = IntCounterVec::new(
            Opts::new("order_failures_total", "Failed order operations"),
            &["operation", "reason"],
        )?;
        registry.register(Box::new(order_failures.clone()))?;

        let status_transitions = IntCounterVec::new(
            Opts::new(
                "order_status_transitions_total",
                "Applied order status transitions",
            ),
            &["from", "to"],
        )?;
        registry.register(Box::new(status_transitions.clone()))?;

        let list_queries = IntCounterVec::new(
            Opts::new("order_list_queries_total", "Order list queries by role"),
            &["role"],
        )?;
        registry.register(Box::new(list_queries.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new("order_operation_duration_seconds", "Order operation latency")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            order_failures,
            status_transitions,
            list_queries,
            operation_duration,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_order_created(&self) {
        self.orders_created.inc();
    }

    pub fn record_failure(&self, operation: &str, reason: &str) {
        self.order_failures
            .with_label_values(&[operation, reason])
            .inc();
    }

    pub fn record_transition(&self, from: &str, to: &str) {
        self.status_transitions.with_label_values(&[from, to]).inc();
    }

    pub fn record_list_query(&self, role: &str) {
        self.list_queries.with_label_values(&[role]).inc();
    }

    pub fn observe_duration(&self, operation: &str, duration_secs: f64) {
        self.operation_duration
            .with_label_values(&[operation])
            .observe(duration_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(metrics.registry.gather().len() > 0);
    }

    #[test]
    fn test_record_order_created() {
        let metrics = Metrics::new().unwrap();
        metrics.record_order_created();
        metrics.record_order_created();

        let gathered = metrics.registry.gather();
        let created = gathered
            .iter()
            .find(|m| m.name() == "orders_created_total")
            .unwrap();
        assert_eq!(created.metric[0].counter.value, Some(2.0));
    }

    #[test]
    fn test_record_failure_labels() {
        let metrics = Metrics::new().unwrap();
        metrics.record_failure("create_order", "restaurant_not_found");
        metrics.record_failure("update_status", "invalid_transition");

        let gathered = metrics.registry.gather();
        let failures = gathered
            .iter()
            .find(|m| m.name() == "order_failures_total")
            .unwrap();
        assert_eq!(failures.metric.len(), 2);
    }

    #[test]
    fn test_record_transition_edge() {
        let metrics = Metrics::new().unwrap();
        metrics.record_transition("pending", "in_progress");
        metrics.record_transition("pending", "in_progress");
        metrics.record_transition("in_progress", "delivered");

        let gathered = metrics.registry.gather();
        let transitions = gathered
            .iter()
            .find(|m| m.name() == "order_status_transitions_total")
            .unwrap();
        assert_eq!(transitions.metric.len(), 2);
    }
}
