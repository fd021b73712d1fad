//! Metrics collection for observability

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_with_registry, Counter, CounterVec, Histogram, Opts, Registry,
};
use std::sync::Arc;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> =
    Lazy::new(|| Arc::new(Metrics::new().expect("Failed to initialize metrics")));

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Relay flow metrics
    pub relay_requests: CounterVec,
    pub relay_request_duration: Histogram,

    // Upstream metrics
    pub llm_requests: CounterVec,
    pub llm_request_duration: Histogram,
    pub sms_sends: CounterVec,

    // History metrics
    pub history_resets: Counter,
    pub turns_persisted: Counter,

    // Window trimming metrics
    pub evicted_pairs: Histogram,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let registry = Registry::new();

        let relay_requests = register_counter_vec_with_registry!(
            Opts::new("relay_requests_total", "Total relay webhook events"),
            &["outcome"],
            registry
        )?;

        let relay_request_duration = register_histogram_with_registry!(
            "relay_request_duration_seconds",
            "End-to-end webhook event duration in seconds",
            registry
        )?;

        let llm_requests = register_counter_vec_with_registry!(
            Opts::new("llm_requests_total", "Total chat completion requests"),
            &["status"],
            registry
        )?;

        let llm_request_duration = register_histogram_with_registry!(
            "llm_request_duration_seconds",
            "Chat completion request duration in seconds",
            registry
        )?;

        let sms_sends = register_counter_vec_with_registry!(
            Opts::new("sms_sends_total", "Total outbound SMS sends"),
            &["status"],
            registry
        )?;

        let history_resets = register_counter_with_registry!(
            Opts::new("history_resets_total", "Total reset commands handled"),
            registry
        )?;

        let turns_persisted = register_counter_with_registry!(
            Opts::new("turns_persisted_total", "Total turns written to history"),
            registry
        )?;

        let evicted_pairs = register_histogram_with_registry!(
            "evicted_pairs_per_request",
            "History pairs evicted per request to fit the token budget",
            registry
        )?;

        Ok(Self {
            registry,
            relay_requests,
            relay_request_duration,
            llm_requests,
            llm_request_duration,
            sms_sends,
            history_resets,
            turns_persisted,
            evicted_pairs,
        })
    }

    /// Get the metrics registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a terminal relay outcome
    pub fn record_relay(&self, outcome: &str) {
        self.relay_requests.with_label_values(&[outcome]).inc();
    }

    /// Record a chat completion attempt
    pub fn record_llm(&self, success: bool) {
        let status = if success { "success" } else { "error" };
        self.llm_requests.with_label_values(&[status]).inc();
    }

    /// Record an outbound SMS send attempt
    pub fn record_sms(&self, success: bool) {
        let status = if success { "success" } else { "error" };
        self.sms_sends.with_label_values(&[status]).inc();
    }

    /// Record a handled reset command
    pub fn record_reset(&self) {
        self.history_resets.inc();
    }

    /// Record one persisted turn
    pub fn record_turn_persisted(&self) {
        self.turns_persisted.inc();
    }

    /// Record how many pairs a trim pass evicted
    pub fn record_trim(&self, evicted_pairs: usize) {
        self.evicted_pairs.observe(evicted_pairs as f64);
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}
