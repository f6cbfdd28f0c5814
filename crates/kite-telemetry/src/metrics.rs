//! Prometheus metrics for Kite pipeline stages.
//!
//! All metrics follow the naming convention: `kite_<stage>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, Opts, Registry,
    TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // MESSAGE CHECK STAGE
    // =========================================================================

    /// Messages processed by the check stage, by outcome
    pub static ref CHECK_MESSAGES: CounterVec = CounterVec::new(
        Opts::new("kite_check_messages_total", "Messages processed by the check stage"),
        &["outcome"]  // outcome: forwarded/rejected/skipped
    ).expect("metric creation failed");

    /// Rejected messages by reason
    pub static ref CHECK_REJECTIONS: CounterVec = CounterVec::new(
        Opts::new("kite_check_rejections_total", "Messages rejected with a negative store ack"),
        &["reason"]  // reason: unsupported_topic/invalid_message_id/expired
    ).expect("metric creation failed");

    /// Header fields rewritten to broker bounds
    pub static ref CHECK_HEADER_CLAMPS: CounterVec = CounterVec::new(
        Opts::new("kite_check_header_clamps_total", "Header fields normalized by the check stage"),
        &["field"]  // field: create_time/deliver_limit/expired_time
    ).expect("metric creation failed");

    /// Time spent checking a single message
    pub static ref CHECK_DURATION: Histogram = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "kite_check_duration_seconds",
            "Time spent validating one inbound message"
        ).buckets(exponential_buckets(0.000_001, 2.0, 15).expect("valid bucket layout"))
    ).expect("metric creation failed");

    // =========================================================================
    // TOPIC AUTHORIZATION
    // =========================================================================

    /// Topic snapshots applied from the topic feed
    pub static ref TOPIC_REFRESHES: Counter = Counter::new(
        "kite_topic_refreshes_total",
        "Topic set snapshots applied from the topic feed"
    ).expect("metric creation failed");

    /// Topics in the current snapshot
    pub static ref TOPIC_COUNT: Gauge = Gauge::new(
        "kite_topic_count",
        "Number of topics currently accepted"
    ).expect("metric creation failed");

    // =========================================================================
    // ERROR METRICS
    // =========================================================================

    /// Stage errors by type
    pub static ref STAGE_ERRORS: CounterVec = CounterVec::new(
        Opts::new("kite_stage_errors_total", "Errors by pipeline stage and type"),
        &["stage", "error_type"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; collectors that are already registered are
/// left in place.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(CHECK_MESSAGES.clone()),
        Box::new(CHECK_REJECTIONS.clone()),
        Box::new(CHECK_HEADER_CLAMPS.clone()),
        Box::new(CHECK_DURATION.clone()),
        Box::new(TOPIC_REFRESHES.clone()),
        Box::new(TOPIC_COUNT.clone()),
        Box::new(STAGE_ERRORS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
