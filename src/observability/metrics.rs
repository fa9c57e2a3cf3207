use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the process-wide `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Helper metrics
    pub helper_invocations: IntCounter,
    pub helper_failures: IntCounterVec,
    pub refresh_duration: Histogram,

    // Cache metrics
    pub cache_hits: IntCounter,
    pub refresh_waiters_joined: IntCounter,
    pub token_expiry_unix: IntGauge,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("helpertokenagent".into()), None)
            .expect("metrics namespace is valid");

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Helper
            helper_invocations: IntCounter::new("helper_invocations_total", "Credential helper processes launched").expect("valid metric"),
            helper_failures: IntCounterVec::new(Opts::new("helper_failures_total", "Refresh failures by reason"), &["reason"]).expect("valid metric"),
            refresh_duration: Histogram::with_opts(HistogramOpts::new("refresh_duration_seconds", "Token refresh duration seconds").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0])).expect("valid metric"),

            // Cache
            cache_hits: IntCounter::new("cache_hits_total", "Calls served from the cached token").expect("valid metric"),
            refresh_waiters_joined: IntCounter::new("refresh_waiters_joined_total", "Callers that joined an in-flight refresh").expect("valid metric"),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Expiry of the cached token").expect("valid metric"),

            // Config/runtime
            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors during startup").expect("valid metric"),
            up: IntGauge::new("up", "1 if service is healthy").expect("valid metric"),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(metrics.helper_invocations.clone()),
            Box::new(metrics.helper_failures.clone()),
            Box::new(metrics.refresh_duration.clone()),
            Box::new(metrics.cache_hits.clone()),
            Box::new(metrics.refresh_waiters_joined.clone()),
            Box::new(metrics.token_expiry_unix.clone()),
            Box::new(metrics.config_validation_errors.clone()),
            Box::new(metrics.up.clone()),
        ];
        for collector in collectors {
            reg.register(collector).expect("metric registered once");
        }

        metrics
    }
}
