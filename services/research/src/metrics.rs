use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

use wiretronic_utils::{WiretronicError, WiretronicResult};

/// Research counters, kept in a registry owned by the service.
pub struct ResearchMetrics {
    registry: Registry,
    items: IntCounterVec,
    duration: Histogram,
}

impl ResearchMetrics {
    pub fn new() -> WiretronicResult<Self> {
        let registry = Registry::new();

        let items = IntCounterVec::new(
            Opts::new("wiretronic_research_items_total", "Researched items by outcome"),
            &["outcome"],
        )
        .map_err(metrics_error)?;

        let duration = Histogram::with_opts(
            HistogramOpts::new(
                "wiretronic_research_duration_seconds",
                "Time spent researching one item",
            )
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 240.0, 480.0]),
        )
        .map_err(metrics_error)?;

        registry.register(Box::new(items.clone())).map_err(metrics_error)?;
        registry.register(Box::new(duration.clone())).map_err(metrics_error)?;

        Ok(Self {
            registry,
            items,
            duration,
        })
    }

    pub fn record_item(&self, success: bool, seconds: f64) {
        let outcome = if success { "success" } else { "failure" };
        self.items.with_label_values(&[outcome]).inc();
        self.duration.observe(seconds);
    }

    /// Prometheus text exposition of every registered metric.
    pub fn encode(&self) -> WiretronicResult<String> {
        TextEncoder::new()
            .encode_to_string(&self.registry.gather())
            .map_err(metrics_error)
    }

    #[cfg(test)]
    pub fn item_count(&self, outcome: &str) -> u64 {
        self.items.with_label_values(&[outcome]).get()
    }
}

fn metrics_error(e: prometheus::Error) -> WiretronicError {
    WiretronicError::internal(format!("metrics: {}", e))
}
