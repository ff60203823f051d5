use std::sync::Arc;

use crate::{
    errors::UdError,
    metrics::{http_metrics::HttpMetrics, registry::MetricRegistry, system_metrics::SystemMetrics},
};

/// Owns the registry and the two producers that feed it. Built once at
/// startup and handed to the HTTP layer by `Arc`; all interior state is
/// atomic, so no outer lock is needed.
pub struct MetricsManager {
    pub registry: Arc<MetricRegistry>,
    pub system_metrics: Arc<SystemMetrics>,
    pub http_metrics: Arc<HttpMetrics>,
    pub instrument_exposition: bool,
}

impl MetricsManager {
    pub fn new(collection_interval: u64, instrument_exposition: bool) -> Result<Self, UdError> {
        let registry = Arc::new(MetricRegistry::new());
        let system_metrics = Arc::new(SystemMetrics::new(Arc::clone(&registry), collection_interval)?);
        let http_metrics = Arc::new(HttpMetrics::new(Arc::clone(&registry))?);
        Ok(MetricsManager { registry, system_metrics, http_metrics, instrument_exposition })
    }
}
