use std::sync::Arc;

use crate::{errors::UdError, metrics::registry::MetricRegistry};

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUESTS_TOTAL_HELP: &str = "Total number of HTTP requests";
pub const HTTP_REQUEST_LABELS: [&str; 3] = ["method", "route", "status_code"];

/// Request counter facade over the registry. One observation per handled
/// request; the status label always carries the status actually sent.
pub struct HttpMetrics {
    registry: Arc<MetricRegistry>,
}

impl HttpMetrics {
    pub fn new(registry: Arc<MetricRegistry>) -> Result<Self, UdError> {
        registry.register_counter(HTTP_REQUESTS_TOTAL, HTTP_REQUESTS_TOTAL_HELP, &HTTP_REQUEST_LABELS)?;
        Ok(Self { registry })
    }

    pub fn observe_request(&self, method: &str, route: &str, status: u16) -> Result<(), UdError> {
        self.registry.increment_counter(HTTP_REQUESTS_TOTAL, &[method, route, &status.to_string()])
    }

    pub fn request_count(&self, method: &str, route: &str, status: u16) -> Result<u64, UdError> {
        let count = self.registry.counter_value(HTTP_REQUESTS_TOTAL, &[method, route, &status.to_string()])?;
        Ok(count.unwrap_or(0))
    }
}
