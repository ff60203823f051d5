//! A small in-process metric registry. Metrics are declared once at startup
//! and mutated through string-keyed operations afterwards; the whole registry
//! renders to Prometheus exposition text on demand.
//!
//! Counters keep one atomic accumulator per realized label combination, so
//! concurrent observers never lose an increment. Gauges are unlabeled and
//! hold a single current value. A snapshot only takes read locks: scrapes see
//! each value atomically but make no cross-metric consistency promise.

use std::{
    fmt::Write,
    sync::{
        atomic::{AtomicU64, Ordering},
        RwLock,
    },
};

use crate::errors::UdError;

/// Content type reported by the exposition endpoint.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

struct CounterFamily {
    label_names: Vec<String>,
    // realized label combinations, kept in first-observation order
    instances: RwLock<Vec<(Vec<String>, AtomicU64)>>,
}

impl CounterFamily {
    fn increment(&self, label_values: &[&str]) -> Result<(), UdError> {
        if label_values.len() != self.label_names.len() {
            return Err(UdError::ErrMetricLabelArity);
        }

        {
            let instances = self.instances.read()?;
            if let Some((_, value)) = instances.iter().find(|(labels, _)| labels == label_values) {
                value.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
        }

        let mut instances = self.instances.write()?;
        // another writer may have realized this combination in the meantime
        if let Some((_, value)) = instances.iter().find(|(labels, _)| labels == label_values) {
            value.fetch_add(1, Ordering::Relaxed);
        } else {
            let labels = label_values.iter().map(|v| v.to_string()).collect();
            instances.push((labels, AtomicU64::new(1)));
        }

        Ok(())
    }

    fn value(&self, label_values: &[&str]) -> Result<Option<u64>, UdError> {
        if label_values.len() != self.label_names.len() {
            return Err(UdError::ErrMetricLabelArity);
        }

        let instances = self.instances.read()?;
        Ok(instances
            .iter()
            .find(|(labels, _)| labels == label_values)
            .map(|(_, value)| value.load(Ordering::Relaxed)))
    }
}

// f64 bits in an AtomicU64, so a sampler write and a scrape never tear
struct GaugeCell {
    bits: AtomicU64,
}

impl GaugeCell {
    fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

enum MetricData {
    Counter(CounterFamily),
    Gauge(GaugeCell),
}

struct Metric {
    name: String,
    help: String,
    data: MetricData,
}

impl Metric {
    fn kind(&self) -> MetricKind {
        match self.data {
            MetricData::Counter(_) => MetricKind::Counter,
            MetricData::Gauge(_) => MetricKind::Gauge,
        }
    }
}

/// The registry itself. Constructed once at startup and shared by handle;
/// registration order is rendering order.
pub struct MetricRegistry {
    metrics: RwLock<Vec<Metric>>,
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricRegistry {
    pub fn new() -> Self {
        MetricRegistry { metrics: RwLock::new(Vec::new()) }
    }

    pub fn register_counter(&self, name: &str, help: &str, label_names: &[&str]) -> Result<(), UdError> {
        let mut metrics = self.metrics.write()?;
        if metrics.iter().any(|m| m.name == name) {
            return Err(UdError::ErrMetricDuplicate);
        }

        metrics.push(Metric {
            name: name.to_string(),
            help: help.to_string(),
            data: MetricData::Counter(CounterFamily {
                label_names: label_names.iter().map(|n| n.to_string()).collect(),
                instances: RwLock::new(Vec::new()),
            }),
        });

        Ok(())
    }

    pub fn register_gauge(&self, name: &str, help: &str) -> Result<(), UdError> {
        let mut metrics = self.metrics.write()?;
        if metrics.iter().any(|m| m.name == name) {
            return Err(UdError::ErrMetricDuplicate);
        }

        metrics.push(Metric {
            name: name.to_string(),
            help: help.to_string(),
            data: MetricData::Gauge(GaugeCell { bits: AtomicU64::new(0f64.to_bits()) }),
        });

        Ok(())
    }

    /// Increments by 1 the accumulator for the given label combination,
    /// realizing it at zero first if it was never observed.
    pub fn increment_counter(&self, name: &str, label_values: &[&str]) -> Result<(), UdError> {
        let metrics = self.metrics.read()?;
        match metrics.iter().find(|m| m.name == name).map(|m| &m.data) {
            Some(MetricData::Counter(family)) => family.increment(label_values),
            _ => Err(UdError::ErrMetricUnknown),
        }
    }

    /// Overwrites the gauge's current value. Gauges have no history.
    pub fn set_gauge(&self, name: &str, value: f64) -> Result<(), UdError> {
        let metrics = self.metrics.read()?;
        match metrics.iter().find(|m| m.name == name).map(|m| &m.data) {
            Some(MetricData::Gauge(cell)) => {
                cell.set(value);
                Ok(())
            }
            _ => Err(UdError::ErrMetricUnknown),
        }
    }

    /// Current value of a counter's label combination, `None` if the
    /// combination was never observed.
    pub fn counter_value(&self, name: &str, label_values: &[&str]) -> Result<Option<u64>, UdError> {
        let metrics = self.metrics.read()?;
        match metrics.iter().find(|m| m.name == name).map(|m| &m.data) {
            Some(MetricData::Counter(family)) => family.value(label_values),
            _ => Err(UdError::ErrMetricUnknown),
        }
    }

    pub fn gauge_value(&self, name: &str) -> Result<f64, UdError> {
        let metrics = self.metrics.read()?;
        match metrics.iter().find(|m| m.name == name).map(|m| &m.data) {
            Some(MetricData::Gauge(cell)) => Ok(cell.get()),
            _ => Err(UdError::ErrMetricUnknown),
        }
    }

    /// Renders every registered metric and every realized label instance as
    /// exposition text: a `# HELP` line, a `# TYPE` line, then one line per
    /// value.
    pub fn snapshot(&self) -> Result<String, UdError> {
        let metrics = self.metrics.read()?;
        let mut out = String::new();

        for metric in metrics.iter() {
            let _ = writeln!(out, "# HELP {} {}", metric.name, metric.help);
            let _ = writeln!(out, "# TYPE {} {}", metric.name, metric.kind().as_str());

            match &metric.data {
                MetricData::Counter(family) => {
                    let instances = family.instances.read()?;
                    for (labels, value) in instances.iter() {
                        let rendered = family
                            .label_names
                            .iter()
                            .zip(labels.iter())
                            .map(|(name, value)| format!("{}=\"{}\"", name, escape_label_value(value)))
                            .collect::<Vec<String>>()
                            .join(",");
                        let _ = writeln!(out, "{}{{{}}} {}", metric.name, rendered, value.load(Ordering::Relaxed));
                    }
                }
                MetricData::Gauge(cell) => {
                    let _ = writeln!(out, "{} {}", metric.name, cell.get());
                }
            }
        }

        Ok(out)
    }
}

fn escape_label_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn test_register_rules() {
        let registry = MetricRegistry::new();
        assert!(registry.register_counter("requests_total", "Total requests", &["method"]).is_ok());
        assert_eq!(
            registry.register_counter("requests_total", "Total requests", &["method"]),
            Err(UdError::ErrMetricDuplicate)
        );
        assert_eq!(registry.register_gauge("requests_total", "Total requests"), Err(UdError::ErrMetricDuplicate));

        assert_eq!(registry.increment_counter("nope", &["get"]), Err(UdError::ErrMetricUnknown));
        assert_eq!(registry.set_gauge("nope", 1.0), Err(UdError::ErrMetricUnknown));
        assert_eq!(registry.increment_counter("requests_total", &["get", "extra"]), Err(UdError::ErrMetricLabelArity));

        // a gauge name is not a counter
        assert!(registry.register_gauge("temperature", "Current temperature").is_ok());
        assert_eq!(registry.increment_counter("temperature", &[]), Err(UdError::ErrMetricUnknown));
        assert_eq!(registry.set_gauge("requests_total", 1.0), Err(UdError::ErrMetricUnknown));
    }

    #[test]
    fn test_counter_monotonic_law() {
        let registry = MetricRegistry::new();
        registry.register_counter("hits", "Hits", &["route"]).unwrap();

        for _ in 0..7 {
            registry.increment_counter("hits", &["/users"]).unwrap();
        }
        for _ in 0..3 {
            registry.increment_counter("hits", &["/users/:id"]).unwrap();
        }

        assert_eq!(registry.counter_value("hits", &["/users"]).unwrap(), Some(7));
        assert_eq!(registry.counter_value("hits", &["/users/:id"]).unwrap(), Some(3));
        assert_eq!(registry.counter_value("hits", &["/metrics"]).unwrap(), None);
    }

    #[test]
    fn test_gauge_last_value_wins() {
        let registry = MetricRegistry::new();
        registry.register_gauge("cpu_usage_percent", "CPU usage percentage").unwrap();

        registry.set_gauge("cpu_usage_percent", 12.5).unwrap();
        registry.set_gauge("cpu_usage_percent", 80.0).unwrap();
        registry.set_gauge("cpu_usage_percent", 42.0).unwrap();

        assert_eq!(registry.gauge_value("cpu_usage_percent").unwrap(), 42.0);
        assert!(registry.snapshot().unwrap().contains("cpu_usage_percent 42"));
    }

    #[test]
    fn test_concurrent_increments_lose_nothing() {
        let registry = Arc::new(MetricRegistry::new());
        registry.register_counter("hits", "Hits", &["route"]).unwrap();

        let mut handles = vec![];
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    registry.increment_counter("hits", &["/users"]).unwrap();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.counter_value("hits", &["/users"]).unwrap(), Some(8000));
    }

    #[test]
    fn test_snapshot_exposition_format() {
        let registry = MetricRegistry::new();
        registry.register_counter("http_requests_total", "Total number of HTTP requests", &["method", "route"]).unwrap();
        registry.register_gauge("cpu_usage_percent", "CPU usage percentage").unwrap();

        registry.increment_counter("http_requests_total", &["GET", "/users"]).unwrap();
        registry.increment_counter("http_requests_total", &["GET", "/users"]).unwrap();
        registry.increment_counter("http_requests_total", &["POST", "/users"]).unwrap();
        registry.set_gauge("cpu_usage_percent", 7.5).unwrap();

        let text = registry.snapshot().unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "# HELP http_requests_total Total number of HTTP requests");
        assert_eq!(lines[1], "# TYPE http_requests_total counter");
        assert_eq!(lines[2], "http_requests_total{method=\"GET\",route=\"/users\"} 2");
        assert_eq!(lines[3], "http_requests_total{method=\"POST\",route=\"/users\"} 1");
        assert_eq!(lines[4], "# HELP cpu_usage_percent CPU usage percentage");
        assert_eq!(lines[5], "# TYPE cpu_usage_percent gauge");
        assert_eq!(lines[6], "cpu_usage_percent 7.5");

        // exactly one TYPE line per registered metric
        assert_eq!(text.matches("# TYPE ").count(), 2);
    }

    #[test]
    fn test_label_value_escaping() {
        let registry = MetricRegistry::new();
        registry.register_counter("odd", "Odd labels", &["detail"]).unwrap();
        registry.increment_counter("odd", &["say \"hi\"\\now"]).unwrap();

        let text = registry.snapshot().unwrap();
        assert!(text.contains(r#"odd{detail="say \"hi\"\\now"} 1"#));
    }
}
