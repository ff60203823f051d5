use std::sync::{Arc, Mutex};

use sysinfo::System;
use tokio::{
    sync::watch,
    time::{self, Duration, MissedTickBehavior},
};

use crate::{errors::UdError, metrics::registry::MetricRegistry};

pub const CPU_USAGE_PERCENT: &str = "cpu_usage_percent";
pub const CPU_USAGE_PERCENT_HELP: &str = "CPU usage percentage";
pub const TOTAL_MEMORY: &str = "total_memory";
pub const TOTAL_MEMORY_HELP: &str = "Total memory";
pub const USED_MEMORY: &str = "used_memory";
pub const USED_MEMORY_HELP: &str = "Used memory";
pub const FREE_MEMORY: &str = "free_memory";
pub const FREE_MEMORY_HELP: &str = "Free memory";
pub const LOAD_AVERAGE: &str = "load_average";
pub const LOAD_AVERAGE_HELP: &str = "System load average";

/// Samples process-wide resource gauges into the registry on a fixed period,
/// independently of request traffic.
pub struct SystemMetrics {
    system: Mutex<System>,
    collection_interval: u64,
    registry: Arc<MetricRegistry>,
}

impl SystemMetrics {
    pub fn new(registry: Arc<MetricRegistry>, collection_interval: u64) -> Result<Self, UdError> {
        registry.register_gauge(CPU_USAGE_PERCENT, CPU_USAGE_PERCENT_HELP)?;
        registry.register_gauge(TOTAL_MEMORY, TOTAL_MEMORY_HELP)?;
        registry.register_gauge(USED_MEMORY, USED_MEMORY_HELP)?;
        registry.register_gauge(FREE_MEMORY, FREE_MEMORY_HELP)?;
        registry.register_gauge(LOAD_AVERAGE, LOAD_AVERAGE_HELP)?;

        Ok(Self { system: Mutex::new(System::new_all()), collection_interval, registry })
    }

    /// Runs until `shutdown` fires. Ticks are scheduled on the fixed period;
    /// an overrunning tick causes later ticks to be skipped, never queued.
    pub async fn start_collecting(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(Duration::from_secs(self.collection_interval));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    // a failed sample keeps the last gauge values and the loop alive
                    if let Err(e) = self.collect_metrics() {
                        log::error!("system metrics collection failed: {}", e);
                    }
                }
                _ = shutdown.changed() => {
                    log::info!("system metrics collection stopped");
                    break;
                }
            }
        }
    }

    pub fn collect_metrics(&self) -> Result<(), UdError> {
        let mut sys = self.system.lock().map_err(|_| UdError::ErrRwLockWritePoison)?;
        sys.refresh_all();

        self.registry.set_gauge(CPU_USAGE_PERCENT, sys.global_cpu_usage() as f64)?;

        self.registry.set_gauge(TOTAL_MEMORY, sys.total_memory() as f64)?;
        self.registry.set_gauge(USED_MEMORY, sys.used_memory() as f64)?;
        self.registry.set_gauge(FREE_MEMORY, sys.free_memory() as f64)?;

        self.registry.set_gauge(LOAD_AVERAGE, System::load_average().one)?;

        Ok(())
    }
}
