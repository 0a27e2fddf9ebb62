// src/metrics/collector.rs
use anyhow::Result;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

pub struct MetricsCollector {
    pub checks_total: IntCounterVec,
    pub forwarded_total: IntCounterVec,
    pub errors_total: IntCounterVec,
    pub registered_services: IntGauge,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let checks_total = IntCounterVec::new(
            Opts::new("health_checks_total", "Health checks answered locally"),
            &["format", "status"],
        )?;
        registry.register(Box::new(checks_total.clone()))?;

        let forwarded_total = IntCounterVec::new(
            Opts::new(
                "health_check_forwarded_total",
                "Health checks forwarded to a service handler",
            ),
            &["service"],
        )?;
        registry.register(Box::new(forwarded_total.clone()))?;

        let errors_total = IntCounterVec::new(
            Opts::new("health_check_errors_total", "Rejected or failed health checks"),
            &["kind"],
        )?;
        registry.register(Box::new(errors_total.clone()))?;

        let registered_services =
            IntGauge::new("health_registered_services", "Number of registered services")?;
        registry.register(Box::new(registered_services.clone()))?;

        Ok(Self {
            checks_total,
            forwarded_total,
            errors_total,
            registered_services,
        })
    }

    pub fn record_check(&self, format: &str, status: &str) {
        self.checks_total.with_label_values(&[format, status]).inc();
    }

    pub fn record_forward(&self, service: &str) {
        self.forwarded_total.with_label_values(&[service]).inc();
    }

    pub fn record_error(&self, kind: &str) {
        self.errors_total.with_label_values(&[kind]).inc();
    }

    pub fn update_registered_services(&self, count: usize) {
        self.registered_services.set(count as i64);
    }
}
