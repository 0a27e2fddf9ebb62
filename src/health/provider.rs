// src/health/provider.rs
use dashmap::DashMap;
use hyper::{Body, Request, Response};
use std::future::Future;
use std::sync::Arc;
use tracing::info;

use super::client::HealthClient;
use super::format::OutputFormat;
use super::handler::HealthHandler;
use super::redirect::{redirect_fn, Redirect};
use super::validator::RequestValidator;
use crate::metrics::MetricsCollector;

/// Service name to optional redirect.
///
/// No entry means the service is unknown, `None` means it is answered locally
/// and `Some` means the check is forwarded.
pub(crate) type ServiceRegistry = DashMap<String, Option<Arc<dyn Redirect>>>;

/// Builds health check handlers over a shared service registry.
#[derive(Clone)]
pub struct HealthProvider {
    services: Arc<ServiceRegistry>,
    output_format: OutputFormat,
    validator: Option<Arc<dyn RequestValidator>>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl HealthProvider {
    pub fn new(output_format: OutputFormat) -> Self {
        Self {
            services: Arc::new(DashMap::new()),
            output_format,
            validator: None,
            metrics: None,
        }
    }

    /// Gate every check through `validator` before it is processed.
    pub fn with_validator(mut self, validator: Arc<dyn RequestValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        metrics.update_registered_services(self.services.len());
        self.metrics = Some(metrics);
        self
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// Register a service. Pass `None` to report it as serving without forwarding.
    /// Registering the same name again replaces the previous entry.
    pub fn register(&self, service: impl Into<String>, handler: Option<Arc<dyn Redirect>>) {
        let service = service.into();
        info!(
            service = %service,
            forwarded = handler.is_some(),
            "registered health check service"
        );
        self.services.insert(service, handler);

        if let Some(metrics) = &self.metrics {
            metrics.update_registered_services(self.services.len());
        }
    }

    pub fn register_fn<F, Fut>(&self, service: impl Into<String>, f: F)
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response<Body>> + Send + 'static,
    {
        self.register(service, Some(redirect_fn(f)));
    }

    pub fn is_registered(&self, service: &str) -> bool {
        self.services.contains_key(service)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Handler bound to this provider's registry. Services registered after the
    /// call are visible to the handler.
    pub fn build_handler(&self) -> HealthHandler {
        HealthHandler::new(
            self.services.clone(),
            self.output_format,
            self.validator.clone(),
            self.metrics.clone(),
        )
    }

    /// Client helper using the same output format.
    pub fn client(&self) -> HealthClient {
        HealthClient::new(self.output_format)
    }
}
