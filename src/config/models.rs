// src/config/models.rs
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use url::Url;

use crate::health::{OutputFormat, STD_ROUTE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_route")]
    pub route: String,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    /// Health endpoint of the service. Checks for this service are forwarded there.
    #[serde(default)]
    pub upstream: Option<Url>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub bearer_tokens: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_route() -> String {
    STD_ROUTE.to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            route: default_route(),
            output_format: OutputFormat::default(),
            services: Vec::new(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
            path: default_metrics_path(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !self.health.route.starts_with('/') {
            bail!("health route must start with '/': {}", self.health.route);
        }

        let mut seen = HashSet::new();
        for service in &self.health.services {
            if service.name.is_empty() {
                bail!("service name must not be empty");
            }
            if !seen.insert(service.name.as_str()) {
                bail!("duplicate service: {}", service.name);
            }
            if let Some(upstream) = &service.upstream {
                if upstream.scheme() != "http" {
                    bail!(
                        "upstream for {} must use http, got {}",
                        service.name,
                        upstream.scheme()
                    );
                }
            }
        }

        if let Some(auth) = &self.auth {
            if auth.bearer_tokens.is_empty() {
                bail!("auth.bearer_tokens must not be empty when auth is configured");
            }
        }

        if self.metrics.enabled {
            if !self.metrics.path.starts_with('/') {
                bail!("metrics path must start with '/': {}", self.metrics.path);
            }
            if self.metrics.port == self.listen_addr.port() {
                bail!("metrics port {} collides with listen_addr", self.metrics.port);
            }
        }

        Ok(())
    }
}
