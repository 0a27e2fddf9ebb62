// src/main.rs
use anyhow::{Context, Result};
use hyper::{header, Body, Request, Response, Server, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use health_facade::{
    config::{self, Config},
    health::{BearerTokenValidator, HealthProvider, Redirect, UpstreamRedirect},
    metrics::MetricsRegistry,
    server::{RequestHandler, ServerBuilder},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("health_facade=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config(&config_path).await?;

    let mut provider = HealthProvider::new(config.health.output_format);

    if let Some(auth) = &config.auth {
        provider = provider.with_validator(Arc::new(BearerTokenValidator::new(
            auth.bearer_tokens.iter().cloned(),
        )));
    }

    if config.metrics.enabled {
        let registry = MetricsRegistry::new()?;
        provider = provider.with_metrics(registry.collector());

        let metrics_addr: SocketAddr = ([0, 0, 0, 0], config.metrics.port).into();
        start_metrics_server(metrics_addr, registry, config.metrics.path.clone())?;
    }

    register_services(&provider, &config);

    let handler = RequestHandler::new(config.health.route.as_str(), provider.build_handler());

    info!(
        "Serving health checks on {}{} ({} services, format {})",
        config.listen_addr,
        config.health.route,
        provider.len(),
        provider.output_format()
    );

    ServerBuilder::new(config.listen_addr)
        .with_handler(handler)
        .serve_with_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn register_services(provider: &HealthProvider, config: &Config) {
    for service in &config.health.services {
        let redirect = service
            .upstream
            .clone()
            .map(|url| Arc::new(UpstreamRedirect::new(url)) as Arc<dyn Redirect>);
        provider.register(service.name.clone(), redirect);
    }
}

fn start_metrics_server(addr: SocketAddr, registry: MetricsRegistry, path: String) -> Result<()> {
    let registry = Arc::new(registry);
    let path: Arc<str> = path.into();
    let service_path = path.clone();

    let make_service = hyper::service::make_service_fn(move |_| {
        let registry = registry.clone();
        let path = service_path.clone();

        async move {
            Ok::<_, Infallible>(hyper::service::service_fn(move |req: Request<Body>| {
                let registry = registry.clone();
                let path = path.clone();

                async move {
                    let response = if req.uri().path() == &*path {
                        match registry.gather() {
                            Ok(metrics) => {
                                let mut response = Response::new(Body::from(metrics));
                                response.headers_mut().insert(
                                    header::CONTENT_TYPE,
                                    header::HeaderValue::from_static("text/plain; version=0.0.4"),
                                );
                                response
                            }
                            Err(e) => {
                                error!("Failed to encode metrics: {}", e);
                                status_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                            }
                        }
                    } else {
                        status_response(StatusCode::NOT_FOUND, "Not Found")
                    };
                    Ok::<_, Infallible>(response)
                }
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .with_context(|| format!("failed to bind metrics server on {}", addr))?
        .serve(make_service);

    info!("Metrics server listening on http://{}{}", addr, path);

    tokio::spawn(async move {
        if let Err(e) = server.await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(())
}

fn status_response(status: StatusCode, message: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
