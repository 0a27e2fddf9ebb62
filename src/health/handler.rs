// ────────────────────────────────
// src/health/handler.rs
// Per-request health check: format negotiation, request decoding,
// registry dispatch and response encoding.
// ────────────────────────────────
use async_trait::async_trait;
use hyper::http::request::Parts;
use hyper::{header, Body, Request, Response, StatusCode, Uri};
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;
use tracing::{debug, error, warn};

use super::error::HealthError;
use super::format::OutputFormat;
use super::message::{self, CheckRequest, CheckResponse, ServingStatus};
use super::provider::ServiceRegistry;
use super::redirect::Redirect;
use super::validator::RequestValidator;
use super::{OUTPUT_FORMAT_KEY, SERVICE_KEY};
use crate::metrics::MetricsCollector;

#[derive(Clone)]
pub struct HealthHandler {
    services: Arc<ServiceRegistry>,
    output_format: OutputFormat,
    validator: Option<Arc<dyn RequestValidator>>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl HealthHandler {
    pub(crate) fn new(
        services: Arc<ServiceRegistry>,
        output_format: OutputFormat,
        validator: Option<Arc<dyn RequestValidator>>,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        Self {
            services,
            output_format,
            validator,
            metrics,
        }
    }

    /// Answer one health check. Failures are rendered as plain-text error responses.
    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        match self.process(req).await {
            Ok(response) => response,
            Err(e) => {
                if e.status_code().is_server_error() {
                    error!(error = %e, "health check failed");
                } else {
                    warn!(error = %e, "health check rejected");
                }
                if let Some(metrics) = &self.metrics {
                    metrics.record_error(e.kind());
                }
                e.into()
            }
        }
    }

    async fn process(&self, req: Request<Body>) -> Result<Response<Body>, HealthError> {
        if let Some(validator) = &self.validator {
            validator.validate(&req).map_err(HealthError::Validation)?;
        }

        let output_format = match query_value(req.uri(), OUTPUT_FORMAT_KEY) {
            Some(value) => value.parse::<OutputFormat>()?,
            None => self.output_format,
        };

        let (parts, body) = req.into_parts();
        let bytes = hyper::body::to_bytes(body)
            .await
            .map_err(HealthError::ReadBody)?;

        let request = if !bytes.is_empty() {
            message::decode_request(&bytes)?
        } else {
            let service =
                query_value(&parts.uri, SERVICE_KEY).ok_or(HealthError::MissingService)?;
            CheckRequest::new(service)
        };

        // Clone the entry out so no shard lock is held across the forward
        let entry = self
            .services
            .get(&request.service)
            .map(|entry| entry.value().clone());

        let status = match entry {
            None => ServingStatus::ServiceUnknown,
            Some(None) => ServingStatus::Serving,
            Some(Some(redirect)) => {
                debug!(service = %request.service, "forwarding health check");
                if let Some(metrics) = &self.metrics {
                    metrics.record_forward(&request.service);
                }
                return Ok(forward(parts, &request, redirect.as_ref()).await);
            }
        };

        debug!(
            service = %request.service,
            status = %status,
            format = %output_format,
            "answering health check"
        );

        let body = message::encode_response(&CheckResponse::with_status(status), output_format)?;
        if let Some(metrics) = &self.metrics {
            metrics.record_check(output_format.as_str(), status.as_str());
        }

        Ok(Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, output_format.content_type())
            .body(Body::from(body))?)
    }
}

// Re-encode the check and hand the original request head to the redirect.
async fn forward(
    mut parts: Parts,
    request: &CheckRequest,
    redirect: &dyn Redirect,
) -> Response<Body> {
    let encoded = message::encode_request(request);
    parts
        .headers
        .insert(header::CONTENT_LENGTH, header::HeaderValue::from(encoded.len()));
    redirect
        .handle(Request::from_parts(parts, Body::from(encoded)))
        .await
}

// First value for `key`, if any.
fn query_value(uri: &Uri, key: &str) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Lets one provider's handler be registered as another provider's redirect.
#[async_trait]
impl Redirect for HealthHandler {
    async fn handle(&self, req: Request<Body>) -> Response<Body> {
        HealthHandler::handle(self, req).await
    }
}

impl Service<Request<Body>> for HealthHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move { Ok(handler.handle(req).await) })
    }
}
