// src/health/redirect.rs
use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::{header, Body, Client, Method, Request, Response};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use super::error::HealthError;
use super::format::OutputFormat;

/// A service-specific health handler that a check can be forwarded to.
///
/// The forwarded request carries a protobuf encoded `CheckRequest` body and the
/// original URI and headers. Whatever the redirect returns is sent to the caller
/// unchanged.
#[async_trait]
pub trait Redirect: Send + Sync {
    async fn handle(&self, req: Request<Body>) -> Response<Body>;
}

/// Adapter turning an async closure into a [`Redirect`].
pub struct RedirectFn<F>(F);

#[async_trait]
impl<F, Fut> Redirect for RedirectFn<F>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response<Body>> + Send + 'static,
{
    async fn handle(&self, req: Request<Body>) -> Response<Body> {
        (self.0)(req).await
    }
}

pub fn redirect_fn<F, Fut>(f: F) -> Arc<dyn Redirect>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response<Body>> + Send + 'static,
{
    Arc::new(RedirectFn(f))
}

/// Forwards checks to a health endpoint of another process over HTTP.
pub struct UpstreamRedirect {
    url: Url,
    client: Client<HttpConnector>,
}

impl UpstreamRedirect {
    pub fn new(url: Url) -> Self {
        Self::with_client(url, Client::new())
    }

    pub fn with_client(url: Url, client: Client<HttpConnector>) -> Self {
        Self { url, client }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn forward(&self, req: Request<Body>) -> Result<Response<Body>, HealthError> {
        let mut target = self.url.clone();
        // Keep the caller's `format` so the upstream answers in the negotiated encoding
        if let Some(query) = req.uri().query() {
            let format = url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == super::OUTPUT_FORMAT_KEY)
                .map(|(_, value)| value.into_owned());
            if let Some(format) = format {
                target
                    .query_pairs_mut()
                    .append_pair(super::OUTPUT_FORMAT_KEY, &format);
            }
        }

        let body = hyper::body::to_bytes(req.into_body()).await?;
        let outbound = Request::builder()
            .method(Method::POST)
            .uri(target.as_str())
            .header(header::CONTENT_TYPE, OutputFormat::Proto.content_type())
            .body(Body::from(body))?;

        debug!(upstream = %target, "forwarding health check");
        Ok(self.client.request(outbound).await?)
    }
}

#[async_trait]
impl Redirect for UpstreamRedirect {
    async fn handle(&self, req: Request<Body>) -> Response<Body> {
        match self.forward(req).await {
            Ok(response) => response,
            Err(e) => {
                warn!(upstream = %self.url, error = %e, "health check forward failed");
                e.into()
            }
        }
    }
}
