// src/health/client.rs
use hyper::client::HttpConnector;
use hyper::{header, Body, Client, Method, Request, Response, StatusCode};
use tracing::debug;
use url::Url;

use super::error::HealthError;
use super::format::OutputFormat;
use super::message::{self, CheckRequest, ServingStatus};
use super::{OUTPUT_FORMAT_KEY, SERVICE_KEY};

/// Result of a decoded health check response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub serving: bool,
    /// Status name as reported by the server, e.g. `SERVING`
    pub status: String,
}

/// Builds health check requests and reads their responses in one output format.
#[derive(Debug, Clone, Copy)]
pub struct HealthClient {
    output_format: OutputFormat,
}

impl HealthClient {
    pub fn new(output_format: OutputFormat) -> Self {
        Self { output_format }
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// POST request to `url` carrying a protobuf encoded check for `service`.
    pub fn build_request(&self, service: &str, url: &str) -> Result<Request<Body>, HealthError> {
        let body = message::encode_request(&CheckRequest::new(service));

        Ok(Request::builder()
            .method(Method::POST)
            .uri(url)
            .header(header::CONTENT_TYPE, OutputFormat::Proto.content_type())
            .body(Body::from(body))?)
    }

    /// Read the response body to the end and decode the reported status.
    pub async fn decode_response(&self, response: Response<Body>) -> Result<CheckOutcome, HealthError> {
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await?;

        if status != StatusCode::OK {
            return Err(HealthError::UpstreamStatus {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        match self.output_format {
            OutputFormat::Proto | OutputFormat::Json => {
                let response = message::decode_response(&bytes, self.output_format)?;
                let status = response.status();
                Ok(CheckOutcome {
                    serving: status == ServingStatus::Serving,
                    status: status.to_string(),
                })
            }
            OutputFormat::Mesg => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                Ok(CheckOutcome {
                    serving: text == ServingStatus::Serving.as_str(),
                    status: text,
                })
            }
        }
    }

    /// Set the `service` and `format` query parameters on `base_url`.
    pub fn build_query_url(&self, service: &str, base_url: &str) -> Result<String, HealthError> {
        let mut url = Url::parse(base_url)?;

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != SERVICE_KEY && k != OUTPUT_FORMAT_KEY)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(SERVICE_KEY, service)
            .append_pair(OUTPUT_FORMAT_KEY, self.output_format.as_str());

        Ok(url.into())
    }

    /// Send one check for `service` to the health endpoint at `url`.
    pub async fn check(
        &self,
        client: &Client<HttpConnector>,
        service: &str,
        url: &str,
    ) -> Result<CheckOutcome, HealthError> {
        let url = self.build_query_url(service, url)?;
        let request = self.build_request(service, &url)?;

        debug!(%url, service, "sending health check");
        let response = client.request(request).await?;
        self.decode_response(response).await
    }
}
