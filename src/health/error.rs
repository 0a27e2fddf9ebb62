// src/health/error.rs
use hyper::{header, Body, Response, StatusCode};

use super::format::OutputFormat;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("bad request output format: {0}")]
    InvalidFormat(String),

    #[error("could not read from http request: {0}")]
    ReadBody(#[source] hyper::Error),

    #[error("could not unmarshal request: {0}")]
    DecodeRequest(#[from] prost::DecodeError),

    #[error("could not get service name in request body or url query")]
    MissingService,

    #[error("request validation failed: {0}")]
    Validation(String),

    #[error("could not marshal response to {format}: {reason}")]
    Encode { format: OutputFormat, reason: String },

    #[error("expected status 200 OK, got {status}. Mesg:{body}")]
    UpstreamStatus { status: StatusCode, body: String },

    #[error("could not unmarshal response: {0}")]
    DecodeResponse(String),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("could not build http request: {0}")]
    Http(#[from] hyper::http::Error),

    #[error("transport error: {0}")]
    Transport(#[from] hyper::Error),
}

impl HealthError {
    /// HTTP status used when the error is rendered by the health handler.
    pub fn status_code(&self) -> StatusCode {
        match self {
            HealthError::InvalidFormat(_)
            | HealthError::ReadBody(_)
            | HealthError::DecodeRequest(_)
            | HealthError::MissingService
            | HealthError::Validation(_) => StatusCode::BAD_REQUEST,
            HealthError::UpstreamStatus { .. } | HealthError::Transport(_) => {
                StatusCode::BAD_GATEWAY
            }
            HealthError::Encode { .. }
            | HealthError::DecodeResponse(_)
            | HealthError::InvalidUrl(_)
            | HealthError::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            HealthError::InvalidFormat(_) => "invalid_format",
            HealthError::ReadBody(_) => "read_body",
            HealthError::DecodeRequest(_) => "decode_request",
            HealthError::MissingService => "missing_service",
            HealthError::Validation(_) => "validation",
            HealthError::Encode { .. } => "encode",
            HealthError::UpstreamStatus { .. } => "upstream_status",
            HealthError::DecodeResponse(_) => "decode_response",
            HealthError::InvalidUrl(_) => "invalid_url",
            HealthError::Http(_) => "http",
            HealthError::Transport(_) => "transport",
        }
    }
}

// Plain-text error body, same shape as the handler's other rejections
impl From<HealthError> for Response<Body> {
    fn from(err: HealthError) -> Self {
        let mut response = Response::new(Body::from(err.to_string()));
        *response.status_mut() = err.status_code();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}
