// src/health/mod.rs
//! Health check façade: a registry of services whose checks are answered
//! locally or forwarded, an HTTP handler that negotiates the response encoding,
//! and a client helper that speaks the same protocol.
mod client;
mod error;
mod format;
mod handler;
mod message;
mod provider;
mod redirect;
mod validator;

pub use client::{CheckOutcome, HealthClient};
pub use error::HealthError;
pub use format::OutputFormat;
pub use handler::HealthHandler;
pub use message::{
    decode_request, decode_response, encode_request, encode_response, CheckRequest, CheckResponse,
    ServingStatus,
};
pub use provider::HealthProvider;
pub use redirect::{redirect_fn, Redirect, RedirectFn, UpstreamRedirect};
pub use validator::{BearerTokenValidator, RequestValidator};

/// Default route for the health endpoint.
pub const STD_ROUTE: &str = "/health";

/// Query parameter naming the service to check.
pub const SERVICE_KEY: &str = "service";

/// Query parameter overriding the output format.
pub const OUTPUT_FORMAT_KEY: &str = "format";
