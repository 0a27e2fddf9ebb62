// src/health/validator.rs
use hyper::{header, Body, Request};
use std::collections::HashSet;

/// Request gate run before a health check is processed.
///
/// Any error short-circuits the check with 400 and the error text as body.
pub trait RequestValidator: Send + Sync {
    fn validate(&self, req: &Request<Body>) -> Result<(), String>;
}

impl<F> RequestValidator for F
where
    F: Fn(&Request<Body>) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, req: &Request<Body>) -> Result<(), String> {
        self(req)
    }
}

/// Accepts requests carrying `Authorization: Bearer <token>` for one of a fixed set of tokens.
#[derive(Debug, Clone)]
pub struct BearerTokenValidator {
    tokens: HashSet<String>,
}

impl BearerTokenValidator {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }
}

impl RequestValidator for BearerTokenValidator {
    fn validate(&self, req: &Request<Body>) -> Result<(), String> {
        let value = req
            .headers()
            .get(header::AUTHORIZATION)
            .ok_or_else(|| "missing Authorization header".to_string())?;

        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                "invalid Authorization header format (expected 'Bearer <token>')".to_string()
            })?;

        if self.tokens.contains(token.trim()) {
            Ok(())
        } else {
            Err("invalid token".to_string())
        }
    }
}
