// src/server/handler.rs
use hyper::{header, Body, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use tower::Service;

use crate::health::HealthHandler;

/// Routes the health endpoint to a [`HealthHandler`] and rejects everything else.
#[derive(Clone)]
pub struct RequestHandler {
    route: Arc<str>,
    health: HealthHandler,
}

impl RequestHandler {
    pub fn new(route: impl Into<Arc<str>>, health: HealthHandler) -> Self {
        Self {
            route: route.into(),
            health,
        }
    }

    pub async fn route(&self, req: Request<Body>) -> Response<Body> {
        if req.uri().path() != &*self.route {
            return plain(StatusCode::NOT_FOUND, "Not Found");
        }

        match *req.method() {
            Method::GET | Method::POST => self.health.handle(req).await,
            _ => {
                let mut response = plain(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
                response.headers_mut().insert(
                    header::ALLOW,
                    header::HeaderValue::from_static("GET, POST"),
                );
                response
            }
        }
    }
}

fn plain(status: StatusCode, message: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move { Ok(handler.route(req).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{HealthProvider, OutputFormat, STD_ROUTE};

    fn handler() -> RequestHandler {
        let provider = HealthProvider::new(OutputFormat::Mesg);
        provider.register("svc-a", None);
        RequestHandler::new(STD_ROUTE, provider.build_handler())
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let response = handler()
            .route(Request::get("/other").body(Body::empty()).unwrap())
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_other_methods_are_rejected() {
        let response = handler()
            .route(
                Request::delete("/health?service=svc-a")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, POST");
    }

    #[tokio::test]
    async fn test_health_route_is_served() {
        let response = handler()
            .route(Request::get("/health?service=svc-a").body(Body::empty()).unwrap())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert_eq!(body.as_ref(), b"SERVING");
    }
}
