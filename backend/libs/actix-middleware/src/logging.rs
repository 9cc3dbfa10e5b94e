//! Logging middleware
//!
//! Emits one structured `access` event per request using tracing.

use crate::jwt_auth::UserId;
use crate::request_id::RequestId;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::time::Instant;

/// Middleware that logs HTTP requests and responses
///
/// Wrap it inside `RequestIdMiddleware` so the request id is available.
#[derive(Clone, Default)]
pub struct Logging;

impl<S, B> Transform<S, ServiceRequest> for Logging
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggingService { service }))
    }
}

pub struct LoggingService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for LoggingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_string();
        let query = req.query_string().to_string();
        let remote_ip = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("-")
            .to_string();
        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_default();

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            let latency = start.elapsed();
            // Set by the auth middleware further down the stack
            let user_id = res.request().extensions().get::<UserId>().map(|u| u.0);

            tracing::info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = res.status().as_u16(),
                latency_ms = latency.as_millis() as u64,
                remote_ip = %remote_ip,
                user_id = ?user_id,
                query = %query,
                user_agent = %user_agent,
                "access"
            );

            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request_id::RequestIdMiddleware;
    use actix_web::{test, web, App, HttpResponse};

    #[actix_web::test]
    async fn test_logging_is_transparent() {
        let app = test::init_service(
            App::new()
                .wrap(Logging)
                .wrap(RequestIdMiddleware)
                .route("/ok", web::get().to(|| async { HttpResponse::Created().finish() })),
        )
        .await;

        let req = test::TestRequest::get().uri("/ok?limit=5").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        assert!(resp.headers().contains_key("x-request-id"));
    }
}
