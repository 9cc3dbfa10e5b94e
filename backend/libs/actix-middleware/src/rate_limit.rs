use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::{
        header::{HeaderName, HeaderValue},
        StatusCode,
    },
    Error, HttpResponse, ResponseError,
};
use dashmap::DashMap;
use futures::future::{ready, LocalBoxFuture, Ready};
use serde_json::json;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

const DEFAULT_AUTH_PATHS: [&str; 3] = [
    "/api/v1/auth/register",
    "/api/v1/auth/login",
    "/api/v1/auth/password-reset",
];

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests per window for authentication endpoints
    pub auth_limit: u32,
    /// Requests per window for every other endpoint
    pub general_limit: u32,
    pub window: Duration,
    /// Path prefixes that use `auth_limit`
    pub auth_paths: Vec<String>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            auth_limit: 5,
            general_limit: 60,
            window: Duration::from_secs(60),
            auth_paths: DEFAULT_AUTH_PATHS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl RateLimitConfig {
    /// Limits for the given `APP_ENV`; development and test are relaxed.
    pub fn for_environment(env: &str) -> Self {
        match env {
            "development" | "test" => Self {
                auth_limit: 1000,
                general_limit: 1000,
                ..Self::default()
            },
            _ => Self::default(),
        }
    }

    fn limit_for(&self, path: &str) -> u32 {
        if self.auth_paths.iter().any(|p| path.starts_with(p.as_str())) {
            self.auth_limit
        } else {
            self.general_limit
        }
    }
}

#[derive(Debug)]
struct ClientWindow {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window counters keyed by client IP
#[derive(Debug)]
pub struct RateLimiter {
    clients: DashMap<String, ClientWindow>,
    window: Duration,
    last_cleanup: std::sync::Mutex<Instant>,
}

impl RateLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            clients: DashMap::new(),
            window,
            last_cleanup: std::sync::Mutex::new(Instant::now()),
        }
    }

    /// Count one request. Returns whether it is allowed and how many remain.
    pub fn check(&self, client: &str, limit: u32) -> (bool, u32) {
        let now = Instant::now();
        self.maybe_cleanup(now);

        let mut entry = self
            .clients
            .entry(client.to_string())
            .or_insert_with(|| ClientWindow {
                count: 0,
                reset_at: now + self.window,
            });

        if now >= entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + self.window;
        }

        if entry.count >= limit {
            return (false, 0);
        }

        entry.count += 1;
        (true, limit - entry.count)
    }

    pub fn reset(&self) {
        self.clients.clear();
    }

    fn maybe_cleanup(&self, now: Instant) {
        let Ok(mut last) = self.last_cleanup.try_lock() else {
            return;
        };
        if now.duration_since(*last) < self.window {
            return;
        }
        *last = now;
        drop(last);
        self.clients.retain(|_, w| now < w.reset_at);
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Too many requests. Please try again later.")]
pub struct RateLimitExceeded;

impl ResponseError for RateLimitExceeded {
    fn status_code(&self) -> StatusCode {
        StatusCode::TOO_MANY_REQUESTS
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header((RATE_LIMIT_REMAINING, "0"))
            .json(json!({
                "error": {
                    "code": "RATE_LIMIT_EXCEEDED",
                    "message": self.to_string(),
                }
            }))
    }
}

pub struct RateLimitMiddleware {
    config: RateLimitConfig,
    limiter: Arc<RateLimiter>,
}

impl RateLimitMiddleware {
    pub fn new(config: RateLimitConfig) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.window));
        Self { config, limiter }
    }

    /// Share counters with the caller, e.g. to reset them between tests
    pub fn with_limiter(config: RateLimitConfig, limiter: Arc<RateLimiter>) -> Self {
        Self { config, limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            config: self.config.clone(),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    config: RateLimitConfig,
    limiter: Arc<RateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let client = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();
        let limit = self.config.limit_for(req.path());
        let (allowed, remaining) = self.limiter.check(&client, limit);

        if !allowed {
            tracing::warn!(client = %client, path = %req.path(), "Rate limit exceeded");
            let res = req.error_response(RateLimitExceeded);
            return Box::pin(async move { Ok(res.map_into_right_body()) });
        }

        let service = self.service.clone();
        Box::pin(async move {
            let mut res = service.call(req).await?;
            res.headers_mut()
                .insert(RATE_LIMIT_REMAINING, HeaderValue::from(remaining));
            Ok(res.map_into_left_body())
        })
    }
}
