//! # Actix Middleware Library
//!
//! Shared middleware components for the SNS Actix services
//!
//! ## Modules
//! - `jwt_auth`: JWT authentication middleware and `UserId` extractors
//! - `rate_limit`: in-memory fixed-window rate limiting per client IP
//! - `request_id`: `X-Request-ID` generation
//! - `logging`: structured access log
//! - `security_headers`: response hardening headers for production

pub mod jwt_auth;
pub mod logging;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use jwt_auth::{AccountGate, AuthError, JwtAuthMiddleware, OptionalUserId, UserId};
pub use logging::Logging;
pub use rate_limit::{RateLimitConfig, RateLimitMiddleware, RateLimiter};
pub use request_id::{RequestId, RequestIdMiddleware};
pub use security_headers::security_headers;
