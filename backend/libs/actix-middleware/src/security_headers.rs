use actix_web::middleware::{Condition, DefaultHeaders};

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self'; \
    style-src 'self' 'unsafe-inline'; img-src 'self' data: https:; font-src 'self'; \
    connect-src 'self'";

/// Hardening headers, applied only when `APP_ENV=production`.
pub fn security_headers(app_env: &str) -> Condition<DefaultHeaders> {
    let headers = DefaultHeaders::new()
        .add(("Content-Security-Policy", CONTENT_SECURITY_POLICY))
        .add(("X-Frame-Options", "DENY"))
        .add(("X-Content-Type-Options", "nosniff"))
        .add((
            "Strict-Transport-Security",
            "max-age=31536000; includeSubDomains",
        ))
        .add(("X-XSS-Protection", "0"));

    Condition::new(app_env == "production", headers)
}
