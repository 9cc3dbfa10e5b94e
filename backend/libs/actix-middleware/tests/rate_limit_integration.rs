use actix_middleware::{RateLimitConfig, RateLimitMiddleware, RateLimiter};
use actix_web::{test, web, App, HttpResponse};
use std::sync::Arc;
use std::time::Duration;

/// Simple test handler
async fn test_handler() -> HttpResponse {
    HttpResponse::Ok().body("success")
}

fn strict_config() -> RateLimitConfig {
    RateLimitConfig {
        auth_limit: 2,
        general_limit: 3,
        window: Duration::from_secs(60),
        ..RateLimitConfig::default()
    }
}

#[actix_web::test]
async fn test_rate_limit_exceeded() {
    let app = test::init_service(
        App::new()
            .wrap(RateLimitMiddleware::new(strict_config()))
            .route("/api/v1/auth/login", web::post().to(test_handler)),
    )
    .await;

    for expected_remaining in ["1", "0"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .peer_addr("10.0.0.1:5000".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers().get("X-RateLimit-Remaining").unwrap(),
            expected_remaining
        );
    }

    // Third request should be rate limited
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .peer_addr("10.0.0.1:5000".parse().unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 429);
    assert_eq!(resp.headers().get("X-RateLimit-Remaining").unwrap(), "0");

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "RATE_LIMIT_EXCEEDED");
    assert_eq!(
        body["error"]["message"],
        "Too many requests. Please try again later."
    );
}

#[actix_web::test]
async fn test_general_limit_applies_to_other_paths() {
    let app = test::init_service(
        App::new()
            .wrap(RateLimitMiddleware::new(strict_config()))
            .route("/api/v1/posts", web::get().to(test_handler)),
    )
    .await;

    for _ in 0..3 {
        let req = test::TestRequest::get()
            .uri("/api/v1/posts")
            .peer_addr("10.0.0.2:5000".parse().unwrap())
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/posts")
        .peer_addr("10.0.0.2:5000".parse().unwrap())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 429);

    // A different client still has its full budget
    let req = test::TestRequest::get()
        .uri("/api/v1/posts")
        .peer_addr("10.0.0.3:5000".parse().unwrap())
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());
}

#[actix_web::test]
async fn test_shared_limiter_can_be_reset() {
    let limiter = Arc::new(RateLimiter::new(Duration::from_secs(60)));
    let app = test::init_service(
        App::new()
            .wrap(RateLimitMiddleware::with_limiter(
                strict_config(),
                limiter.clone(),
            ))
            .route("/api/v1/auth/register", web::post().to(test_handler)),
    )
    .await;

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .to_request();
        test::call_service(&app, req).await;
    }
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 429);

    limiter.reset();

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());
}
