/// Authentication endpoints
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::PublicUser;
use crate::services::{
    AuthService, AuthSession, EmailService, EmailVerificationService, PasswordResetService,
};
use crate::utils::cookies::{clear_auth_cookies, set_auth_cookies};
use crate::utils::response;
use actix_middleware::jwt_auth::REFRESH_TOKEN_COOKIE;
use actix_middleware::UserId;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequestBody {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirmBody {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailBody {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

fn session_response(mut builder: actix_web::HttpResponseBuilder, session: AuthSession, production: bool) -> HttpResponse {
    set_auth_cookies(
        &mut builder,
        &session.access_token,
        &session.refresh_token,
        production,
    );
    builder.json(response::DataEnvelope {
        data: AuthResponse {
            user: session.user,
            token: session.access_token,
        },
    })
}

/// Refresh token from the cookie, falling back to the JSON body
fn presented_refresh_token(req: &HttpRequest, body: Option<&RefreshRequest>) -> Option<String> {
    req.cookie(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| body.and_then(|b| b.refresh_token.clone()))
        .filter(|v| !v.is_empty())
}

pub async fn register(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    email: web::Data<EmailService>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let service = AuthService::new((**pool).clone(), config.app.auto_approve_users);
    let verification = EmailVerificationService::new((**pool).clone(), email.get_ref().clone());

    let session = service
        .register(&req.email, &req.password, &req.username, &verification)
        .await?;

    Ok(session_response(
        HttpResponse::Created(),
        session,
        config.is_production(),
    ))
}

pub async fn login(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let service = AuthService::new((**pool).clone(), config.app.auto_approve_users);
    let session = service.login(&req.email, &req.password).await?;

    Ok(session_response(HttpResponse::Ok(), session, config.is_production()))
}

pub async fn me(pool: web::Data<PgPool>, config: web::Data<Config>, user_id: UserId) -> Result<HttpResponse> {
    let service = AuthService::new((**pool).clone(), config.app.auto_approve_users);
    Ok(response::ok(service.me(user_id.0).await?))
}

/// Rotate the refresh token. Failures clear both auth cookies.
pub async fn refresh(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    body: Option<web::Json<RefreshRequest>>,
) -> Result<HttpResponse> {
    let production = config.is_production();
    let unauthorized = |message: &str| {
        let mut builder = HttpResponse::Unauthorized();
        clear_auth_cookies(&mut builder, production);
        builder.json(serde_json::json!({ "error": { "message": message } }))
    };

    let Some(raw) = presented_refresh_token(&req, body.as_deref()) else {
        return Ok(unauthorized("refresh token required"));
    };

    let service = AuthService::new((**pool).clone(), config.app.auto_approve_users);
    match service.refresh(&raw).await {
        Ok(session) => Ok(session_response(HttpResponse::Ok(), session, production)),
        Err(AppError::Unauthorized(message)) => Ok(unauthorized(&message)),
        Err(e) => Err(e),
    }
}

pub async fn logout(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    body: Option<web::Json<RefreshRequest>>,
) -> Result<HttpResponse> {
    let raw = presented_refresh_token(&req, body.as_deref());
    let service = AuthService::new((**pool).clone(), config.app.auto_approve_users);
    service.logout(raw.as_deref()).await?;

    let mut builder = HttpResponse::Ok();
    clear_auth_cookies(&mut builder, config.is_production());
    Ok(builder.json(response::DataEnvelope {
        data: serde_json::json!({ "message": "logged out successfully" }),
    }))
}

pub async fn revoke_all(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let service = AuthService::new((**pool).clone(), config.app.auto_approve_users);
    let revoked = service.revoke_all(user_id.0).await?;

    let mut builder = HttpResponse::Ok();
    clear_auth_cookies(&mut builder, config.is_production());
    Ok(builder.json(response::DataEnvelope {
        data: serde_json::json!({
            "message": "all sessions have been revoked",
            "revoked": revoked,
        }),
    }))
}

pub async fn request_password_reset(
    pool: web::Data<PgPool>,
    email: web::Data<EmailService>,
    req: web::Json<PasswordResetRequestBody>,
) -> Result<HttpResponse> {
    let service = PasswordResetService::new((**pool).clone(), email.get_ref().clone());
    service.request_reset(&req.email).await?;

    Ok(response::message(
        "if the email exists, a password reset link has been sent",
    ))
}

pub async fn confirm_password_reset(
    pool: web::Data<PgPool>,
    email: web::Data<EmailService>,
    req: web::Json<PasswordResetConfirmBody>,
) -> Result<HttpResponse> {
    let service = PasswordResetService::new((**pool).clone(), email.get_ref().clone());
    service.confirm_reset(&req.token, &req.new_password).await?;

    Ok(response::message("password has been reset successfully"))
}

pub async fn verify_email(
    pool: web::Data<PgPool>,
    email: web::Data<EmailService>,
    req: web::Json<VerifyEmailBody>,
) -> Result<HttpResponse> {
    let service = EmailVerificationService::new((**pool).clone(), email.get_ref().clone());
    service.verify(&req.token).await?;

    Ok(response::message("email verified successfully"))
}

pub async fn resend_verification(
    pool: web::Data<PgPool>,
    email: web::Data<EmailService>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let service = EmailVerificationService::new((**pool).clone(), email.get_ref().clone());
    service.resend(user_id.0).await?;

    Ok(response::message("verification email sent"))
}
