use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::DataResponse;
use crate::error::{AppError, Result};
use crate::services::AuthService;
use crate::utils::{admin_cookie, clear_admin_cookie};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub admin: AdminInfo,
}

#[derive(Debug, Serialize)]
pub struct AdminInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let (admin, token) = AuthService::new(state.db.clone())
        .authenticate(payload.username.trim(), &payload.password)
        .await?;

    let cookie = admin_cookie(&token, state.config.is_production());
    let body = DataResponse::with_message(
        LoginResponse {
            token,
            admin: AdminInfo {
                id: admin.id,
                username: admin.username,
                email: admin.email,
            },
        },
        "Login successful",
    );

    Ok(([(SET_COOKIE, cookie)], Json(body)))
}

async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = clear_admin_cookie(state.config.is_production());
    (
        [(SET_COOKIE, cookie)],
        Json(DataResponse::with_message((), "Logged out successfully")),
    )
}
