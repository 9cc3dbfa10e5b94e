mod auth;
mod dashboard;
mod logs;
mod password_resets;
mod users;

use axum::{middleware, Router};
use serde::Serialize;

use crate::middleware::require_admin;
use crate::AppState;

/// Routes mounted under `/admin`
pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/dashboard", dashboard::routes())
        .nest("/users", users::routes())
        .nest("/password-resets", password_resets::routes())
        .nest("/logs", logs::routes())
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    Router::new()
        .merge(auth::routes())
        .nest("/api", protected)
}

/// Success envelope shared by every admin endpoint
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data, message: None }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
        }
    }
}
