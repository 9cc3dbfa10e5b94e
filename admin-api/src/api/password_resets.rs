use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use super::DataResponse;
use crate::error::Result;
use crate::models::{AdminAction, ApprovedReset, CreateAdminLog, CurrentAdmin, ResetRequest};
use crate::services::{AuditService, PasswordResetService};
use crate::utils::{client_ip, mask_token, PageInfo, PageQuery};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_requests))
        .route("/:id/approve", post(approve_request))
}

#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    pub status: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

#[derive(Debug, Serialize)]
pub struct RequestListResponse {
    pub requests: Vec<ResetRequest>,
    pub pagination: PageInfo,
}

async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<ListRequestsQuery>,
) -> Result<Json<DataResponse<RequestListResponse>>> {
    let page = query.page.params(20);
    let (requests, total) = PasswordResetService::new(state.db.clone(), &state.config.frontend_url)
        .list(&query.status, page)
        .await?;

    Ok(Json(DataResponse::new(RequestListResponse {
        requests,
        pagination: PageInfo::new(total, page),
    })))
}

async fn approve_request(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Path(request_id): Path<i64>,
) -> Result<Json<DataResponse<ApprovedReset>>> {
    let (request, approved) =
        PasswordResetService::new(state.db.clone(), &state.config.frontend_url)
            .approve(request_id, admin.id)
            .await?;

    AuditService::new(state.db.clone())
        .log(CreateAdminLog {
            admin_id: admin.id,
            admin_username: &admin.username,
            action: AdminAction::PasswordResetApprove,
            target_user_id: Some(request.user_id),
            target_username: Some(&request.username),
            details: format!(
                "Reset request ID: {}, Token: {}, Expires: {}",
                request.id,
                mask_token(&approved.token),
                approved.expires_at.to_rfc3339()
            ),
            ip: client_ip(&headers, connect.map(|c| c.0)),
        })
        .await?;

    Ok(Json(DataResponse::with_message(
        approved,
        "Password reset approved",
    )))
}
