use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::HeaderMap,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::DataResponse;
use crate::error::{AppError, Result};
use crate::models::{CreateAdminLog, CurrentAdmin, ManagedUser, UserDetail, UserStatus, UserWithPostCount};
use crate::services::{AuditService, ListUsersParams, UserService};
use crate::utils::{client_ip, PageInfo, PageQuery};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/batch-update-status", post(batch_update_status))
        .route("/:id", get(get_user))
        .route("/:id/status", patch(update_status))
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub status: Option<String>,
    pub role: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserWithPostCount>,
    pub pagination: PageInfo,
}

async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<DataResponse<UserListResponse>>> {
    let page = query.page.params(20);
    let params = ListUsersParams {
        status: query.status,
        role: query.role,
        search: query.search,
        sort: query.sort,
        order: query.order,
    };

    let (users, total) = UserService::new(state.db.clone())
        .list_users(&params, page)
        .await?;

    Ok(Json(DataResponse::new(UserListResponse {
        users,
        pagination: PageInfo::new(total, page),
    })))
}

async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<DataResponse<UserDetail>>> {
    let detail = UserService::new(state.db.clone())
        .get_user_detail(user_id)
        .await?;
    Ok(Json(DataResponse::new(detail)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct UpdatedUser {
    pub user: ManagedUser,
}

fn parse_status(value: &str) -> Result<UserStatus> {
    UserStatus::parse(value.trim()).ok_or_else(|| {
        AppError::BadRequest("status must be one of pending, approved, rejected".to_string())
    })
}

async fn update_status(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<DataResponse<UpdatedUser>>> {
    let status = parse_status(&payload.status)?;

    let (old_status, user) = UserService::new(state.db.clone())
        .update_status(user_id, status)
        .await?;

    AuditService::new(state.db.clone())
        .log(CreateAdminLog {
            admin_id: admin.id,
            admin_username: &admin.username,
            action: status.audit_action(),
            target_user_id: Some(user.id),
            target_username: Some(&user.username),
            details: format!("Status changed from {} to {}", old_status, status.as_str()),
            ip: client_ip(&headers, connect.map(|c| c.0)),
        })
        .await?;

    Ok(Json(DataResponse::with_message(
        UpdatedUser { user },
        "User status updated successfully",
    )))
}

#[derive(Debug, Deserialize, Validate)]
pub struct BatchUpdateStatusRequest {
    #[validate(length(min = 1, max = 500, message = "user_ids must contain 1 to 500 ids"))]
    pub user_ids: Vec<i64>,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct BatchUpdateResult {
    pub updated_count: usize,
}

async fn batch_update_status(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(payload): Json<BatchUpdateStatusRequest>,
) -> Result<Json<DataResponse<BatchUpdateResult>>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let status = parse_status(&payload.status)?;

    let users = UserService::new(state.db.clone());
    let audit = AuditService::new(state.db.clone());
    let ip = client_ip(&headers, connect.map(|c| c.0));

    let mut updated_count = 0;
    for user_id in users.find_existing(&payload.user_ids).await? {
        let (old_status, user) = match users.update_status(user_id, status).await {
            Ok(result) => result,
            // Deleted since the lookup
            Err(AppError::NotFound(_)) => continue,
            Err(e) => return Err(e),
        };
        updated_count += 1;

        audit
            .log(CreateAdminLog {
                admin_id: admin.id,
                admin_username: &admin.username,
                action: status.audit_action(),
                target_user_id: Some(user.id),
                target_username: Some(&user.username),
                details: format!(
                    "Batch update: Status changed from {} to {}",
                    old_status,
                    status.as_str()
                ),
                ip: ip.clone(),
            })
            .await?;
    }

    Ok(Json(DataResponse::with_message(
        BatchUpdateResult { updated_count },
        format!("{updated_count} users updated successfully"),
    )))
}
