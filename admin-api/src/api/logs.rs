use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::DataResponse;
use crate::error::Result;
use crate::models::AdminLog;
use crate::services::{AuditService, LogFilters};
use crate::utils::{PageInfo, PageQuery};
use crate::AppState;

const DEFAULT_LOG_LIMIT: i64 = 50;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_logs))
}

#[derive(Debug, Deserialize)]
pub struct ListLogsQuery {
    pub action: Option<String>,
    pub admin_username: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

#[derive(Debug, Serialize)]
pub struct LogListResponse {
    pub logs: Vec<AdminLog>,
    pub pagination: PageInfo,
}

async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<ListLogsQuery>,
) -> Result<Json<DataResponse<LogListResponse>>> {
    let page = query.page.params(DEFAULT_LOG_LIMIT);
    let filters = LogFilters {
        action: query.action,
        admin_username: query.admin_username,
        start_date: query.start_date,
        end_date: query.end_date,
    };

    let (logs, total) = AuditService::new(state.db.clone())
        .list(&filters, page)
        .await?;

    Ok(Json(DataResponse::new(LogListResponse {
        logs,
        pagination: PageInfo::new(total, page),
    })))
}
