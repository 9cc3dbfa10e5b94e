use axum::{extract::State, routing::get, Json, Router};

use super::DataResponse;
use crate::error::Result;
use crate::services::{ChartData, ChartSeries, DashboardService, DashboardStats};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/charts/posts", get(get_posts_chart))
        .route("/charts/users", get(get_users_chart))
}

async fn get_stats(State(state): State<AppState>) -> Result<Json<DataResponse<DashboardStats>>> {
    let stats = DashboardService::new(state.db.clone()).get_stats().await?;
    Ok(Json(DataResponse::new(stats)))
}

async fn get_posts_chart(State(state): State<AppState>) -> Result<Json<DataResponse<ChartData>>> {
    let chart = DashboardService::new(state.db.clone())
        .chart(ChartSeries::Posts)
        .await?;
    Ok(Json(DataResponse::new(chart)))
}

async fn get_users_chart(State(state): State<AppState>) -> Result<Json<DataResponse<ChartData>>> {
    let chart = DashboardService::new(state.db.clone())
        .chart(ChartSeries::Users)
        .await?;
    Ok(Json(DataResponse::new(chart)))
}
