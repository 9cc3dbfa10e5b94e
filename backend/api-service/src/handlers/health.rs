use crate::config::Config;
use actix_web::{web, HttpResponse};

/// `GET /health`
pub async fn health(config: web::Data<Config>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "env": config.app.env,
    }))
}
