use super::pagination::Pagination;
use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct PageEnvelope<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// `200 {"data": ...}`
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(DataEnvelope { data })
}

/// `201 {"data": ...}`
pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(DataEnvelope { data })
}

/// `200 {"data": {"message": ...}}`
pub fn message(msg: &str) -> HttpResponse {
    ok(serde_json::json!({ "message": msg }))
}

pub fn page<T: Serialize>(data: Vec<T>, pagination: Pagination) -> HttpResponse {
    HttpResponse::Ok().json(PageEnvelope { data, pagination })
}
