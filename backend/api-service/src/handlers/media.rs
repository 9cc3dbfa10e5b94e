/// Media upload, deletion and file serving
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::media::MAX_VIDEO_SIZE;
use crate::services::media::{MediaService, UploadedFile, MAX_MEDIA_PER_POST};
use crate::utils::response;
use actix_middleware::UserId;
use actix_multipart::Multipart;
use actix_web::{http::header, web, HttpResponse};
use futures::StreamExt;
use sqlx::PgPool;

/// Multipart field carrying the files
const FILES_FIELD: &str = "files";

/// Collect every `files` part. Reading stops early once a part exceeds the
/// largest per-type limit or more parts arrive than a post can hold.
async fn read_files(mut payload: Multipart) -> Result<Vec<UploadedFile>> {
    let mut files = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?;

        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        if files.len() == MAX_MEDIA_PER_POST {
            return Err(AppError::BadRequest("maximum 4 media files allowed".to_string()));
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;
            data.extend_from_slice(&chunk);
            if data.len() as u64 > MAX_VIDEO_SIZE {
                return Err(AppError::BadRequest("file size exceeds limit".to_string()));
            }
        }

        files.push(UploadedFile { filename, data });
    }

    Ok(files)
}

pub async fn upload_media(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    post_id: web::Path<i64>,
    user_id: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let files = read_files(payload).await?;
    let media = MediaService::new((**pool).clone(), &config.media)
        .upload(*post_id, user_id.0, files)
        .await?;
    Ok(response::created(media))
}

pub async fn delete_media(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    media_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    MediaService::new((**pool).clone(), &config.media)
        .delete(*media_id, user_id.0)
        .await?;
    Ok(response::message("media deleted successfully"))
}

/// `GET /uploads/{name}`
pub async fn serve_file(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    name: web::Path<String>,
) -> Result<HttpResponse> {
    let (data, content_type) = MediaService::new((**pool).clone(), &config.media)
        .read_file(&name)
        .await?;

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(data))
}
