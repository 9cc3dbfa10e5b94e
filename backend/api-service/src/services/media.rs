/// Post attachments stored on the local filesystem
use crate::config::MediaConfig;
use crate::db::media_repo;
use crate::error::{AppError, Result};
use crate::models::{Media, MediaType};
use crate::services::PostService;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const MAX_MEDIA_PER_POST: usize = 4;

/// A file received from a multipart upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

pub struct MediaService {
    pool: PgPool,
    dir: PathBuf,
    base_url: String,
}

impl MediaService {
    pub fn new(pool: PgPool, config: &MediaConfig) -> Self {
        Self {
            pool,
            dir: PathBuf::from(&config.dir),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Validate every file before anything is written
    pub fn classify(files: &[UploadedFile]) -> Result<Vec<MediaType>> {
        if files.is_empty() {
            return Err(AppError::BadRequest("no files uploaded".to_string()));
        }
        if files.len() > MAX_MEDIA_PER_POST {
            return Err(AppError::BadRequest("maximum 4 media files allowed".to_string()));
        }

        files
            .iter()
            .map(|file| {
                let media_type = MediaType::from_filename(&file.filename).ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "unsupported file format: {}",
                        extension_of(&file.filename)
                    ))
                })?;

                if file.data.len() as u64 > media_type.max_size() {
                    return Err(AppError::BadRequest(media_type.size_error()));
                }
                Ok(media_type)
            })
            .collect()
    }

    pub async fn upload(
        &self,
        post_id: i64,
        user_id: i64,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<Media>> {
        PostService::new(self.pool.clone())
            .ensure_owner(post_id, user_id)
            .await?;

        let types = Self::classify(&files)?;

        tokio::fs::create_dir_all(&self.dir).await?;

        let mut written = Vec::with_capacity(files.len());
        match self.store(post_id, &files, &types, &mut written).await {
            Ok(stored) => {
                tracing::info!(post_id, user_id, count = stored.len(), "Media uploaded");
                Ok(stored)
            }
            Err(e) => {
                for path in &written {
                    if let Err(err) = tokio::fs::remove_file(path).await {
                        tracing::warn!(path = %path.display(), error = %err, "Failed to remove media file");
                    }
                }
                Err(e)
            }
        }
    }

    /// Write the files and insert their rows in one transaction. Every path
    /// written is recorded in `written` so the caller can clean up when this
    /// fails before the commit.
    async fn store(
        &self,
        post_id: i64,
        files: &[UploadedFile],
        types: &[MediaType],
        written: &mut Vec<PathBuf>,
    ) -> Result<Vec<Media>> {
        let mut tx = self.pool.begin().await?;

        let existing = media_repo::lock_and_count(&mut tx, post_id).await? as usize;
        if existing + files.len() > MAX_MEDIA_PER_POST {
            return Err(AppError::BadRequest("maximum 4 media files allowed".to_string()));
        }

        let mut stored = Vec::with_capacity(files.len());
        for (index, (file, media_type)) in files.iter().zip(types).enumerate() {
            let name = format!(
                "{}{}",
                Uuid::new_v4(),
                extension_of(&file.filename).to_ascii_lowercase()
            );
            let path = self.dir.join(&name);
            tokio::fs::write(&path, &file.data).await?;
            written.push(path);

            let media = media_repo::insert_media(
                &mut tx,
                post_id,
                media_type.as_str(),
                &format!("{}/{}", self.base_url, name),
                file.data.len() as i64,
                (existing + index) as i32,
            )
            .await?;
            stored.push(media);
        }

        tx.commit().await?;
        Ok(stored)
    }

    pub async fn delete(&self, media_id: i64, user_id: i64) -> Result<()> {
        let (media, owner) = media_repo::find_with_owner(&self.pool, media_id)
            .await?
            .ok_or_else(|| AppError::NotFound("media not found".to_string()))?;

        if owner != user_id {
            return Err(AppError::Forbidden("unauthorized".to_string()));
        }

        media_repo::delete_media(&self.pool, media_id).await?;

        if let Some(name) = media.media_url.rsplit('/').next() {
            if let Err(e) = tokio::fs::remove_file(self.dir.join(name)).await {
                tracing::warn!(media_id, error = %e, "Failed to remove media file");
            }
        }
        Ok(())
    }

    /// Read a stored file for serving. Names containing path separators are
    /// rejected.
    pub async fn read_file(&self, name: &str) -> Result<(Vec<u8>, &'static str)> {
        let not_found = || AppError::NotFound("media not found".to_string());

        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(not_found());
        }

        let data = tokio::fs::read(self.dir.join(name))
            .await
            .map_err(|_| not_found())?;
        Ok((data, content_type_for(name)))
    }
}

/// Extension including the leading dot, or empty
fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

fn content_type_for(name: &str) -> &'static str {
    match extension_of(name).to_ascii_lowercase().as_str() {
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        ".gif" => "image/gif",
        ".heic" => "image/heic",
        ".mp4" => "video/mp4",
        ".mov" => "video/quicktime",
        ".mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: usize) -> UploadedFile {
        UploadedFile {
            filename: name.to_string(),
            data: vec![0; size],
        }
    }

    fn message(err: AppError) -> String {
        err.client_message().to_string()
    }

    #[test]
    fn test_classify_accepts_supported_files() {
        let types = MediaService::classify(&[file("a.png", 10), file("b.MP4", 10)]).unwrap();
        assert_eq!(types, vec![MediaType::Image, MediaType::Video]);
    }

    #[test]
    fn test_classify_rejects_count() {
        let files: Vec<_> = (0..5).map(|i| file(&format!("{i}.jpg"), 1)).collect();
        assert_eq!(
            message(MediaService::classify(&files).unwrap_err()),
            "maximum 4 media files allowed"
        );
        assert!(MediaService::classify(&[]).is_err());
    }

    #[test]
    fn test_classify_rejects_format_and_size() {
        assert_eq!(
            message(MediaService::classify(&[file("doc.pdf", 1)]).unwrap_err()),
            "unsupported file format: .pdf"
        );
        assert_eq!(
            message(MediaService::classify(&[file("big.jpg", 5 * 1024 * 1024 + 1)]).unwrap_err()),
            "image file size exceeds limit (max 5MB)"
        );
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("x.JPG"), "image/jpeg");
        assert_eq!(content_type_for("x.mov"), "video/quicktime");
        assert_eq!(content_type_for("x"), "application/octet-stream");
    }
}
