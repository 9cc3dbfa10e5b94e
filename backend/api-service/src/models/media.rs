use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

pub const MAX_IMAGE_SIZE: u64 = 5 * 1024 * 1024;
pub const MAX_VIDEO_SIZE: u64 = 50 * 1024 * 1024;
pub const MAX_AUDIO_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Media {
    pub id: i64,
    pub post_id: i64,
    pub media_type: String,
    pub media_url: String,
    pub file_size: i64,
    /// Seconds, for video and audio
    pub duration: Option<i32>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

impl MediaType {
    /// Classify an upload by its file extension
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = std::path::Path::new(filename)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();

        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "heic" => Some(MediaType::Image),
            "mp4" | "mov" => Some(MediaType::Video),
            "mp3" => Some(MediaType::Audio),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }

    pub fn max_size(&self) -> u64 {
        match self {
            MediaType::Image => MAX_IMAGE_SIZE,
            MediaType::Video => MAX_VIDEO_SIZE,
            MediaType::Audio => MAX_AUDIO_SIZE,
        }
    }

    /// Error message when an upload exceeds `max_size`
    pub fn size_error(&self) -> String {
        format!(
            "{} file size exceeds limit (max {}MB)",
            self.as_str(),
            self.max_size() / (1024 * 1024)
        )
    }
}
