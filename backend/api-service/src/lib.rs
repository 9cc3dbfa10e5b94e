/// API Service Library
///
/// Public REST API of the SNS platform: accounts and sessions, profiles and
/// follows, posts with comments, likes, bookmarks, hashtags and media.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `services`: Business logic layer
/// - `db`: Database access layer and repositories
/// - `models`: Rows and response types
/// - `middleware`: Database-backed account gate for JWT auth
/// - `jobs`: Background maintenance tasks
/// - `utils`: Validation, pagination, cookies and response envelopes
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
