//! Async client for the SNS REST API.
//!
//! Every request carries the session cookies and, when known, the access
//! token as a bearer header. A 401 on an authenticated request triggers a
//! single `/auth/refresh` call shared by all requests that failed at the same
//! time; each of them is then replayed once. If the refresh fails every queued
//! request resolves to [`ClientError::SessionExpired`] and the
//! `on_session_expired` hook runs.
//!
//! ```rust,no_run
//! use api_client::{ApiClient, ClientConfig, TimelineType};
//!
//! # async fn run() -> api_client::Result<()> {
//! let client = ApiClient::builder(ClientConfig::from_env())
//!     .on_session_expired(|| eprintln!("please log in again"))
//!     .build()?;
//! client.login("alice@example.com", "password123").await?;
//! let page = client.timeline(TimelineType::Following, None, Some(20)).await?;
//! println!("{} posts", page.data.len());
//! # Ok(())
//! # }
//! ```

mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod refresh;
pub mod request;

pub use client::{ApiClient, ApiClientBuilder, SessionExpiredHook};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use models::{
    AuthSession, Comment, Hashtag, Media, Message, Page, Pagination, ProfileUpdate,
    RegisterRequest, TimelineType, User, UserSummary,
};
pub use request::RequestSpec;
