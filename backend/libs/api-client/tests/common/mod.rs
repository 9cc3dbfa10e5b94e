#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use api_client::{ApiClient, ClientConfig};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const API_PREFIX: &str = "/api/v1";

pub fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(format!("{}{API_PREFIX}", server.uri()))
}

/// Client with a stale token and a hook that counts session expiries
pub fn client_with_counter(server: &MockServer) -> (ApiClient, Arc<AtomicUsize>) {
    let expired = Arc::new(AtomicUsize::new(0));
    let counter = expired.clone();
    let client = ApiClient::builder(config_for(server))
        .access_token("stale-token")
        .on_session_expired(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .expect("client");
    (client, expired)
}

pub fn user_json(id: i64, username: &str) -> Value {
    json!({
        "id": id,
        "email": format!("{username}@example.com"),
        "username": username,
        "display_name": null,
        "bio": null,
        "avatar_url": null,
        "header_url": null,
        "website": null,
        "birth_date": null,
        "occupation": null,
        "email_verified": true,
        "followers_count": 0,
        "following_count": 0,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

pub fn summary_json(id: i64, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "display_name": null,
        "avatar_url": null,
        "bio": null
    })
}

pub fn post_json(id: i64, content: &str) -> Value {
    json!({
        "id": id,
        "user_id": 1,
        "content": content,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
        "user": summary_json(1, "alice"),
        "media": [],
        "hashtag_names": [],
        "likes_count": 0,
        "comments_count": 0,
        "is_liked": false,
        "is_bookmarked": false
    })
}

pub fn session_json(token: &str) -> Value {
    json!({ "data": { "user": user_json(1, "alice"), "token": token } })
}

pub fn error_json(message: &str) -> Value {
    json!({ "error": { "message": message } })
}
