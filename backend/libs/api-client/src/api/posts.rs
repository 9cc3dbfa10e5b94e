use serde_json::json;

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Comment, Message, Page, Post, TimelineType, UserSummary};
use crate::request::RequestSpec;

impl ApiClient {
    pub async fn timeline(
        &self,
        kind: TimelineType,
        cursor: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Page<Post>> {
        let spec = RequestSpec::get("/posts/timeline")
            .query("type", kind.as_str())
            .page(cursor, limit);
        self.execute_raw(spec).await
    }

    pub async fn get_post(&self, id: i64) -> Result<Post> {
        self.execute(RequestSpec::get(format!("/posts/{id}"))).await
    }

    pub async fn create_post(&self, content: &str) -> Result<Post> {
        let spec = RequestSpec::post("/posts").json(&json!({ "content": content }))?;
        self.execute(spec).await
    }

    pub async fn update_post(&self, id: i64, content: &str) -> Result<Post> {
        let spec = RequestSpec::put(format!("/posts/{id}")).json(&json!({ "content": content }))?;
        self.execute(spec).await
    }

    pub async fn delete_post(&self, id: i64) -> Result<Message> {
        self.execute(RequestSpec::delete(format!("/posts/{id}"))).await
    }

    pub async fn comments(
        &self,
        post_id: i64,
        cursor: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Page<Comment>> {
        let spec = RequestSpec::get(format!("/posts/{post_id}/comments")).page(cursor, limit);
        self.execute_raw(spec).await
    }

    pub async fn create_comment(&self, post_id: i64, content: &str) -> Result<Comment> {
        let spec = RequestSpec::post(format!("/posts/{post_id}/comments"))
            .json(&json!({ "content": content }))?;
        self.execute(spec).await
    }

    pub async fn delete_comment(&self, comment_id: i64) -> Result<Message> {
        self.execute(RequestSpec::delete(format!("/comments/{comment_id}")))
            .await
    }

    pub async fn like_post(&self, id: i64) -> Result<Message> {
        self.execute(RequestSpec::post(format!("/posts/{id}/like"))).await
    }

    pub async fn unlike_post(&self, id: i64) -> Result<Message> {
        self.execute(RequestSpec::delete(format!("/posts/{id}/like"))).await
    }

    /// Users who liked a post, newest first
    pub async fn post_likes(
        &self,
        id: i64,
        cursor: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Page<UserSummary>> {
        let spec = RequestSpec::get(format!("/posts/{id}/likes")).page(cursor, limit);
        self.execute_raw(spec).await
    }

    pub async fn bookmark_post(&self, id: i64) -> Result<Message> {
        self.execute(RequestSpec::post(format!("/posts/{id}/bookmark")))
            .await
    }

    pub async fn unbookmark_post(&self, id: i64) -> Result<Message> {
        self.execute(RequestSpec::delete(format!("/posts/{id}/bookmark")))
            .await
    }

    pub async fn bookmarks(&self, cursor: Option<&str>, limit: Option<u32>) -> Result<Page<Post>> {
        self.execute_raw(RequestSpec::get("/bookmarks").page(cursor, limit))
            .await
    }

    pub async fn delete_media(&self, media_id: i64) -> Result<Message> {
        self.execute(RequestSpec::delete(format!("/media/{media_id}")))
            .await
    }
}
