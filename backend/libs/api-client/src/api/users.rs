use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Message, Page, Post, ProfileUpdate, User, UserSummary};
use crate::request::{segment, RequestSpec};

impl ApiClient {
    pub async fn get_user(&self, username: &str) -> Result<User> {
        self.execute(RequestSpec::get(format!("/users/{}", segment(username))))
            .await
    }

    /// Update the signed-in user's profile; `None` fields are left unchanged
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        self.execute(RequestSpec::put("/users/me").json(update)?).await
    }

    pub async fn user_posts(
        &self,
        username: &str,
        cursor: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Page<Post>> {
        let spec = RequestSpec::get(format!("/users/{}/posts", segment(username))).page(cursor, limit);
        self.execute_raw(spec).await
    }

    pub async fn followers(
        &self,
        username: &str,
        cursor: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Page<UserSummary>> {
        let spec =
            RequestSpec::get(format!("/users/{}/followers", segment(username))).page(cursor, limit);
        self.execute_raw(spec).await
    }

    pub async fn following(
        &self,
        username: &str,
        cursor: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Page<UserSummary>> {
        let spec =
            RequestSpec::get(format!("/users/{}/following", segment(username))).page(cursor, limit);
        self.execute_raw(spec).await
    }

    pub async fn follow(&self, username: &str) -> Result<Message> {
        self.execute(RequestSpec::post(format!("/users/{}/follow", segment(username))))
            .await
    }

    pub async fn unfollow(&self, username: &str) -> Result<Message> {
        self.execute(RequestSpec::delete(format!("/users/{}/follow", segment(username))))
            .await
    }
}
