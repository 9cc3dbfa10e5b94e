use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Hashtag, Page, Post};
use crate::request::{segment, RequestSpec};

impl ApiClient {
    pub async fn trending_hashtags(&self, limit: Option<u32>) -> Result<Vec<Hashtag>> {
        self.execute(RequestSpec::get("/hashtags/trending").query_opt("limit", limit))
            .await
    }

    /// Posts tagged with `name`; a leading `#` is ignored
    pub async fn hashtag_posts(
        &self,
        name: &str,
        cursor: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Page<Post>> {
        let name = name.trim_start_matches('#');
        let spec = RequestSpec::get(format!("/hashtags/{}/posts", segment(name))).page(cursor, limit);
        self.execute_raw(spec).await
    }
}
