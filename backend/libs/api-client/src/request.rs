use reqwest::Method;
use serde::Serialize;

use crate::error::{ClientError, Result};

pub(crate) const REFRESH_PATH: &str = "/auth/refresh";

/// Everything needed to send a request again after the session is refreshed
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    /// Path relative to the configured base URL, starting with `/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    /// Set once the request has been replayed after a refresh
    pub(crate) retried: bool,
    /// Credential endpoints answer 401 for bad input, not for a stale session
    pub(crate) refresh_on_401: bool,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            retried: false,
            refresh_on_401: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Cursor pagination parameters shared by every list endpoint
    pub fn page(self, cursor: Option<&str>, limit: Option<u32>) -> Self {
        self.query_opt("cursor", cursor).query_opt("limit", limit)
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub(crate) fn without_refresh(mut self) -> Self {
        self.refresh_on_401 = false;
        self
    }

    pub fn is_refresh(&self) -> bool {
        self.path.trim_end_matches('/').ends_with(REFRESH_PATH)
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Whether a 401 on this request should go through the refresh queue
    pub(crate) fn should_refresh(&self) -> bool {
        self.refresh_on_401 && !self.retried && !self.is_refresh()
    }

    pub(crate) fn into_retry(mut self) -> Self {
        self.retried = true;
        self
    }
}

/// Percent-encode a single path segment such as a username or hashtag
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
