use std::sync::{Arc, RwLock};

use reqwest::{header, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::models::{AuthSession, DataEnvelope};
use crate::refresh::{self, RefreshCoordinator, RefreshLeader, RefreshOutcome, RefreshRole};
use crate::request::{RequestSpec, REFRESH_PATH};

/// Called when the session cannot be refreshed, e.g. to show the login screen
pub type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

/// Cloneable handle to the SNS API.
///
/// Cookies set by the server (`access_token`, `refresh_token`) are kept in an
/// in-memory store and sent back on every request, so the client behaves like
/// a browser with credentials enabled. An access token returned in a response
/// body is additionally sent as a bearer header.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    access_token: RwLock<Option<String>>,
    refresh: RefreshCoordinator,
    on_session_expired: Option<SessionExpiredHook>,
}

pub struct ApiClientBuilder {
    config: ClientConfig,
    access_token: Option<String>,
    on_session_expired: Option<SessionExpiredHook>,
}

impl ApiClientBuilder {
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn on_session_expired(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_expired = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let base_url = self.config.normalized_base_url().to_string();
        reqwest::Url::parse(&base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(self.config.timeout)
            .build()?;

        Ok(ApiClient {
            inner: Arc::new(Inner {
                http,
                base_url,
                access_token: RwLock::new(self.access_token),
                refresh: RefreshCoordinator::new(),
                on_session_expired: self.on_session_expired,
            }),
        })
    }
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            access_token: None,
            on_session_expired: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner
            .access_token
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn set_access_token(&self, token: Option<String>) {
        *self
            .inner
            .access_token
            .write()
            .unwrap_or_else(|p| p.into_inner()) = token;
    }

    /// True while a session refresh is in flight
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    /// Send a request and decode the `data` field of the response
    pub async fn execute<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T> {
        let envelope: DataEnvelope<T> = self.execute_raw(spec).await?;
        Ok(envelope.data)
    }

    /// Send a request and decode the whole response body
    pub async fn execute_raw<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T> {
        let response = self.send_with_refresh(spec).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Refresh the session, joining a refresh that is already running
    pub async fn refresh(&self) -> Result<()> {
        self.join_refresh().await.map(|_| ())
    }

    /// Lead the refresh or wait for the running one.
    ///
    /// Returns the new session when this caller led the refresh and the
    /// server sent one back. A waiter whose leader was cancelled rejoins once;
    /// one of the rejoining waiters then performs the refresh.
    pub(crate) async fn join_refresh(&self) -> Result<Option<AuthSession>> {
        let mut rejoined = false;
        loop {
            let rx = match self.inner.refresh.join() {
                RefreshRole::Leader(leader) => return self.lead_refresh(leader).await,
                RefreshRole::Waiter(rx) => rx,
            };

            match refresh::wait(rx).await {
                RefreshOutcome::Refreshed => return Ok(None),
                RefreshOutcome::Failed => return Err(ClientError::SessionExpired),
                RefreshOutcome::Abandoned if !rejoined => {
                    tracing::debug!("Session refresh abandoned, rejoining");
                    rejoined = true;
                }
                RefreshOutcome::Abandoned => return Err(ClientError::RefreshInterrupted),
            }
        }
    }

    async fn send_with_refresh(&self, spec: RequestSpec) -> Result<reqwest::Response> {
        let response = self.send_once(&spec).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response).await;
        }

        if spec.is_refresh() {
            self.expire_session();
            return Err(ClientError::SessionExpired);
        }
        if !spec.should_refresh() {
            return check_status(response).await;
        }

        tracing::debug!(path = %spec.path, "Received 401, refreshing session");
        self.join_refresh().await?;

        let retry = spec.into_retry();
        let response = self.send_once(&retry).await?;
        check_status(response).await
    }

    async fn lead_refresh(&self, leader: RefreshLeader<'_>) -> Result<Option<AuthSession>> {
        match self.request_new_session().await {
            Ok(session) => {
                if let Some(session) = &session {
                    self.set_access_token(Some(session.token.clone()));
                }
                let woken = leader.complete(RefreshOutcome::Refreshed);
                tracing::debug!(replaying = woken, "Session refreshed");
                Ok(session)
            }
            Err(e) => {
                tracing::info!(error = %e, "Session refresh failed");
                self.set_access_token(None);
                leader.complete(RefreshOutcome::Failed);
                self.notify_session_expired();
                Err(ClientError::SessionExpired)
            }
        }
    }

    /// `POST /auth/refresh`; the refresh token travels in the cookie store
    async fn request_new_session(&self) -> Result<Option<AuthSession>> {
        let spec = RequestSpec::post(REFRESH_PATH);
        let response = check_status(self.send_once(&spec).await?).await?;
        let bytes = response.bytes().await?;

        // The session in the body is optional; the cookie alone is enough
        let session = serde_json::from_slice::<DataEnvelope<AuthSession>>(&bytes)
            .ok()
            .map(|envelope| envelope.data);
        Ok(session)
    }

    fn expire_session(&self) {
        self.set_access_token(None);
        self.notify_session_expired();
    }

    fn notify_session_expired(&self) {
        if let Some(hook) = &self.inner.on_session_expired {
            hook();
        }
    }

    async fn send_once(&self, spec: &RequestSpec) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.inner.base_url, spec.path);
        let mut request = self.inner.http.request(spec.method.clone(), &url);

        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(token) = self.access_token() {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        tracing::trace!(method = %spec.method, path = %spec.path, retried = spec.is_retried(), "Sending request");
        Ok(request.send().await?)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.unwrap_or_default();
    Err(ClientError::from_body(status, &body))
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("authenticated", &self.access_token().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = ApiClient::new(ClientConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
        assert_eq!(
            err.alert_message(),
            "The API address is not configured correctly."
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = ApiClient::new(ClientConfig::new("http://localhost:8080/api/v1/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api/v1");
    }

    #[test]
    fn test_access_token_round_trip() {
        let client = ApiClient::builder(ClientConfig::default())
            .access_token("abc")
            .build()
            .unwrap();
        assert_eq!(client.access_token().as_deref(), Some("abc"));

        let clone = client.clone();
        clone.set_access_token(None);
        assert_eq!(client.access_token(), None);
        assert!(format!("{client:?}").contains("authenticated: false"));
    }
}
