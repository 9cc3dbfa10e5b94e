use serde_json::json;

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{AuthSession, LoginRequest, Message, RegisterRequest, User};
use crate::request::RequestSpec;

impl ApiClient {
    /// Create an account and start a session
    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthSession> {
        let spec = RequestSpec::post("/auth/register").json(req)?.without_refresh();
        self.start_session(spec).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let spec = RequestSpec::post("/auth/login").json(&req)?.without_refresh();
        self.start_session(spec).await
    }

    /// Revoke the current refresh token. The local token is dropped even if
    /// the server call fails.
    pub async fn logout(&self) -> Result<Message> {
        let result = self
            .execute(RequestSpec::post("/auth/logout").without_refresh())
            .await;
        self.set_access_token(None);
        result
    }

    pub async fn me(&self) -> Result<User> {
        self.execute(RequestSpec::get("/auth/me")).await
    }

    /// Rotate the session and return the new user and token.
    ///
    /// Goes through the same queue as 401-triggered refreshes: if a refresh is
    /// already running this waits for it and reloads the user instead of
    /// rotating a second time.
    pub async fn refresh_session(&self) -> Result<AuthSession> {
        if let Some(session) = self.join_refresh().await? {
            return Ok(session);
        }

        let user = self.me().await?;
        Ok(AuthSession {
            user,
            token: self.access_token().unwrap_or_default(),
        })
    }

    /// Sign out of every device
    pub async fn revoke_all(&self) -> Result<Message> {
        let result = self.execute(RequestSpec::post("/auth/revoke-all")).await;
        if result.is_ok() {
            self.set_access_token(None);
        }
        result
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<Message> {
        let spec = RequestSpec::post("/auth/password-reset/request")
            .json(&json!({ "email": email }))?
            .without_refresh();
        self.execute(spec).await
    }

    pub async fn confirm_password_reset(&self, token: &str, new_password: &str) -> Result<Message> {
        let spec = RequestSpec::post("/auth/password-reset/confirm")
            .json(&json!({ "token": token, "new_password": new_password }))?
            .without_refresh();
        self.execute(spec).await
    }

    pub async fn verify_email(&self, token: &str) -> Result<Message> {
        let spec = RequestSpec::post("/auth/email/verify")
            .json(&json!({ "token": token }))?
            .without_refresh();
        self.execute(spec).await
    }

    pub async fn resend_verification(&self) -> Result<Message> {
        self.execute(RequestSpec::post("/auth/email/resend")).await
    }

    async fn start_session(&self, spec: RequestSpec) -> Result<AuthSession> {
        let session: AuthSession = self.execute(spec).await?;
        self.set_access_token(Some(session.token.clone()));
        tracing::debug!(user_id = session.user.id, "Session started");
        Ok(session)
    }
}
