use actix_web::{
    body::EitherBody,
    cookie::{time::Duration as CookieDuration, Cookie},
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, StatusCode},
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError,
};
use async_trait::async_trait;
use futures::future::{ready, LocalBoxFuture, Ready};
use serde_json::json;
use std::rc::Rc;
use std::sync::Arc;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

const APPROVED_STATUS: &str = "approved";

/// User ID extracted from JWT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub i64);

/// Viewer identity on routes that also serve anonymous callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalUserId(pub Option<i64>);

/// Looks up the account status for an authenticated user id.
///
/// `Ok(None)` means the user no longer exists.
#[async_trait]
pub trait AccountGate: Send + Sync + 'static {
    async fn account_status(
        &self,
        user_id: i64,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authentication required")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("user not found")]
    UserNotFound,
    #[error("account is not approved")]
    NotApproved,
    #[error("internal server error")]
    Internal,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::UserNotFound => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::NotApproved => StatusCode::FORBIDDEN,
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if matches!(self, AuthError::NotApproved) {
            // Force the browser session out
            builder
                .cookie(expired_cookie(ACCESS_TOKEN_COOKIE))
                .cookie(expired_cookie(REFRESH_TOKEN_COOKIE));
        }
        builder.json(json!({ "error": { "message": self.to_string() } }))
    }
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name, "")
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::ZERO)
        .finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthMode {
    Required,
    Optional,
}

/// JWT Authentication Middleware
///
/// `required` rejects anonymous callers and accounts whose status is not
/// `approved`. `optional` only attaches the
/// user id when a valid token is present.
#[derive(Clone)]
pub struct JwtAuthMiddleware {
    mode: AuthMode,
    gate: Option<Arc<dyn AccountGate>>,
}

impl JwtAuthMiddleware {
    pub fn required(gate: Arc<dyn AccountGate>) -> Self {
        Self {
            mode: AuthMode::Required,
            gate: Some(gate),
        }
    }

    pub fn optional() -> Self {
        Self {
            mode: AuthMode::Optional,
            gate: None,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            mode: self.mode,
            gate: self.gate.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    mode: AuthMode,
    gate: Option<Arc<dyn AccountGate>>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let mode = self.mode;
        let gate = self.gate.clone();

        Box::pin(async move {
            let token = extract_token(&req);

            match mode {
                AuthMode::Optional => {
                    let user_id = token
                        .as_deref()
                        .and_then(|t| crypto_core::jwt::get_user_id_from_token(t).ok());
                    if let Some(user_id) = user_id {
                        req.extensions_mut().insert(UserId(user_id));
                    }
                }
                AuthMode::Required => {
                    match authenticate(token.as_deref(), gate.as_deref()).await {
                        Ok(user_id) => {
                            req.extensions_mut().insert(UserId(user_id));
                        }
                        Err(err) => {
                            return Ok(req.error_response(err).map_into_right_body());
                        }
                    }
                }
            }

            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Bearer header first, then the `access_token` cookie
fn extract_token(req: &ServiceRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned);

    bearer.or_else(|| {
        req.cookie(ACCESS_TOKEN_COOKIE)
            .map(|c| c.value().to_owned())
            .filter(|t| !t.is_empty())
    })
}

async fn authenticate(
    token: Option<&str>,
    gate: Option<&dyn AccountGate>,
) -> Result<i64, AuthError> {
    let token = token.ok_or(AuthError::MissingToken)?;

    let user_id = crypto_core::jwt::get_user_id_from_token(token).map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        AuthError::InvalidToken
    })?;

    if let Some(gate) = gate {
        match gate.account_status(user_id).await {
            Ok(Some(status)) if status == APPROVED_STATUS => {}
            Ok(Some(status)) => {
                tracing::info!(user_id, status = %status, "Rejected request from unapproved account");
                return Err(AuthError::NotApproved);
            }
            Ok(None) => return Err(AuthError::UserNotFound),
            Err(e) => {
                tracing::error!(user_id, error = %e, "Account status lookup failed");
                return Err(AuthError::Internal);
            }
        }
    }

    Ok(user_id)
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<UserId>() {
            Some(user_id) => ready(Ok(*user_id)),
            None => ready(Err(AuthError::MissingToken.into())),
        }
    }
}

impl FromRequest for OptionalUserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalUserId(
            req.extensions().get::<UserId>().map(|u| u.0),
        )))
    }
}
