use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use crypto_core::jwt;

use crate::error::{AppError, Result};
use crate::models::CurrentAdmin;
use crate::services::AuthService;
use crate::utils::ADMIN_COOKIE;
use crate::AppState;

/// Session token from the `admin_token` cookie, falling back to a bearer header
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(ADMIN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

/// Admit only users whose current role is `admin`
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = extract_token(request.headers()).ok_or(AppError::Unauthorized)?;

    let user_id = jwt::get_user_id_from_token(&token).map_err(|e| {
        tracing::debug!("Rejected admin token: {e}");
        AppError::Unauthorized
    })?;

    let admin = AuthService::new(state.db.clone())
        .find_admin(user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !admin.is_admin() {
        tracing::warn!(user_id, "Non-admin user tried to access the admin API");
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(CurrentAdmin {
        id: admin.id,
        username: admin.username,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_token_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", "theme=dark; admin_token=from-cookie".parse().unwrap());
        headers.insert(AUTHORIZATION, "Bearer from-header".parse().unwrap());
        assert_eq!(extract_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_bearer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn test_user_access_cookie_is_not_an_admin_session() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", "access_token=user-token".parse().unwrap());
        assert_eq!(extract_token(&headers), None);
    }
}
