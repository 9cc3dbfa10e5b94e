// Utility functions for admin API

use std::net::SocketAddr;

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

pub const ADMIN_COOKIE: &str = "admin_token";
pub const ADMIN_COOKIE_MAX_AGE_SECS: i64 = 3600;

/// `Set-Cookie` value carrying the admin session token
pub fn admin_cookie(token: &str, secure: bool) -> String {
    format!(
        "{ADMIN_COOKIE}={token}; Path=/admin; Max-Age={ADMIN_COOKIE_MAX_AGE_SECS}; HttpOnly; SameSite=Lax{}",
        if secure { "; Secure" } else { "" }
    )
}

/// `Set-Cookie` value that expires the admin session cookie
pub fn clear_admin_cookie(secure: bool) -> String {
    format!(
        "{ADMIN_COOKIE}=; Path=/admin; Max-Age=0; HttpOnly; SameSite=Lax{}",
        if secure { "; Secure" } else { "" }
    )
}

/// Client address, preferring proxy headers over the socket peer
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .map(String::from)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_default()
}

/// Keep the first characters of a secret for log output
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(8).collect();
    format!("{visible}****")
}

/// Raw `page` / `limit` query values; unparsable values fall back to defaults
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

pub const MAX_PAGE_LIMIT: i64 = 100;

impl PageQuery {
    pub fn params(&self, default_limit: i64) -> PageParams {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());

        let page = parse(&self.page).filter(|p| *p >= 1).unwrap_or(1);
        let limit = parse(&self.limit)
            .filter(|l| *l >= 1)
            .map(|l| l.min(MAX_PAGE_LIMIT))
            .unwrap_or(default_limit);

        PageParams { page, limit }
    }
}

impl PageParams {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl PageInfo {
    pub fn new(total: i64, params: PageParams) -> Self {
        let total_pages = (total + params.limit - 1) / params.limit;
        Self {
            total,
            page: params.page,
            limit: params.limit,
            total_pages,
        }
    }
}

/// Treat empty strings and `all` as "no filter"
pub fn filter_value(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "all")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(String::from),
            limit: limit.map(String::from),
        }
    }

    #[test]
    fn test_page_defaults() {
        assert_eq!(query(None, None).params(20), PageParams { page: 1, limit: 20 });
        assert_eq!(query(Some("abc"), Some("0")).params(50), PageParams { page: 1, limit: 50 });
        assert_eq!(query(Some("-3"), Some("x")).params(20), PageParams { page: 1, limit: 20 });
    }

    #[test]
    fn test_page_values_and_cap() {
        let params = query(Some("3"), Some("25")).params(20);
        assert_eq!(params, PageParams { page: 3, limit: 25 });
        assert_eq!(params.offset(), 50);
        assert_eq!(query(None, Some("1000")).params(20).limit, MAX_PAGE_LIMIT);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let params = PageParams { page: 1, limit: 20 };
        assert_eq!(PageInfo::new(0, params).total_pages, 0);
        assert_eq!(PageInfo::new(20, params).total_pages, 1);
        assert_eq!(PageInfo::new(21, params).total_pages, 2);
    }

    #[test]
    fn test_filter_value() {
        assert_eq!(filter_value(&Some("pending".into())), Some("pending"));
        assert_eq!(filter_value(&Some("all".into())), None);
        assert_eq!(filter_value(&Some("  ".into())), None);
        assert_eq!(filter_value(&None), None);
    }

    #[test]
    fn test_admin_cookie() {
        let cookie = admin_cookie("abc", false);
        assert!(cookie.starts_with("admin_token=abc;"));
        assert!(cookie.contains("Path=/admin"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));

        assert!(admin_cookie("abc", true).ends_with("; Secure"));
        assert!(clear_admin_cookie(false).contains("Max-Age=0"));
    }

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let peer: SocketAddr = "10.0.0.1:5000".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, Some(peer)), "10.0.0.1");
        assert_eq!(client_ip(&headers, None), "");

        headers.insert("x-real-ip", "192.168.1.9".parse().unwrap());
        assert_eq!(client_ip(&headers, Some(peer)), "192.168.1.9");

        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.2".parse().unwrap());
        assert_eq!(client_ip(&headers, Some(peer)), "203.0.113.7");
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("0123456789abcdef"), "01234567****");
        assert_eq!(mask_token("abc"), "abc****");
    }
}
