use actix_middleware::jwt_auth::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpResponseBuilder;

pub const ACCESS_TOKEN_MAX_AGE_SECS: i64 = 3600;
pub const REFRESH_TOKEN_MAX_AGE_SECS: i64 = 7 * 24 * 3600;

/// Production cookies are cross-site capable and HTTPS-only.
fn auth_cookie(name: &'static str, value: String, max_age: Duration, production: bool) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .secure(production)
        .same_site(if production { SameSite::None } else { SameSite::Lax })
        .max_age(max_age)
        .finish()
}

pub fn set_auth_cookies(
    builder: &mut HttpResponseBuilder,
    access_token: &str,
    refresh_token: &str,
    production: bool,
) {
    builder
        .cookie(auth_cookie(
            ACCESS_TOKEN_COOKIE,
            access_token.to_string(),
            Duration::seconds(ACCESS_TOKEN_MAX_AGE_SECS),
            production,
        ))
        .cookie(auth_cookie(
            REFRESH_TOKEN_COOKIE,
            refresh_token.to_string(),
            Duration::seconds(REFRESH_TOKEN_MAX_AGE_SECS),
            production,
        ));
}

pub fn clear_auth_cookies(builder: &mut HttpResponseBuilder, production: bool) {
    builder
        .cookie(auth_cookie(ACCESS_TOKEN_COOKIE, String::new(), Duration::ZERO, production))
        .cookie(auth_cookie(REFRESH_TOKEN_COOKIE, String::new(), Duration::ZERO, production));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::HttpResponse;

    #[test]
    fn test_development_cookies() {
        let mut builder = HttpResponse::Ok();
        set_auth_cookies(&mut builder, "access", "refresh", false);
        let resp = builder.finish();

        let cookies: Vec<_> = resp.cookies().collect();
        assert_eq!(cookies.len(), 2);

        let access = cookies.iter().find(|c| c.name() == "access_token").unwrap();
        assert_eq!(access.value(), "access");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
        assert_eq!(access.max_age(), Some(Duration::seconds(3600)));
        assert_ne!(access.secure(), Some(true));

        let refresh = cookies.iter().find(|c| c.name() == "refresh_token").unwrap();
        assert_eq!(refresh.max_age(), Some(Duration::seconds(7 * 24 * 3600)));
    }

    #[test]
    fn test_production_cookies_are_secure() {
        let mut builder = HttpResponse::Ok();
        set_auth_cookies(&mut builder, "a", "r", true);
        let resp = builder.finish();

        for cookie in resp.cookies() {
            assert_eq!(cookie.secure(), Some(true));
            assert_eq!(cookie.same_site(), Some(SameSite::None));
        }
    }

    #[test]
    fn test_clear_cookies() {
        let mut builder = HttpResponse::Ok();
        clear_auth_cookies(&mut builder, false);
        let resp = builder.finish();

        for cookie in resp.cookies() {
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }
    }
}
