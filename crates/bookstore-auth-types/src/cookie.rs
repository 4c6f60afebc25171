//! Access-token cookie builders.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the access token.
pub const BOOKSTORE_ACCESS_TOKEN: &str = "bookstore_access_token";

/// Access-token lifetime in seconds (14 days). Used for both the JWT `exp` and the cookie Max-Age.
pub const ACCESS_TOKEN_EXP: u64 = 1_209_600;

/// Set the access-token cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use bookstore_auth_types::cookie::{set_access_token_cookie, BOOKSTORE_ACCESS_TOKEN};
///
/// let jar = CookieJar::new();
/// let jar = set_access_token_cookie(jar, "token_value".to_string(), "example.com".to_string());
/// let cookie = jar.get(BOOKSTORE_ACCESS_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(1_209_600)));
/// assert!(cookie.http_only().unwrap_or(false));
/// ```
pub fn set_access_token_cookie(jar: CookieJar, value: String, domain: String) -> CookieJar {
    jar.add(access_cookie(value, domain, Duration::seconds(ACCESS_TOKEN_EXP as i64)))
}

/// Expire the access-token cookie.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use bookstore_auth_types::cookie::{clear_access_token_cookie, BOOKSTORE_ACCESS_TOKEN};
///
/// let jar = clear_access_token_cookie(CookieJar::new(), "example.com".to_string());
/// let cookie = jar.get(BOOKSTORE_ACCESS_TOKEN).unwrap();
/// assert_eq!(cookie.value(), "");
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_access_token_cookie(jar: CookieJar, domain: String) -> CookieJar {
    jar.add(access_cookie(String::new(), domain, Duration::ZERO))
}

/// Site-wide, script-invisible cookie; both builders must agree on path and domain or the
/// browser keeps the old one.
fn access_cookie(value: String, domain: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((BOOKSTORE_ACCESS_TOKEN, value))
        .path("/")
        .domain(domain)
        .max_age(max_age)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}
