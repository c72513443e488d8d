//! Session cookie transport.
//!
//! Builds `Set-Cookie` values and reads the session token back out of a
//! `Cookie` header. Framework-agnostic: callers wrap the strings in their
//! own header types.

use crate::config::CookieConfig;
use chrono::Duration;

/// SameSite cookie policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSitePolicy {
    /// Strict (same-site only).
    Strict,

    /// Lax (cross-site GET allowed).
    Lax,
}

impl SameSitePolicy {
    /// Attribute value as written in `Set-Cookie`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
        }
    }
}

/// `Set-Cookie` value carrying `token` for `max_age`.
///
/// # Examples
///
/// ```
/// use carto_auth::config::CookieConfig;
/// use carto_auth::cookie::session_cookie;
/// use chrono::Duration;
///
/// let header = session_cookie(&CookieConfig::default(), "abc.def", Duration::days(7));
/// assert_eq!(header, "map-auth=abc.def; Path=/; Max-Age=604800; HttpOnly; SameSite=Lax");
/// ```
#[must_use]
pub fn session_cookie(config: &CookieConfig, token: &str, max_age: Duration) -> String {
    build(config, token, max_age.num_seconds().max(0))
}

/// `Set-Cookie` value that removes the session cookie.
///
/// # Examples
///
/// ```
/// use carto_auth::config::CookieConfig;
/// use carto_auth::cookie::clear_session_cookie;
///
/// let header = clear_session_cookie(&CookieConfig::default());
/// assert!(header.starts_with("map-auth=; Path=/; Max-Age=0"));
/// ```
#[must_use]
pub fn clear_session_cookie(config: &CookieConfig) -> String {
    build(config, "", 0)
}

fn build(config: &CookieConfig, value: &str, max_age_secs: i64) -> String {
    let mut cookie = format!(
        "{}={value}; Path={}; Max-Age={max_age_secs}; HttpOnly; SameSite={}",
        config.name,
        config.path,
        config.same_site.as_str(),
    );
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Read cookie `name` out of a `Cookie` request header value.
///
/// Empty values count as absent.
///
/// # Examples
///
/// ```
/// use carto_auth::cookie::cookie_value;
///
/// assert_eq!(cookie_value("theme=dark; map-auth=abc.def", "map-auth"), Some("abc.def"));
/// assert_eq!(cookie_value("map-auth=", "map-auth"), None);
/// ```
#[must_use]
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
