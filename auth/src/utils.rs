//! Utility functions for authentication.

use crate::constants::limits::{MAX_LOGIN_LEN, MIN_LOGIN_LEN, MIN_PASSWORD_LEN};
use crate::error::{AuthError, Result};

/// Normalize a login: trim surrounding whitespace and lowercase.
///
/// # Examples
///
/// ```
/// use carto_auth::utils::normalize_login;
///
/// assert_eq!(normalize_login("  Alice "), "alice");
/// ```
#[must_use]
pub fn normalize_login(login: &str) -> String {
    login.trim().to_lowercase()
}

/// Validate registration input and return the normalized login.
///
/// Lengths are counted in characters, after normalization for the login.
///
/// # Errors
///
/// Returns [`AuthError::Validation`] if the login is not 2..=64 characters
/// or the password is shorter than 6 characters.
///
/// # Examples
///
/// ```
/// use carto_auth::utils::validate_registration;
///
/// assert_eq!(validate_registration(" Bob ", "secret").unwrap(), "bob");
/// assert!(validate_registration("b", "secret").is_err());
/// assert!(validate_registration("bob", "short").is_err());
/// ```
pub fn validate_registration(login: &str, password: &str) -> Result<String> {
    let login = normalize_login(login);
    let login_len = login.chars().count();

    if !(MIN_LOGIN_LEN..=MAX_LOGIN_LEN).contains(&login_len) {
        return Err(AuthError::Validation(format!(
            "login must be between {MIN_LOGIN_LEN} and {MAX_LOGIN_LEN} characters"
        )));
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    Ok(login)
}

/// Normalize an allow-list submitted by an administrator: trim every entry
/// and drop the empty ones. Order is preserved.
///
/// # Examples
///
/// ```
/// use carto_auth::utils::normalize_pages;
///
/// let pages = vec![" /maps ".to_string(), "".to_string(), "/".to_string()];
/// assert_eq!(normalize_pages(pages), vec!["/maps", "/"]);
/// ```
#[must_use]
pub fn normalize_pages(pages: Vec<String>) -> Vec<String> {
    pages
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Parse a stored allow-list (a JSON array). Non-string elements are
/// skipped; anything that is not an array yields `None`.
///
/// # Examples
///
/// ```
/// use carto_auth::utils::parse_allow_list;
///
/// assert_eq!(parse_allow_list(r#"["/", 3, "/maps"]"#), Some(vec!["/".into(), "/maps".into()]));
/// assert_eq!(parse_allow_list(r#"{"pages": []}"#), None);
/// assert_eq!(parse_allow_list("not json"), None);
/// ```
#[must_use]
pub fn parse_allow_list(raw: &str) -> Option<Vec<String>> {
    match serde_json::from_str::<serde_json::Value>(raw).ok()? {
        serde_json::Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}
