//! Authentication constants.
//!
//! Environment variable names, storage keys and validation limits.

/// Environment variables consulted by [`AuthConfig::from_env`](crate::config::AuthConfig::from_env).
pub mod env_vars {
    /// Dedicated signing secret. First in the secret resolution order.
    pub const AUTH_SECRET: &str = "MAP_AUTH_SECRET";

    /// Admin password. Also the second secret source.
    pub const ADMIN_PASSWORD: &str = "MAP_PASSWORD_ADMIN";

    /// Shared user password. Also the third secret source.
    pub const USER_PASSWORD: &str = "MAP_PASSWORD_USER";

    /// Legacy single password, used as the user password fallback and last secret source.
    pub const LEGACY_PASSWORD: &str = "MAP_PASSWORD";

    /// Deployment environment; `production` turns on `Secure` cookies.
    pub const APP_ENV: &str = "APP_ENV";

    /// Alternative deployment environment variable.
    pub const NODE_ENV: &str = "NODE_ENV";
}

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "map-auth";

/// Config-store key holding the global user allow-list (JSON array).
pub const USER_ALLOWED_PAGES_KEY: &str = "user_allowed_pages";

/// Allow-list entry granting the root page.
pub const ROOT_PATH: &str = "/";

/// Login page that unauthenticated requests are redirected to.
pub const LOGIN_PATH: &str = "/login";

/// Query parameter carrying the originally requested path.
pub const RETURN_URL_PARAM: &str = "returnUrl";

/// Query parameter marking a forbidden (rather than unauthenticated) redirect.
pub const FORBIDDEN_PARAM: &str = "forbidden";

/// Registration limits.
pub mod limits {
    /// Shortest accepted login (after trimming).
    pub const MIN_LOGIN_LEN: usize = 2;

    /// Longest accepted login (after trimming).
    pub const MAX_LOGIN_LEN: usize = 64;

    /// Shortest accepted password.
    pub const MIN_PASSWORD_LEN: usize = 6;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_sources_are_distinct() {
        let sources = [
            env_vars::AUTH_SECRET,
            env_vars::ADMIN_PASSWORD,
            env_vars::USER_PASSWORD,
            env_vars::LEGACY_PASSWORD,
        ];
        for (i, a) in sources.iter().enumerate() {
            for b in &sources[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn login_limits_are_ordered() {
        assert!(limits::MIN_LOGIN_LEN < limits::MAX_LOGIN_LEN);
    }
}
