//! Server configuration.

use anyhow::Context;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Address used when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Directory served when `STATIC_DIR` is unset.
pub const DEFAULT_STATIC_DIR: &str = "public";

/// Settings of the `carto-server` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address (`BIND_ADDR`).
    pub bind_addr: SocketAddr,

    /// PostgreSQL URL (`DATABASE_URL`). Without it, accounts and settings
    /// live in memory.
    pub database_url: Option<String>,

    /// Built frontend served behind the auth gate (`STATIC_DIR`).
    pub static_dir: PathBuf,
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `BIND_ADDR` is not a socket address.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if `BIND_ADDR` is not a socket address.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse()
            .with_context(|| format!("BIND_ADDR is not a socket address: {bind_addr}"))?;

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            static_dir: get("STATIC_DIR").map_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.database_url, None);
        assert_eq!(config.static_dir, PathBuf::from("public"));
    }

    #[test]
    fn reads_overrides_and_ignores_blanks() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DATABASE_URL", "postgres://localhost/carto"),
            ("STATIC_DIR", "  "),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/carto"));
        assert_eq!(config.static_dir, PathBuf::from("public"));
    }

    #[test]
    fn rejects_bad_address() {
        let err = ServerConfig::from_lookup(lookup(&[("BIND_ADDR", "nowhere")])).unwrap_err();
        assert!(err.to_string().contains("nowhere"));
    }
}
