//! `carto-server`: the auth gate and APIs in front of the built frontend.
//!
//! Configuration comes from the environment: `MAP_AUTH_SECRET` and the
//! `MAP_PASSWORD*` variables for auth, `BIND_ADDR`, `DATABASE_URL` and
//! `STATIC_DIR` for the server, `RUST_LOG` for log filtering.

use anyhow::Context;
use axum::Router;
use carto_auth::mocks::{MockAccountRepository, MockConfigStore};
use carto_auth::providers::{AccountRepository, Argon2PasswordHasher, ConfigStore, PasswordHasher};
use carto_auth::{AuthConfig, AuthEnvironment, AuthService};
use carto_core::environment::{Clock, SystemClock};
use carto_web::{AppState, ServerConfig, router};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServerConfig::from_env()?;
    let auth_config = AuthConfig::from_env();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    #[cfg(feature = "postgres")]
    if let Some(url) = &config.database_url {
        use carto_auth::stores::postgres::{self, PostgresAccountRepository, PostgresConfigStore};

        let pool = sqlx::PgPool::connect(url)
            .await
            .context("Failed to connect to PostgreSQL")?;
        postgres::migrate(&pool).await?;
        tracing::info!("Using PostgreSQL for accounts and settings");

        let env = AuthEnvironment::new(
            PostgresAccountRepository::new(pool.clone()),
            PostgresConfigStore::new(pool),
            Argon2PasswordHasher::new(),
            clock,
        );
        return serve(&config, AuthService::new(auth_config, env)).await;
    }

    #[cfg(not(feature = "postgres"))]
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL is set but this build has no postgres feature");
    }

    tracing::warn!("Accounts and settings are kept in memory and lost on restart");
    let env = AuthEnvironment::new(
        MockAccountRepository::new(),
        MockConfigStore::new(),
        Argon2PasswordHasher::new(),
        clock,
    );
    serve(&config, AuthService::new(auth_config, env)).await
}

async fn serve<A, C, H>(config: &ServerConfig, auth: AuthService<A, C, H>) -> anyhow::Result<()>
where
    A: AccountRepository + 'static,
    C: ConfigStore + 'static,
    H: PasswordHasher + 'static,
{
    let pages = Router::new().fallback_service(ServeDir::new(&config.static_dir));
    let app = router(AppState::new(auth), pages);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, static_dir = %config.static_dir.display(), "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
