//! # Carto Web
//!
//! The axum boundary of Carto.
//!
//! # Request Flow
//!
//! 1. **Gate**: every request outside the exempt prefixes has its session
//!    cookie verified and its path checked against the role and allow-lists
//! 2. **Redirect** refused requests to the login page (`returnUrl`, plus
//!    `forbidden=1` for admin-only paths)
//! 3. **API handlers** under `/api` check the caller themselves and map
//!    [`carto_auth::AuthError`] to HTTP through [`AppError`]
//!
//! # Example
//!
//! ```ignore
//! use carto_web::{AppState, router};
//! use tower_http::services::ServeDir;
//!
//! let pages = axum::Router::new().fallback_service(ServeDir::new("public"));
//! let app = router(AppState::new(auth_service), pages);
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use config::ServerConfig;
pub use error::AppError;
pub use extractors::{Caller, SessionCookie};
pub use middleware::auth_gate;
pub use router::router;
pub use state::AppState;
