//! HTTP handlers.
//!
//! All of them live under `/api`, which the auth gate lets through; each
//! checks the caller itself.

pub mod account;
pub mod admin;
pub mod health;
pub mod session;
