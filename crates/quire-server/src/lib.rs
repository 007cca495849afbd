//! Quire Server: the HTTP surface over the Quire repositories.
//!
//! [`build_router`] assembles the full axum application from an
//! [`AppState`]; the `quire` binary only loads configuration, connects
//! storage and serves it.

pub mod api;
pub mod config;

pub use api::{AppState, build_router};
pub use config::{ConfigError, ServerConfig};
