//! Axum HTTP API server.
//!
//! This crate provides:
//! - The REST surface for signup, profiles, upgrades, billing, and the
//!   video upload/processing/download lifecycle
//! - Bearer-token verification against the hosted auth provider
//! - Rate limiting and security headers
//! - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::UserService;
pub use state::AppState;
