//! Axum HTTP API server.
//!
//! This crate provides:
//! - Session lifecycle and multipart image upload
//! - Drag-and-drop order replacement
//! - Synchronous slideshow export and artifact download
//! - Rate limiting and security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod sweeper;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
pub use sweeper::SessionSweeper;
