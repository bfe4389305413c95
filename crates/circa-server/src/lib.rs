//! HTTP surface for the circuit design assistant.

pub mod config;
pub mod error;
pub mod handlers;

pub use config::{AppState, app_router, serve};
pub use error::ApiError;
