//! Infrastructure layer for CIRCA.
//!
//! File-system backed configuration, secrets, and design artifact storage.

pub mod config_service;
pub mod paths;
pub mod storage;

pub use config_service::ConfigService;
pub use storage::{DesignStorage, SecretStorage};
