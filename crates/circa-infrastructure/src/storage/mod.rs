//! File storage primitives.

pub mod design_storage;
pub mod secret_storage;

pub use design_storage::{DesignStorage, DesignStorageError};
pub use secret_storage::{SecretStorage, SecretStorageError};
