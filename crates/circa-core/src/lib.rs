//! Domain layer for CIRCA.
//!
//! Holds the circuit design document model and the pure engines that operate
//! on it (extraction, validation, layout), plus the conversational session
//! model and the contract for the external text-generation service.

pub mod config;
pub mod design;
pub mod error;
pub mod service;
pub mod session;

pub use error::CircaError;
