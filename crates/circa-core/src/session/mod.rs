//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: the conversational session (`Session`) and its phase transitions
//! - `message`: conversation turn types (`Role`, `Turn`)
//! - `phase`: lifecycle stages (`Phase`)

mod message;
mod model;
mod phase;

pub use message::{Role, Turn};
pub use model::Session;
pub use phase::Phase;
