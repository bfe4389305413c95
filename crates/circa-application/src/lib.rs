//! Use cases for the conversational design workflow.

pub mod prompts;
pub mod session;

pub use prompts::Prompts;
pub use session::{SessionManager, SessionSettings, SessionStatus};
