mod manager;

pub use manager::{SessionManager, SessionSettings, SessionStatus};
