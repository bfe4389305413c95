pub mod circuit;
pub mod health;
pub mod session;
