//! Adapters for the external text-generation service.

pub mod claude_api_agent;

pub use claude_api_agent::ClaudeApiAgent;
