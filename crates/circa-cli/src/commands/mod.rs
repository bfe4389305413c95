pub mod chat;
pub mod layout;
pub mod serve;
pub mod validate;

use anyhow::{Context, Result};
use circa_application::{SessionManager, SessionSettings};
use circa_core::config::AppConfig;
use circa_infrastructure::ConfigService;
use circa_interaction::ClaudeApiAgent;
use std::path::Path;
use std::sync::Arc;

pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let service = match path {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new().context("Failed to resolve config path")?,
    };
    service
        .load()
        .with_context(|| format!("Failed to load {}", service.path().display()))
}

/// Wires the Claude client into a session manager.
pub fn build_manager(config: &AppConfig) -> Result<Arc<SessionManager>> {
    let agent = ClaudeApiAgent::try_from_config(&config.model)
        .context("Claude API is not configured")?;
    tracing::info!(model = %agent.model(), "Using Claude model");

    Ok(Arc::new(SessionManager::new(
        Arc::new(agent),
        SessionSettings::from_config(config),
    )))
}
