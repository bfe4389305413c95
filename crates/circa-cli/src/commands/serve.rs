use anyhow::{Context, Result};
use circa_core::config::AppConfig;
use circa_server::AppState;

use super::build_manager;

pub async fn run(mut config: AppConfig, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }

    let sessions = build_manager(&config)?;
    circa_server::serve(AppState::new(sessions), &config.server)
        .await
        .with_context(|| format!("Server on {} failed", config.server.bind))
}
