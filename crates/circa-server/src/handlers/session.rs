use axum::{
    Json,
    extract::{Query, State},
};
use circa_application::SessionStatus;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SessionStartRequest {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UserResponseRequest {
    pub session_id: String,
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub agent_response: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub session_id: Option<String>,
}

pub async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<SessionStartRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    info!("Starting session: {}", request.description);

    let (session_id, agent_response) = state.sessions.start_session(&request.description).await?;

    Ok(Json(SessionResponse {
        session_id,
        agent_response,
    }))
}

pub async fn process_response(
    State(state): State<AppState>,
    Json(request): Json<UserResponseRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let agent_response = state
        .sessions
        .respond(&request.session_id, &request.response)
        .await?;

    Ok(Json(SessionResponse {
        session_id: request.session_id,
        agent_response,
    }))
}

pub async fn session_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<SessionStatus>, ApiError> {
    let status = state.sessions.status(query.session_id.as_deref()).await?;
    Ok(Json(status))
}
