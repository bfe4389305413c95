use axum::{Json, extract::State};
use circa_core::design::{ValidationResult, validate};
use circa_core::error::SessionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::config::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CircuitGenerationRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CircuitDesignResponse {
    pub circuit_design: Value,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

/// Generates a design for the session.
///
/// A reply that cannot be turned into a valid design is reported with
/// `success: false` rather than an error status, so the client can show the
/// errors and retry.
pub async fn generate_circuit(
    State(state): State<AppState>,
    Json(request): Json<CircuitGenerationRequest>,
) -> Result<Json<CircuitDesignResponse>, ApiError> {
    match state.sessions.generate_design(&request.session_id).await {
        Ok(design) => {
            info!(
                session_id = %request.session_id,
                blocks = design.blocks.len(),
                "Circuit generated"
            );
            let circuit_design = serde_json::to_value(&design).map_err(|e| {
                error!("Failed to serialize design: {}", e);
                ApiError::Internal(e.to_string())
            })?;
            Ok(Json(CircuitDesignResponse {
                circuit_design,
                success: true,
                errors: None,
                raw_response: None,
            }))
        }
        Err(SessionError::Generation(err)) => Ok(Json(CircuitDesignResponse {
            circuit_design: Value::Object(Map::new()),
            success: false,
            errors: Some(err.messages()),
            raw_response: err.raw_response().map(str::to_string),
        })),
        Err(err) => Err(err.into()),
    }
}

/// Validates a design document without touching any session.
///
/// Accepts either the bare document or one wrapped as `{"circuit_design": ...}`.
pub async fn validate_circuit(Json(body): Json<Value>) -> Json<ValidationResult> {
    let document = match body.get("circuit_design") {
        Some(inner) if inner.is_object() && body.get("circuit_info").is_none() => inner,
        _ => &body,
    };
    Json(validate(document))
}
