use axum::Json;
use serde_json::{Value, json};

pub async fn health() -> Json<Value> {
    Json(json!({
        "message": "Circuit design assistant API is running",
        "status": "healthy",
    }))
}
