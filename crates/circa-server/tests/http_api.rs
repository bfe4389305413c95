use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use circa_application::{SessionManager, SessionSettings};
use circa_core::error::ServiceError;
use circa_core::service::{CompletionRequest, TextService};
use circa_server::{AppState, app_router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

const DESIGN_REPLY: &str = r#"```json
{
  "circuit_info": {"name": "LFO", "description": "Triangle LFO", "supply_voltage": "±12V"},
  "blocks": [
    {"id": "core", "name": "Core", "function": "triangle oscillator", "position": null, "inputs": [], "outputs": [{"signal_type": "cv_signal"}]},
    {"id": "out", "name": "Out", "function": "output buffer", "position": null, "inputs": [{"signal_type": "cv_signal"}], "outputs": []}
  ],
  "signal_flow": [{"signal_type": "cv_signal", "from_block": "core", "to_block": "out"}]
}
```"#;

struct ScriptedService {
    replies: Mutex<VecDeque<Result<String, ServiceError>>>,
}

#[async_trait]
impl TextService for ScriptedService {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, ServiceError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ServiceError::Transport("script exhausted".into())))
    }
}

fn app(replies: Vec<Result<&str, ServiceError>>) -> Router {
    let service = Arc::new(ScriptedService {
        replies: Mutex::new(replies.into_iter().map(|r| r.map(str::to_string)).collect()),
    });
    let sessions = Arc::new(SessionManager::new(service, SessionSettings::default()));
    app_router(
        AppState::new(sessions),
        &["http://localhost:5173".to_string()],
    )
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn start(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/session/start",
        Some(json!({"description": "triangle LFO"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check() {
    let app = app(vec![]);
    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn full_conversation_over_http() {
    let app = app(vec![
        Ok("What frequency range?"),
        Ok("0.1-20Hz noted. Proceed?"),
        Ok(DESIGN_REPLY),
    ]);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/session/start",
        Some(json!({"description": "triangle LFO"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent_response"], "What frequency range?");
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/session/respond",
        Some(json!({"session_id": session_id, "response": "0.1 to 20 Hz"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], session_id.as_str());
    assert_eq!(body["agent_response"], "0.1-20Hz noted. Proceed?");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/circuit/generate",
        Some(json!({"session_id": session_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["circuit_design"]["blocks"][0]["position"], json!({"x": 300, "y": 0}));
    assert_eq!(body["circuit_design"]["blocks"][1]["position"], json!({"x": 600, "y": 0}));
    assert!(body.get("errors").is_none());

    let uri = format!("/api/session/status?session_id={session_id}");
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "generated");
    assert_eq!(body["conversation_length"], 4);
    assert_eq!(body["has_active_session"], true);
}

#[tokio::test]
async fn generation_failure_is_reported_in_body() {
    let app = app(vec![Ok("Questions?"), Ok("Sorry, I cannot produce JSON.")]);
    let session_id = start(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/circuit/generate",
        Some(json!({"session_id": session_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["circuit_design"], json!({}));
    assert_eq!(body["raw_response"], "Sorry, I cannot produce JSON.");
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);

    let uri = format!("/session/status?session_id={session_id}");
    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["phase"], "gathering");
}

#[tokio::test]
async fn unknown_session_is_404() {
    let app = app(vec![]);
    let (status, body) = send(
        &app,
        Method::POST,
        "/session/respond",
        Some(json!({"session_id": "nope", "response": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("nope"));

    let (status, _) = send(&app, Method::GET, "/session/status?session_id=nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn service_failures_map_to_gateway_statuses() {
    let app = app(vec![
        Err(ServiceError::Timeout {
            after: Duration::from_secs(120),
        }),
        Err(ServiceError::Api {
            status: 500,
            message: "upstream".into(),
            retryable: true,
        }),
    ]);
    let request = json!({"description": "fuzz"});

    let (status, _) = send(&app, Method::POST, "/session/start", Some(request.clone())).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);

    let (status, _) = send(&app, Method::POST, "/session/start", Some(request)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (_, body) = send(&app, Method::GET, "/session/status", None).await;
    assert_eq!(body["has_active_session"], false);
    assert_eq!(body["session_count"], 0);
}

#[tokio::test]
async fn validate_reports_errors_without_a_session() {
    let app = app(vec![]);
    let document = json!({
        "circuit_info": {"name": "x", "description": "y"},
        "blocks": [],
        "signal_flow": []
    });

    let (status, body) = send(
        &app,
        Method::POST,
        "/circuit/validate",
        Some(document.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["errors"], json!(["Missing circuit_info field: supply_voltage"]));

    // The wrapped form is accepted too.
    let (_, body) = send(
        &app,
        Method::POST,
        "/api/circuit/validate",
        Some(json!({"circuit_design": document})),
    )
    .await;
    assert_eq!(body["errors"], json!(["Missing circuit_info field: supply_voltage"]));
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let app = app(vec![]);
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/session/start")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );
}
