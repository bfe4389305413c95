//! ClaudeApiAgent - Direct REST API implementation of the text service.
//!
//! Configuration priority: ~/.config/circa/secret.json > environment variables

use async_trait::async_trait;
use circa_core::config::ModelConfig;
use circa_core::error::ServiceError;
use circa_core::service::{CompletionRequest, TextService};
use circa_infrastructure::SecretStorage;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Text service implementation that talks to the Claude HTTP API.
#[derive(Clone)]
pub struct ClaudeApiAgent {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl std::fmt::Debug for ClaudeApiAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeApiAgent")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl ClaudeApiAgent {
    /// Creates a new agent with the provided API key and model parameters.
    pub fn new(api_key: impl Into<String>, config: &ModelConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!(
                    error = %err,
                    "Failed to build HTTP client, falling back to defaults without a request timeout"
                );
                Client::new()
            });

        Self {
            client,
            api_key: api_key.into(),
            model: config.name.clone(),
            base_url: config.base_url.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout,
        }
    }

    /// Resolves credentials from secret.json or the environment.
    ///
    /// Priority:
    /// 1. ~/.config/circa/secret.json (`claude.api_key`, `claude.model_name`)
    /// 2. Environment variables (ANTHROPIC_API_KEY, CLAUDE_MODEL_NAME)
    pub fn try_from_config(config: &ModelConfig) -> Result<Self, ServiceError> {
        let secret = SecretStorage::new()
            .inspect_err(|err| {
                tracing::warn!(error = %err, "Cannot locate secret.json, using environment only");
            })
            .ok()
            .and_then(|storage| match storage.claude() {
                Ok(secret) => secret,
                Err(err) => {
                    tracing::debug!("No usable Claude secret: {}", err);
                    None
                }
            });

        if let Some(secret) = secret {
            let agent = Self::new(secret.api_key, config);
            return Ok(match secret.model_name {
                Some(model) => agent.with_model(model),
                None => agent,
            });
        }

        let api_key = env::var("ANTHROPIC_API_KEY").map_err(|_| {
            ServiceError::InvalidRequest(
                "ANTHROPIC_API_KEY not found in ~/.config/circa/secret.json or environment variables"
                    .into(),
            )
        })?;

        let agent = Self::new(api_key, config);
        Ok(match env::var("CLAUDE_MODEL_NAME") {
            Ok(model) => agent.with_model(model),
            Err(_) => agent,
        })
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_request(&self, body: &CreateMessageRequest<'_>) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Claude error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: CreateMessageResponse = response
            .json()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        extract_text_response(parsed)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout {
                after: self.timeout,
            }
        } else {
            ServiceError::Transport(format!("Claude API request failed: {err}"))
        }
    }
}

#[async_trait]
impl TextService for ClaudeApiAgent {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ServiceError> {
        if request.messages.is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Claude request must include at least one message".into(),
            ));
        }

        let messages = request
            .messages
            .iter()
            .map(|message| Message {
                role: message.role.as_str(),
                content: &message.content,
            })
            .collect();

        let body = CreateMessageRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: (!request.system.is_empty()).then_some(request.system.as_str()),
        };

        tracing::debug!(
            model = %self.model,
            message_count = request.messages.len(),
            system_len = request.system.len(),
            "Sending Claude request"
        );

        self.send_request(&body).await
    }
}

#[derive(Serialize)]
struct CreateMessageRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    #[serde(default)]
    content: Vec<ContentBlockResponse>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlockResponse {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: CreateMessageResponse) -> Result<String, ServiceError> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlockResponse::Text { text } => Some(text.trim().to_string()),
            ContentBlockResponse::Other => None,
        })
        .filter(|text| !text.is_empty())
        .ok_or(ServiceError::EmptyCompletion)
}

fn map_http_error(status: StatusCode, body: String) -> ServiceError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    let retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    ServiceError::Api {
        status: status.as_u16(),
        message,
        retryable,
    }
}
