use circa_core::config::AppConfig;
use circa_core::design::{CircuitDesign, assign_positions, extract, validate};
use circa_core::error::{GenerationError, ServiceError, SessionError};
use circa_core::service::{ChatMessage, CompletionRequest, TextService};
use circa_core::session::{Phase, Session};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

use crate::prompts::Prompts;

const RAW_PREVIEW_CHARS: usize = 200;

/// Tunables for session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Deadline applied to every text-service call.
    pub timeout: Duration,
    /// Fill missing block positions after a successful generation.
    pub auto_layout: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            auto_layout: true,
        }
    }
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.model.timeout_secs),
            auto_layout: config.session.auto_layout,
        }
    }
}

/// Snapshot reported by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    pub conversation_length: usize,
    pub has_active_session: bool,
    pub session_count: usize,
}

/// Owns every live session and drives the conversation workflow.
///
/// The registry lock is held only for lookup and insert. Each session has its
/// own mutex, held across the text-service call, so operations on one
/// session are serialized while different sessions proceed independently.
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Arc<Mutex<Session>>>>>,
    service: Arc<dyn TextService>,
    prompts: Prompts,
    settings: SessionSettings,
}

impl SessionManager {
    pub fn new(service: Arc<dyn TextService>, settings: SessionSettings) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            service,
            prompts: Prompts::new(),
            settings,
        }
    }

    /// Starts a new session and returns its id with the assistant's questions.
    ///
    /// The session is registered only after the service has answered.
    pub async fn start_session(&self, description: &str) -> Result<(String, String), SessionError> {
        let framing = self.prompts.start_framing(description)?;
        let request = CompletionRequest::new(
            self.prompts.start_system(),
            vec![ChatMessage::user(framing.clone())],
        );

        let reply = self.complete(request).await?;

        let mut session = Session::new();
        session.begin(framing, reply.clone());
        let session_id = session.id.clone();

        tracing::info!(
            session_id = %session_id,
            phase = %session.phase,
            turns = session.len(),
            "Session started"
        );

        self.sessions
            .write()
            .await
            .insert(session_id.clone(), Arc::new(Mutex::new(session)));

        Ok((session_id, reply))
    }

    /// Sends a user answer and returns the assistant's follow-up.
    ///
    /// On failure the session history is unchanged.
    pub async fn respond(&self, session_id: &str, user_text: &str) -> Result<String, SessionError> {
        let handle = self.get(session_id).await?;
        let mut session = handle.lock().await;
        session.ensure_started("respond")?;

        let mut messages = session.history();
        messages.push(ChatMessage::user(user_text));
        let request = CompletionRequest::new(self.prompts.respond_system(), messages);

        let reply = self.complete(request).await.inspect_err(|err| {
            tracing::warn!(session_id = %session_id, "Respond failed: {}", err);
        })?;

        session.record_exchange(user_text, reply.clone())?;
        tracing::info!(
            session_id = %session_id,
            phase = %session.phase,
            turns = session.len(),
            "Recorded exchange"
        );

        Ok(reply)
    }

    /// Asks the service for a design document and validates it.
    ///
    /// Only a design that validates and decodes moves the session to
    /// `Generated`; any failure leaves phase and history untouched so the
    /// call can simply be retried.
    pub async fn generate_design(&self, session_id: &str) -> Result<CircuitDesign, SessionError> {
        let handle = self.get(session_id).await?;
        let mut session = handle.lock().await;
        session.ensure_started("generate")?;

        let mut messages = session.history();
        messages.push(ChatMessage::user(self.prompts.generate_instruction()?));
        let request = CompletionRequest::new(self.prompts.generate_system()?, messages);

        let reply = self.complete(request).await?;
        tracing::debug!(
            session_id = %session_id,
            raw_len = reply.len(),
            raw = %preview(&reply),
            "Generation reply received"
        );

        let design = self.interpret(&reply).inspect_err(|err| {
            tracing::warn!(
                session_id = %session_id,
                error_count = err.messages().len(),
                "Generation rejected: {}",
                err
            );
        })?;

        session.complete_generation(design.clone())?;
        tracing::info!(
            session_id = %session_id,
            phase = %session.phase,
            blocks = design.blocks.len(),
            "Design generated"
        );

        Ok(design)
    }

    /// Reports on one session, or on the registry as a whole.
    pub async fn status(&self, session_id: Option<&str>) -> Result<SessionStatus, SessionError> {
        let session_count = self.sessions.read().await.len();

        match session_id {
            Some(id) => {
                let handle = self.get(id).await?;
                let session = handle.lock().await;
                Ok(SessionStatus {
                    session_id: Some(session.id.clone()),
                    phase: Some(session.phase),
                    conversation_length: session.len(),
                    has_active_session: !session.is_empty(),
                    session_count,
                })
            }
            None => Ok(SessionStatus {
                session_id: None,
                phase: None,
                conversation_length: 0,
                has_active_session: session_count > 0,
                session_count,
            }),
        }
    }

    /// Returns a copy of the session's current state.
    pub async fn snapshot(&self, session_id: &str) -> Result<Session, SessionError> {
        let handle = self.get(session_id).await?;
        let session = handle.lock().await;
        Ok(session.clone())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn get(&self, session_id: &str) -> Result<Arc<Mutex<Session>>, SessionError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound {
                id: session_id.to_string(),
            })
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, ServiceError> {
        let deadline = self.settings.timeout;
        let reply = tokio::time::timeout(deadline, self.service.complete(request))
            .await
            .map_err(|_| ServiceError::Timeout { after: deadline })??;

        if reply.trim().is_empty() {
            return Err(ServiceError::EmptyCompletion);
        }
        Ok(reply)
    }

    fn interpret(&self, reply: &str) -> Result<CircuitDesign, GenerationError> {
        let document = extract(reply)?;

        let result = validate(&document);
        for warning in &result.warnings {
            tracing::warn!("{}", warning);
        }
        if !result.valid {
            return Err(GenerationError::Validation {
                errors: result.errors,
                raw: reply.to_string(),
            });
        }

        let mut design =
            CircuitDesign::from_raw(&document).map_err(|err| GenerationError::Decode {
                message: err.to_string(),
                raw: reply.to_string(),
            })?;

        if self.settings.auto_layout {
            design.blocks = assign_positions(&design.blocks);
        }
        Ok(design)
    }
}

fn preview(raw: &str) -> String {
    match raw.char_indices().nth(RAW_PREVIEW_CHARS) {
        Some((end, _)) => format!("{}...", &raw[..end]),
        None => raw.to_string(),
    }
}
