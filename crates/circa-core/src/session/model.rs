//! Session domain model.
//!
//! A `Session` is a plain value: every mutation happens only after the text
//! service has answered, so a failed call leaves the session untouched.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::{Role, Turn};
use super::phase::Phase;
use crate::design::CircuitDesign;
use crate::error::SessionError;
use crate::service::ChatMessage;

/// A conversational design session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID v4)
    pub id: String,
    pub phase: Phase,
    turns: Vec<Turn>,
    /// The last design that passed validation, if any.
    pub design: Option<CircuitDesign>,
    /// Timestamp when the session was created (RFC 3339)
    pub created_at: String,
    /// Timestamp of the last mutation (RFC 3339)
    pub updated_at: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a session in `Init` with a fresh random identifier.
    pub fn new() -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            phase: Phase::Init,
            turns: Vec::new(),
            design: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Full history in the shape the text service expects.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.turns.iter().map(ChatMessage::from).collect()
    }

    /// Replaces the conversation with `framing` plus the assistant's reply
    /// and moves to `Gathering`.
    pub fn begin(&mut self, framing: impl Into<String>, reply: impl Into<String>) {
        self.turns.clear();
        self.design = None;
        self.push(Role::User, framing.into());
        self.push(Role::Assistant, reply.into());
        self.phase = Phase::Gathering;
    }

    /// Appends a user turn and the assistant's answer. Phase is unchanged.
    pub fn record_exchange(
        &mut self,
        user_text: impl Into<String>,
        reply: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.ensure_started("respond")?;
        self.push(Role::User, user_text.into());
        self.push(Role::Assistant, reply.into());
        Ok(())
    }

    /// Stores a validated design and moves to `Generated`.
    pub fn complete_generation(&mut self, design: CircuitDesign) -> Result<(), SessionError> {
        self.ensure_started("generate")?;
        self.design = Some(design);
        self.phase = Phase::Generated;
        self.touch();
        Ok(())
    }

    /// Fails with `InvalidPhase` if the session has not been started.
    pub fn ensure_started(&self, operation: &'static str) -> Result<(), SessionError> {
        if self.phase.is_started() {
            Ok(())
        } else {
            Err(SessionError::InvalidPhase {
                phase: self.phase,
                operation,
            })
        }
    }

    fn push(&mut self, role: Role, content: String) {
        let position = self.turns.len();
        self.turns.push(Turn {
            role,
            content,
            position,
            timestamp: Utc::now().to_rfc3339(),
        });
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now().to_rfc3339();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{CircuitInfo, CircuitDesign};

    fn design() -> CircuitDesign {
        CircuitDesign {
            circuit_info: CircuitInfo {
                name: "LFO".to_string(),
                description: "Triangle LFO".to_string(),
                supply_voltage: "±12V".to_string(),
                categories: vec![],
            },
            blocks: vec![],
            signal_flows: vec![],
        }
    }

    #[test]
    fn test_new_session_is_init_with_unique_id() {
        let a = Session::new();
        let b = Session::new();
        assert_eq!(a.phase, Phase::Init);
        assert!(a.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_begin_moves_to_gathering_and_resets() {
        let mut session = Session::new();
        session.begin("I want a fuzz", "What supply voltage?");
        session.record_exchange("9V", "Germanium or silicon?").unwrap();

        session.begin("I want a delay", "Analog or digital?");
        assert_eq!(session.phase, Phase::Gathering);
        assert_eq!(session.len(), 2);
        assert_eq!(session.turns()[0].role, Role::User);
        assert_eq!(session.turns()[0].content, "I want a delay");
        assert_eq!(session.turns()[1].role, Role::Assistant);
    }

    #[test]
    fn test_record_exchange_preserves_order_and_phase() {
        let mut session = Session::new();
        session.begin("framing", "q1");
        session.record_exchange("a1", "q2").unwrap();

        assert_eq!(session.phase, Phase::Gathering);
        let positions: Vec<usize> = session.turns().iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
        let history = session.history();
        assert_eq!(history[2], ChatMessage::user("a1"));
        assert_eq!(history[3], ChatMessage::assistant("q2"));
    }

    #[test]
    fn test_operations_rejected_before_start() {
        let mut session = Session::new();
        assert!(matches!(
            session.record_exchange("hi", "there"),
            Err(SessionError::InvalidPhase { phase: Phase::Init, operation: "respond" })
        ));
        assert!(session.complete_generation(design()).is_err());
        assert!(session.is_empty());

        let err = session.record_exchange("hi", "there").unwrap_err();
        assert_eq!(err.to_string(), "operation 'respond' is not allowed in phase init");
    }

    #[test]
    fn test_complete_generation_sets_generated() {
        let mut session = Session::new();
        session.begin("framing", "q1");
        session.complete_generation(design()).unwrap();
        assert_eq!(session.phase, Phase::Generated);
        assert_eq!(session.design.as_ref().unwrap().circuit_info.name, "LFO");
        // History is not touched by generation.
        assert_eq!(session.len(), 2);
    }
}
