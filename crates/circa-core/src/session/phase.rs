//! Session lifecycle stages.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Discrete stage of a design session.
///
/// `Init` → `Gathering` on start, `Gathering` loops on each user reply, and
/// `Generated` is entered once a design validates. There is no way back from
/// `Generated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    #[default]
    Init,
    Gathering,
    /// Requirements are complete. Kept for wire compatibility; the current
    /// flow goes straight from `Gathering` to `Generated`.
    ReadyToGenerate,
    Generated,
}

impl Phase {
    /// Whether the conversation has been started.
    pub fn is_started(self) -> bool {
        !matches!(self, Self::Init)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_wire_name() {
        for phase in [Phase::Init, Phase::Gathering, Phase::ReadyToGenerate, Phase::Generated] {
            let wire = serde_json::to_value(phase).unwrap();
            assert_eq!(wire, phase.to_string());
        }
        assert_eq!(Phase::ReadyToGenerate.to_string(), "ready_to_generate");
    }
}
