//! Circuit design document model.
//!
//! The JSON shape produced by the text service and persisted to disk maps
//! one-to-one onto these types. Optional documentation fields are omitted on
//! output when empty so that a document round-trips through the documented
//! field set.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Root design document: a graph of functional blocks connected by typed signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitDesign {
    pub circuit_info: CircuitInfo,
    pub blocks: Vec<Block>,
    /// Directed edges between blocks. Serialized as `signal_flow`.
    #[serde(rename = "signal_flow")]
    pub signal_flows: Vec<SignalFlow>,
}

impl CircuitDesign {
    /// Decodes an untyped document into the typed model.
    ///
    /// Call this only after [`validate`](super::validate) has accepted the
    /// document; validation checks presence, decoding checks types.
    pub fn from_raw(raw: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitInfo {
    pub name: String,
    pub description: String,
    /// Free-form supply label such as "±12V" or "+5V".
    pub supply_voltage: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// A functional unit of the circuit with typed input and output ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub name: String,
    /// Functional description; also drives layout classification.
    pub function: String,
    /// `None` when the block has not been placed yet.
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub inputs: Vec<Port>,
    #[serde(default)]
    pub outputs: Vec<Port>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how_it_works: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub main_components: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub troubleshooting: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<Alternative>,
}

impl Block {
    /// Creates a block with only the required fields set.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            function: function.into(),
            position: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            implementation: None,
            how_it_works: None,
            keywords: Vec::new(),
            main_components: Vec::new(),
            parameters: Map::new(),
            adjustment: None,
            test_points: Vec::new(),
            troubleshooting: None,
            alternatives: Vec::new(),
        }
    }

    pub fn with_position(mut self, x: i64, y: i64) -> Self {
        self.position = Some(Position { x, y });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

/// An input or output connection point on a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Open-vocabulary tag; see [`SignalType`] for the documented values.
    pub signal_type: String,
    #[serde(default)]
    pub name: String,
    /// Only meaningful for inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default)]
    pub description: String,
}

impl Port {
    pub fn new(signal_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            signal_type: signal_type.into(),
            name: name.into(),
            required: None,
            description: String::new(),
        }
    }
}

/// An alternative implementation approach for a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub method: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalFlow {
    pub signal_type: String,
    pub from_block: String,
    pub to_block: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Documented signal-type vocabulary.
///
/// Validation does not restrict ports to this set; it is used to build the
/// generation prompt and to flag unrecognized tags as warnings.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    /// Oscillator output, processed audio.
    AudioSignal,
    /// Control voltage (1V/oct, modulation).
    CvSignal,
    /// Gate and trigger signals.
    GateSignal,
    /// Synchronization signals.
    SyncSignal,
    /// +12V supply rail.
    #[strum(to_string = "power_12v")]
    #[serde(rename = "power_12v")]
    Power12v,
    /// -12V supply rail.
    #[strum(to_string = "power_neg12v")]
    #[serde(rename = "power_neg12v")]
    PowerNeg12v,
    /// +5V supply rail.
    #[strum(to_string = "power_5v")]
    #[serde(rename = "power_5v")]
    Power5v,
    Ground,
}

impl SignalType {
    /// One-line description used in the generation prompt.
    pub fn description(self) -> &'static str {
        match self {
            Self::AudioSignal => "Audio signals (oscillator output, processed audio)",
            Self::CvSignal => "Control voltage (1V/oct, modulation, etc.)",
            Self::GateSignal => "Gate/trigger signals",
            Self::SyncSignal => "Synchronization signals",
            Self::Power12v => "+12V power supply",
            Self::PowerNeg12v => "-12V power supply",
            Self::Power5v => "+5V power supply",
            Self::Ground => "Ground connections",
        }
    }

    pub fn all() -> Vec<SignalType> {
        Self::iter().collect()
    }
}
