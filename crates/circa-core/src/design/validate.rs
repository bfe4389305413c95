//! Structural and referential validation of an untyped design document.
//!
//! All checks run and accumulate into a single error list; nothing stops at
//! the first failure. The validator is total: any JSON value yields a
//! [`ValidationResult`], with type mismatches reported as errors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::extract::RawDocument;
use super::schema::SignalType;

const TOP_LEVEL_FIELDS: [&str; 3] = ["circuit_info", "blocks", "signal_flow"];
const CIRCUIT_INFO_FIELDS: [&str; 3] = ["name", "description", "supply_voltage"];
const BLOCK_FIELDS: [&str; 6] = ["id", "name", "function", "position", "inputs", "outputs"];
const FLOW_FIELDS: [&str; 3] = ["signal_type", "from_block", "to_block"];
const PORT_GROUPS: [&str; 2] = ["inputs", "outputs"];

/// Outcome of validating a design document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    /// One entry per violated invariant, in check order.
    pub errors: Vec<String>,
    /// Non-fatal findings (unrecognized signal types). Never affect `valid`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn from_findings(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

pub fn validate(doc: &RawDocument) -> ValidationResult {
    let empty = Map::new();
    let root = doc.as_object().unwrap_or(&empty);

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for field in TOP_LEVEL_FIELDS {
        if !root.contains_key(field) {
            errors.push(format!("Missing required field: {field}"));
        }
    }

    if let Some(info) = root.get("circuit_info") {
        check_circuit_info(info, &mut errors);
    }

    let mut block_ids: Vec<&Value> = Vec::new();
    if let Some(blocks) = root.get("blocks") {
        match blocks.as_array() {
            Some(blocks) => {
                for (index, block) in blocks.iter().enumerate() {
                    check_block(index, block, &mut block_ids, &mut errors, &mut warnings);
                }
            }
            None => errors.push("blocks must be a list".to_string()),
        }
    }

    if let (Some(flows), Some(_)) = (root.get("signal_flow"), root.get("blocks")) {
        match flows.as_array() {
            Some(flows) => {
                for (index, flow) in flows.iter().enumerate() {
                    check_flow(index, flow, &block_ids, &mut errors);
                }
            }
            None => errors.push("signal_flow must be a list".to_string()),
        }
    }

    tracing::debug!(
        error_count = errors.len(),
        warning_count = warnings.len(),
        block_count = block_ids.len(),
        "Validated circuit design"
    );

    ValidationResult::from_findings(errors, warnings)
}

fn check_circuit_info(info: &Value, errors: &mut Vec<String>) {
    let Some(info) = info.as_object() else {
        errors.push("circuit_info must be an object".to_string());
        return;
    };
    for field in CIRCUIT_INFO_FIELDS {
        if !info.contains_key(field) {
            errors.push(format!("Missing circuit_info field: {field}"));
        }
    }
}

fn check_block<'a>(
    index: usize,
    block: &'a Value,
    seen_ids: &mut Vec<&'a Value>,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let empty = Map::new();
    let fields = block.as_object().unwrap_or(&empty);

    for field in BLOCK_FIELDS {
        if !fields.contains_key(field) {
            errors.push(format!("Block {index}: Missing required field: {field}"));
        }
    }

    let label = match block.get("id") {
        Some(id) => {
            if seen_ids.contains(&id) {
                errors.push(format!("Duplicate block ID: {}", display_value(id)));
            } else {
                seen_ids.push(id);
            }
            display_value(id)
        }
        None => index.to_string(),
    };

    for group in PORT_GROUPS {
        let Some(ports) = fields.get(group) else {
            continue;
        };
        let Some(ports) = ports.as_array() else {
            errors.push(format!("Block {label}: {group} must be a list"));
            continue;
        };
        for (port_index, port) in ports.iter().enumerate() {
            match port.get("signal_type") {
                None => errors.push(format!(
                    "Block {label}: {group}[{port_index}] missing signal_type"
                )),
                Some(Value::String(tag)) if tag.parse::<SignalType>().is_err() => {
                    warnings.push(format!(
                        "Block {label}: {group}[{port_index}] uses unrecognized signal_type '{tag}'"
                    ))
                }
                Some(_) => {}
            }
        }
    }
}

fn check_flow(index: usize, flow: &Value, block_ids: &[&Value], errors: &mut Vec<String>) {
    let empty = Map::new();
    let fields = flow.as_object().unwrap_or(&empty);

    for field in FLOW_FIELDS {
        if !fields.contains_key(field) {
            errors.push(format!("Signal flow {index}: Missing required field: {field}"));
        }
    }

    for endpoint in ["from_block", "to_block"] {
        if let Some(target) = fields.get(endpoint) {
            if !block_ids.contains(&target) {
                errors.push(format!(
                    "Signal flow {index}: {endpoint} '{}' not found",
                    display_value(target)
                ));
            }
        }
    }
}

/// Strings render bare; anything else renders as compact JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
