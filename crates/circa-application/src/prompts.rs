//! Prompt templates for the design conversation.
//!
//! Templates are rendered with minijinja so that the signal-type vocabulary
//! and layout guidelines are generated from the same tables the validator
//! and layout engine use.

use circa_core::design::{BlockCategory, SignalType};
use circa_core::error::ServiceError;
use minijinja::{Environment, context};
use serde::Serialize;

const START_SYSTEM: &str = r#"You are a circuit design assistant. Your role is to ask strategic, specific questions to understand the user's circuit requirements better.

Guidelines:
- Ask 2-3 specific, objective questions at a time
- Focus on practical aspects: application, constraints, component preferences
- Keep questions concise and technical
- Don't ask open-ended questions
- Questions should be directly related to the circuit type mentioned

Example good questions:
- "What is the target frequency range for this oscillator?"
- "Do you have any power supply constraints (voltage/current limits)?"
- "Are there any specific component brands or types you prefer to use?"

Example bad questions:
- "What do you want to do with this circuit?" (too vague)
- "Tell me more about your project" (too open-ended)"#;

const START_FRAMING: &str = "I want to design a circuit: {{ description }}. Please ask me 2-3 specific questions to understand my requirements better.";

const RESPOND_SYSTEM: &str = r#"You are a circuit design assistant. Based on the user's responses, either:
1. Ask 1-2 more specific follow-up questions if you need more information
2. Provide a brief summary of requirements and ask if they want to proceed with design recommendations

Keep responses concise and focused on gathering practical circuit design requirements."#;

const GENERATE_SYSTEM: &str = r#"You are a circuit design expert. Based on the conversation history, generate a structured JSON document describing a functional block diagram of the circuit.

CRITICAL: You must respond with ONLY valid JSON. No text before or after the JSON.

The JSON must follow this exact structure:
{
  "circuit_info": {
    "name": "string",
    "description": "string",
    "supply_voltage": "string (ex: ±12V, +5V)",
    "categories": ["string", ...]
  },
  "blocks": [
    {
      "id": "unique_block_id",
      "name": "display_name",
      "function": "detailed_function_description",
      "position": {"x": 0, "y": 0},
      "inputs": [
        {"signal_type": "signal_type_name", "name": "input_display_name", "required": true, "description": "what this input does"}
      ],
      "outputs": [
        {"signal_type": "signal_type_name", "name": "output_display_name", "description": "what this output provides"}
      ],
      "implementation": "string (ex: OTA integrator core)",
      "how_it_works": "string (working principle, cite the concept or subcircuit name)",
      "keywords": ["string", ...],
      "main_components": ["string", ...],
      "parameters": {"param": "value"},
      "adjustment": "string (how to adjust/calibrate)",
      "test_points": ["string", ...],
      "troubleshooting": "string (diagnostic tips)",
      "alternatives": [
        {"method": "string", "pros": ["string"], "cons": ["string"]}
      ]
    }
  ],
  "signal_flow": [
    {"signal_type": "signal_type_name", "from_block": "source_block_id", "to_block": "destination_block_id", "description": "what this signal carries"}
  ]
}

SIGNAL TYPES TO USE:
{% for signal in signal_types -%}
- "{{ signal.name }}" - {{ signal.description }}
{% endfor %}
POSITIONING GUIDELINES:
{% for column in columns -%}
- {{ column.label }} blocks: {{ column.placement }}
{% endfor %}
Guidelines:
- Each block represents a function (ex: Oscillator Core, Waveshaper, Output Buffer)
- Every signal_flow endpoint must be the id of a block in "blocks"
- Position blocks logically from left to right
- For each block, explain the working principle in 'how_it_works'
- Include practical fields: main_components, parameters, adjustment, test_points, troubleshooting
- RESPOND WITH ONLY JSON, NO EXPLANATIONS"#;

const GENERATE_INSTRUCTION: &str = "Now generate only the structured circuit JSON: circuit_info, blocks (with position, inputs/outputs by signal_type), and signal_flow (connections between blocks). Use the defined signal types ({{ signal_names }}) and position the blocks following the guidelines. No explanations, only JSON.";

#[derive(Serialize)]
struct SignalEntry {
    name: String,
    description: &'static str,
}

#[derive(Serialize)]
struct ColumnEntry {
    label: &'static str,
    placement: String,
}

/// Rendered prompt set shared by every session.
pub struct Prompts {
    env: Environment<'static>,
}

impl Default for Prompts {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompts {
    pub fn new() -> Self {
        let mut env = Environment::new();
        for (name, source) in [
            ("start_framing", START_FRAMING),
            ("generate_system", GENERATE_SYSTEM),
            ("generate_instruction", GENERATE_INSTRUCTION),
        ] {
            if let Err(err) = env.add_template(name, source) {
                tracing::error!(template = name, "Invalid prompt template: {}", err);
            }
        }
        Self { env }
    }

    pub fn start_system(&self) -> &'static str {
        START_SYSTEM
    }

    pub fn respond_system(&self) -> &'static str {
        RESPOND_SYSTEM
    }

    /// The opening user turn embedding the circuit description.
    pub fn start_framing(&self, description: &str) -> Result<String, ServiceError> {
        self.render("start_framing", context! { description => description })
    }

    pub fn generate_system(&self) -> Result<String, ServiceError> {
        let signal_types: Vec<SignalEntry> = SignalType::all()
            .into_iter()
            .map(|signal| SignalEntry {
                name: signal.to_string(),
                description: signal.description(),
            })
            .collect();

        let columns: Vec<ColumnEntry> = BlockCategory::ALL
            .iter()
            .map(|category| ColumnEntry {
                label: category.label(),
                placement: placement(*category),
            })
            .collect();

        self.render(
            "generate_system",
            context! { signal_types => signal_types, columns => columns },
        )
    }

    /// Trailing user instruction for generation; never stored in history.
    pub fn generate_instruction(&self) -> Result<String, ServiceError> {
        let signal_names = SignalType::all()
            .into_iter()
            .map(|signal| signal.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        self.render("generate_instruction", context! { signal_names => signal_names })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, ServiceError> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(ctx))
            .map_err(|err| {
                ServiceError::InvalidRequest(format!("prompt '{name}' failed to render: {err}"))
            })
    }
}

fn placement(category: BlockCategory) -> String {
    match category {
        BlockCategory::Power => format!("x={}, y=400", category.column()),
        other => format!(
            "x={}, y=0 to y=300, stacked {} apart",
            other.column(),
            other.step()
        ),
    }
}
