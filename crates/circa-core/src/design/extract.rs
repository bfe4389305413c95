//! Pulls a candidate JSON document out of free-form generated text.
//!
//! The reply may carry prose around the document. Everything from the first
//! `{` through the last `}` is parsed; nothing is repaired.

use serde_json::Value;
use thiserror::Error;

/// An untyped, parsed JSON document awaiting validation.
pub type RawDocument = Value;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("could not find a JSON object in the response")]
    NoJsonDelimitersFound { raw: String },

    #[error("JSON parsing error: {message}")]
    MalformedJson { message: String, raw: String },
}

impl ExtractionError {
    /// The text the extraction was attempted on.
    pub fn raw(&self) -> &str {
        match self {
            Self::NoJsonDelimitersFound { raw } | Self::MalformedJson { raw, .. } => raw,
        }
    }
}

pub fn extract(raw_text: &str) -> Result<RawDocument, ExtractionError> {
    let (Some(start), Some(end)) = (raw_text.find('{'), raw_text.rfind('}')) else {
        return Err(ExtractionError::NoJsonDelimitersFound {
            raw: raw_text.to_string(),
        });
    };

    // '{' and '}' are single-byte, so both indices are char boundaries.
    // A '}' before the first '{' leaves an empty candidate.
    let candidate = raw_text.get(start..=end).unwrap_or_default();
    tracing::debug!(
        candidate_len = candidate.len(),
        raw_len = raw_text.len(),
        "Extracted JSON candidate"
    );

    serde_json::from_str(candidate).map_err(|err| ExtractionError::MalformedJson {
        message: err.to_string(),
        raw: raw_text.to_string(),
    })
}
