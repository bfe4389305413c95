use anyhow::{Context, Result, bail};
use circa_core::design::{ExtractionError, ValidationResult, extract, validate};
use colored::Colorize;
use std::fs;
use std::path::Path;

pub fn run(file: &Path) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let result = check(&text)?;
    for warning in &result.warnings {
        println!("{}", format!("warning: {}", warning).yellow());
    }

    if result.valid {
        println!("{}", format!("{} is a valid circuit design", file.display()).green());
        Ok(())
    } else {
        for error in &result.errors {
            println!("{}", format!("error: {}", error).red());
        }
        bail!("{} has {} validation error(s)", file.display(), result.errors.len());
    }
}

/// Extracts the first JSON document from `text` and validates it.
pub fn check(text: &str) -> Result<ValidationResult, ExtractionError> {
    let document = extract(text)?;
    Ok(validate(&document))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_accepts_prose_wrapped_document() {
        let text = r#"Sure! {"circuit_info": {"name": "a", "description": "b", "supply_voltage": "9V"},
            "blocks": [], "signal_flow": []} Enjoy."#;
        let result = check(text).unwrap();
        assert!(result.valid, "{:?}", result.errors);
    }

    #[test]
    fn test_check_reports_missing_fields() {
        let result = check(r#"{"blocks": []}"#).unwrap();
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![
                "Missing required field: circuit_info",
                "Missing required field: signal_flow"
            ]
        );
    }

    #[test]
    fn test_check_without_json_is_extraction_error() {
        assert!(matches!(
            check("no braces here"),
            Err(ExtractionError::NoJsonDelimitersFound { .. })
        ));
    }
}
