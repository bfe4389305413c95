use anyhow::{Context, Result, bail};
use circa_core::design::{CircuitDesign, assign_positions, extract, relayout, validate};
use circa_infrastructure::DesignStorage;
use colored::Colorize;
use std::fs;
use std::path::Path;

pub fn run(file: &Path, force: bool, output: Option<&Path>) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let design = apply(&text, force)?;

    match output {
        Some(path) => {
            DesignStorage::new(path)
                .save(&design)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{}", format!("Layout written to {}", path.display()).green());
        }
        None => println!("{}", serde_json::to_string_pretty(&design)?),
    }
    Ok(())
}

/// Parses a design and fills its positions; `force` recomputes all of them.
pub fn apply(text: &str, force: bool) -> Result<CircuitDesign> {
    let document = extract(text)?;

    let result = validate(&document);
    if !result.valid {
        bail!("Design is invalid: {}", result.errors.join("; "));
    }

    let mut design = CircuitDesign::from_raw(&document).context("Design could not be decoded")?;
    design.blocks = if force {
        relayout(&design.blocks)
    } else {
        assign_positions(&design.blocks)
    };
    Ok(design)
}

#[cfg(test)]
mod tests {
    use super::*;
    use circa_core::design::Position;

    const DOC: &str = r#"{
      "circuit_info": {"name": "VCO", "description": "d", "supply_voltage": "±12V"},
      "blocks": [
        {"id": "cv", "name": "CV In", "function": "cv_input jack", "position": {"x": 10, "y": 10}, "inputs": [], "outputs": []},
        {"id": "core", "name": "Core", "function": "saw oscillator", "position": null, "inputs": [], "outputs": []}
      ],
      "signal_flow": [{"signal_type": "cv_signal", "from_block": "cv", "to_block": "core"}]
    }"#;

    #[test]
    fn test_apply_fills_missing_only() {
        let design = apply(DOC, false).unwrap();
        assert_eq!(design.blocks[0].position, Some(Position { x: 10, y: 10 }));
        assert_eq!(design.blocks[1].position, Some(Position { x: 300, y: 0 }));
    }

    #[test]
    fn test_apply_force_recomputes_everything() {
        let design = apply(DOC, true).unwrap();
        assert_eq!(design.blocks[0].position, Some(Position { x: 0, y: 0 }));
    }

    #[test]
    fn test_apply_rejects_invalid_design() {
        let err = apply(r#"{"blocks": []}"#, false).unwrap_err();
        assert!(err.to_string().contains("Missing required field: circuit_info"));
    }
}
