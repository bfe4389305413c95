use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

const VALID: &str = r#"Here you go:
{
  "circuit_info": {"name": "Mixer", "description": "Two channel mixer", "supply_voltage": "±12V"},
  "blocks": [
    {"id": "in1", "name": "In 1", "function": "audio_input jack", "position": null, "inputs": [], "outputs": [{"signal_type": "audio_signal"}]},
    {"id": "mix", "name": "Mix", "function": "summing mixer", "position": null, "inputs": [{"signal_type": "audio_signal"}], "outputs": [{"signal_type": "audio_signal"}]}
  ],
  "signal_flow": [{"signal_type": "audio_signal", "from_block": "in1", "to_block": "mix"}]
}"#;

fn circa(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_circa"))
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn validate_accepts_valid_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("reply.txt");
    fs::write(&file, VALID).unwrap();

    let output = circa(&dir, &["validate", file.to_str().unwrap()]);
    assert!(output.status.success());
}

#[test]
fn validate_fails_on_dangling_flow() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("design.json");
    fs::write(&file, VALID.replace(r#""to_block": "mix""#, r#""to_block": "speaker""#)).unwrap();

    let output = circa(&dir, &["validate", file.to_str().unwrap()]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("to_block 'speaker' not found"));
}

#[test]
fn layout_writes_positions() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("design.json");
    let out = dir.path().join("laid_out.json");
    fs::write(&file, VALID).unwrap();

    let output = circa(
        &dir,
        &["layout", file.to_str().unwrap(), "--output", out.to_str().unwrap()],
    );
    assert!(output.status.success());

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(saved["blocks"][0]["position"], serde_json::json!({"x": 0, "y": 0}));
    assert_eq!(saved["blocks"][1]["position"], serde_json::json!({"x": 300, "y": 0}));
}
