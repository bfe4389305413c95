use anyhow::{Context, Result};
use circa_application::SessionManager;
use circa_core::config::AppConfig;
use circa_core::design::CircuitDesign;
use circa_core::error::SessionError;
use circa_infrastructure::DesignStorage;
use circa_infrastructure::paths::CircaPaths;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::{Path, PathBuf};

use super::build_manager;

const DEFAULT_FILE_NAME: &str = "circuit_design.json";

/// What the user typed at the conversation prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Generate,
    Empty,
    Answer(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    match trimmed.to_lowercase().as_str() {
        "quit" | "exit" | "q" => Input::Quit,
        "generate" => Input::Generate,
        "" => Input::Empty,
        _ => Input::Answer(trimmed),
    }
}

pub async fn run(config: &AppConfig, output: Option<PathBuf>) -> Result<()> {
    let manager = build_manager(config)?;
    let output = match output {
        Some(path) => path,
        None => CircaPaths::designs_dir()
            .context("Failed to resolve designs directory")?
            .join(DEFAULT_FILE_NAME),
    };

    let mut rl = DefaultEditor::new()?;

    println!("{}", "=== Circuit Design Assistant ===".bright_magenta().bold());
    println!();

    let Some(description) = read_description(&mut rl)? else {
        println!("{}", "No description provided. Exiting.".bright_black());
        return Ok(());
    };

    let (session_id, reply) = manager
        .start_session(&description)
        .await
        .context("Failed to start design session")?;
    print_agent(&reply);

    loop {
        println!(
            "{}",
            "Your response ('generate' to create the design, 'quit' to exit)".bright_black()
        );
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };

        match parse_input(&line) {
            Input::Quit => break,
            Input::Empty => {
                println!("{}", "Please provide a response.".yellow());
            }
            Input::Generate => {
                if generate(&manager, &session_id, &output).await? {
                    break;
                }
            }
            Input::Answer(answer) => {
                let _ = rl.add_history_entry(answer);
                match manager.respond(&session_id, answer).await {
                    Ok(reply) => print_agent(&reply),
                    Err(err) => eprintln!("{}", format!("Error: {}", err).red()),
                }
            }
        }
    }

    println!("{}", "Session ended. Goodbye!".bright_green());
    Ok(())
}

fn read_description(rl: &mut DefaultEditor) -> Result<Option<String>> {
    println!(
        "{}",
        "Describe the circuit you want to design (e.g. 'a 555 square wave oscillator')".bright_black()
    );
    match rl.readline(">> ") {
        Ok(line) if !line.trim().is_empty() => Ok(Some(line.trim().to_string())),
        Ok(_) | Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Returns `true` once a design has been generated and saved.
async fn generate(manager: &SessionManager, session_id: &str, output: &Path) -> Result<bool> {
    println!("{}", "Generating circuit design...".bright_black());

    match manager.generate_design(session_id).await {
        Ok(design) => {
            print_design(&design)?;
            DesignStorage::new(output)
                .save(&design)
                .with_context(|| format!("Failed to save design to {}", output.display()))?;
            println!(
                "{}",
                format!("Circuit design saved to '{}'", output.display()).bright_green()
            );
            Ok(true)
        }
        Err(SessionError::Generation(err)) => {
            for message in err.messages() {
                eprintln!("{}", format!("Error: {}", message).red());
            }
            if let Some(raw) = err.raw_response() {
                eprintln!("{}", format!("Raw response: {}", raw).bright_black());
            }
            println!("{}", "Answer more questions or type 'generate' to retry.".yellow());
            Ok(false)
        }
        Err(err) => {
            eprintln!("{}", format!("Error: {}", err).red());
            Ok(false)
        }
    }
}

fn print_agent(reply: &str) {
    println!();
    for line in reply.lines() {
        println!("{}", line.bright_blue());
    }
    println!();
}

fn print_design(design: &CircuitDesign) -> Result<()> {
    println!("{}", "Circuit design generated successfully!".bright_green());
    println!(
        "{}",
        format!(
            "{} ({} blocks, {} connections)",
            design.circuit_info.name,
            design.blocks.len(),
            design.signal_flows.len()
        )
        .bold()
    );
    println!("{}", serde_json::to_string_pretty(design)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("quit"), Input::Quit);
        assert_eq!(parse_input(" Q "), Input::Quit);
        assert_eq!(parse_input("EXIT"), Input::Quit);
        assert_eq!(parse_input("generate"), Input::Generate);
        assert_eq!(parse_input("   "), Input::Empty);
        assert_eq!(parse_input(" 9V battery "), Input::Answer("9V battery"));
    }
}
