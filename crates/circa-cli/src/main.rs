use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "circa")]
#[command(about = "CIRCA - Conversational circuit design assistant", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to ~/.config/circa/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of config
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Design a circuit interactively
    Chat {
        /// Where to save the generated design
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Serve the HTTP API
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Extract and validate a design document from a text or JSON file
    Validate { file: PathBuf },
    /// Fill in block positions of a design file
    Layout {
        file: PathBuf,
        /// Recompute every position, not only missing ones
        #[arg(long)]
        force: bool,
        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;
    logging::init(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Chat { output } => commands::chat::run(&config, output).await?,
        Commands::Serve { bind } => commands::serve::run(config, bind).await?,
        Commands::Validate { file } => commands::validate::run(&file)?,
        Commands::Layout {
            file,
            force,
            output,
        } => commands::layout::run(&file, force, output.as_deref())?,
    }

    Ok(())
}
