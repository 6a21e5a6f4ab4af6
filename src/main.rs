use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use emoscope::cli;

#[derive(Debug, Parser)]
#[command(name = "emoscope")]
#[command(about = "Terminal dashboard for an emotion-classification service")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze a single text and record the result in history
    Analyze {
        /// The text to analyze
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },
    /// Analyze up to 10 texts in a single round trip
    Batch {
        /// Texts to analyze (pass the argument multiple times)
        texts: Vec<String>,
        /// Read texts from a file, one per line
        #[arg(long)]
        file: Option<PathBuf>,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Browse stored predictions
    History {
        /// Only show records whose text contains this substring
        #[arg(long)]
        search: Option<String>,
        /// Only show records with this exact predicted emotion
        #[arg(long)]
        emotion: Option<String>,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Remove a single history record by id
    Remove {
        /// The record id (shown by `emoscope history`)
        id: String,
    },
    /// Clear all history (asks for confirmation unless --yes)
    Clear {
        /// Skip the interactive confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Export history to a JSON snapshot file
    Export {
        /// Output path (default: emotion-history-YYYY-MM-DD.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show metadata about the loaded model
    Info {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Check service health
    Health,
    /// List the emotion labels the service supports
    Emotions,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective (fully resolved) configuration
    Show,
    /// Write an annotated default config to ~/.emoscope/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Print the config file locations
    Path,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Analyze { text } => {
            let text = text.join(" ");
            cli::run_analyze(&text)
        }
        Commands::Batch {
            texts,
            file,
            format,
        } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_batch(texts, file.as_deref(), fmt)
        }
        Commands::History {
            search,
            emotion,
            format,
        } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_history(search.as_deref(), emotion.as_deref(), fmt)
        }
        Commands::Remove { id } => cli::run_remove(&id),
        Commands::Clear { yes } => cli::run_clear(yes),
        Commands::Export { output } => cli::run_export(output.as_deref()),
        Commands::Info { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_info(fmt)
        }
        Commands::Health => cli::run_health(),
        Commands::Emotions => cli::run_emotions(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Path => cli::run_config_path(),
        },
    }
}
