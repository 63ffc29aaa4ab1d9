use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "llm-dashboard", version, about = "LLM pricing dashboard tools")]
pub struct Cli {
    /// Configuration file path (extension optional, file optional)
    #[arg(short, long, default_value = "config", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the CORS forwarding proxy for the playground (default)
    Proxy,

    /// Refresh model pricing in the dataset from provider pages
    Refresh {
        /// Show what would change without writing the dataset
        #[arg(long)]
        dry_run: bool,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display the effective configuration
    Show,

    /// Validate configuration
    Validate,
}

impl Cli {
    /// Get the command to execute, defaulting to Proxy if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Proxy)
    }
}
