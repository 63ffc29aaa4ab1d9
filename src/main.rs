use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use llm_dashboard::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = cli::Cli::parse();

    init_tracing();

    // Dispatch to appropriate command handler
    match args.get_command() {
        cli::Commands::Proxy => {
            commands::proxy::execute(&args.config).await?;
        }
        cli::Commands::Refresh { dry_run } => {
            commands::refresh::execute(&args.config, dry_run).await?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
            cli::ConfigCommands::Validate => commands::config::validate(&args.config)?,
        },
        cli::Commands::Version => {
            println!("LLM Dashboard v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
