use anyhow::Result;
use colored::Colorize;
use llm_dashboard::{config, server};
use std::path::Path;
use tracing::info;

/// Execute the proxy command
///
/// Loads configuration and serves until interrupted.
pub async fn execute(config_path: &Path) -> Result<()> {
    let cfg = config::load_config(config_path)?;

    println!(
        "{}",
        format!(
            "LLM Dashboard CORS proxy running on http://{}:{}",
            cfg.proxy.host, cfg.proxy.port
        )
        .green()
    );
    println!("Press Ctrl+C to stop.");
    info!("Starting CORS proxy");

    server::start_server(cfg.proxy).await?;

    println!();
    println!("Stopped.");
    Ok(())
}
