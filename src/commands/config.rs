use anyhow::Result;
use colored::Colorize;
use llm_dashboard::config::{self, Config};
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the effective configuration after file and environment overrides
pub fn show(path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!(path = %path.display(), "Loading configuration for display");

    let cfg = config::load_config(path)?;

    println!("{}", "Current Configuration:".green().bold());
    println!();
    println!("{}", render(&cfg)?);

    Ok(())
}

/// Execute the config validate command
pub fn validate(path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!(path = %path.display(), "Validating configuration");

    let cfg = config::load_config(path)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Proxy: http://{}:{}", cfg.proxy.host, cfg.proxy.port);
    println!("  Allowed Hosts: {}", cfg.proxy.allowed_hosts.len());
    for host in &cfg.proxy.allowed_hosts {
        println!("    - {}", host);
    }
    println!("  Relay Timeout: {}s", cfg.proxy.timeout_seconds);
    println!("  Dataset: {}", cfg.refresh.data_path);
    println!("  Fetch Timeout: {}s", cfg.refresh.timeout_seconds);

    info!("Configuration validation successful");
    Ok(())
}

/// Serialize to TOML format
fn render(cfg: &Config) -> Result<String> {
    Ok(toml::to_string_pretty(cfg)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_round_trips_through_toml() {
        let cfg = Config::default();
        let rendered = render(&cfg).unwrap();

        assert!(rendered.contains("[proxy]"));
        assert!(rendered.contains("port = 8765"));
        assert!(rendered.contains("api.anthropic.com"));

        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.refresh.data_path, cfg.refresh.data_path);
        assert_eq!(parsed.proxy.allowed_hosts, cfg.proxy.allowed_hosts);
    }
}
