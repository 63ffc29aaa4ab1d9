use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix, e.g. `LLM_DASHBOARD__PROXY__PORT=9000`
pub const ENV_PREFIX: &str = "LLM_DASHBOARD";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

/// Settings for the CORS forwarding proxy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyConfig {
    #[serde(default = "default_proxy_host")]
    pub host: String,

    #[serde(default = "default_proxy_port")]
    pub port: u16,

    /// Timeout applied to every forwarded request
    #[serde(default = "default_relay_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Destination hostnames the relay may talk to (exact match)
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_proxy_host(),
            port: default_proxy_port(),
            timeout_seconds: default_relay_timeout_seconds(),
            allowed_hosts: default_allowed_hosts(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Settings for the pricing data refresh helper
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshConfig {
    #[serde(default = "default_data_path")]
    pub data_path: String,

    /// Per-page fetch timeout
    #[serde(default = "default_fetch_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            timeout_seconds: default_fetch_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_proxy_host() -> String {
    "127.0.0.1".to_string()
}

fn default_proxy_port() -> u16 {
    8765
}

fn default_relay_timeout_seconds() -> u64 {
    120
}

fn default_allowed_hosts() -> Vec<String> {
    vec![
        "api.openai.com".to_string(),
        "api.anthropic.com".to_string(),
        "generativelanguage.googleapis.com".to_string(),
    ]
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_data_path() -> String {
    "data.json".to_string()
}

fn default_fetch_timeout_seconds() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) LLM-Dashboard-Refresh/1.0".to_string()
}

/// Load configuration: defaults, then the optional file, then environment overrides.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::with_name(&path.to_string_lossy()).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("proxy.allowed_hosts")
                .try_parsing(true),
        )
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.proxy.port == 0 {
        anyhow::bail!("proxy.port must be non-zero");
    }
    if cfg.proxy.timeout_seconds == 0 {
        anyhow::bail!("proxy.timeout_seconds must be non-zero");
    }
    if cfg.proxy.allowed_hosts.is_empty() {
        anyhow::bail!("proxy.allowed_hosts must list at least one host");
    }
    if cfg.proxy.allowed_hosts.iter().any(|h| h.trim().is_empty()) {
        anyhow::bail!("proxy.allowed_hosts cannot contain blank entries");
    }

    if cfg.refresh.data_path.trim().is_empty() {
        anyhow::bail!("refresh.data_path cannot be empty");
    }
    if cfg.refresh.timeout_seconds == 0 {
        anyhow::bail!("refresh.timeout_seconds must be non-zero");
    }
    if cfg.refresh.user_agent.trim().is_empty() {
        anyhow::bail!("refresh.user_agent cannot be empty");
    }

    Ok(())
}
