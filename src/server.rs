use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::post,
    Router,
};
use reqwest::redirect::Policy;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    allowlist::HostAllowlist,
    config::ProxyConfig,
    handlers::{self, AppState},
    signals::shutdown_signal,
};

const MAX_REDIRECTS: usize = 10;

/// Start the CORS forwarding proxy
///
/// Binds to the configured address and serves until Ctrl-C or SIGTERM.
pub async fn start_server(config: ProxyConfig) -> Result<()> {
    let app_state = build_state(&config)?;
    let allowed_hosts: Vec<String> = app_state
        .allowlist
        .sorted()
        .into_iter()
        .map(str::to_string)
        .collect();
    let app = create_router(app_state, config.max_body_bytes);

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("LLM Dashboard CORS proxy running on http://{}", addr);
    info!(
        allowed_hosts = ?allowed_hosts,
        timeout_seconds = config.timeout_seconds,
        "Relay configuration"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    info!("Proxy stopped");
    Ok(())
}

/// Build shared handler state from configuration
pub fn build_state(config: &ProxyConfig) -> Result<AppState> {
    let allowlist = Arc::new(HostAllowlist::new(config.allowed_hosts.iter().cloned()));

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .redirect(redirect_policy(allowlist.clone()))
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

    Ok(AppState {
        allowlist,
        http_client,
    })
}

/// Follow redirects only between allowlisted hosts.
///
/// A redirect anywhere else is not followed; the 3xx is relayed to the caller as-is.
fn redirect_policy(allowlist: Arc<HostAllowlist>) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.stop();
        }
        match allowlist.check(attempt.url().as_str()) {
            Ok(_) => attempt.follow(),
            Err(host) => {
                warn!(host = %host, "Not following redirect off the allowlist");
                attempt.stop()
            }
        }
    })
}

/// Create the Axum router with all routes and middleware
pub fn create_router(app_state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(
            "/proxy",
            post(handlers::relay::handle_relay).options(handlers::preflight::handle_preflight),
        )
        .fallback(handlers::preflight::handle_fallback)
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}
