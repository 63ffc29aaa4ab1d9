use anyhow::{Context, Result};
use llm_dashboard::{
    config,
    pricing::{PageFetcher, PricingUpdater},
};
use std::path::Path;
use tracing::info;

/// Execute the refresh command
///
/// The report goes to stdout; fetch warnings go to the log on stderr.
pub async fn execute(config_path: &Path, dry_run: bool) -> Result<()> {
    let cfg = config::load_config(config_path)?;

    let fetcher = PageFetcher::from_config(&cfg.refresh)?;
    let updater = PricingUpdater::new(fetcher, &cfg.refresh.data_path);

    info!(dry_run, path = %updater.data_path().display(), "Starting pricing refresh");

    let today = chrono::Local::now().date_naive();
    let mut stdout = std::io::stdout();
    let outcome = updater
        .run(dry_run, today, &mut stdout)
        .await
        .with_context(|| format!("Refresh of {} failed", cfg.refresh.data_path))?;

    info!(
        changes = outcome.events.len(),
        diff = outcome.diff.len(),
        skipped = outcome.skipped.len(),
        written = outcome.written,
        "Refresh complete"
    );

    Ok(())
}
