use crate::error::RefreshError;
use crate::pricing::{
    dataset::{diff_datasets, Dataset, FieldChange},
    loader::PageFetcher,
    merge::{merge_updates, MergeEvent, UpdateSet},
    parsers::{PageParser, Provider},
};
use chrono::NaiveDate;
use futures::future::join_all;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where a provider's pricing page lives and how to read it
#[derive(Debug, Clone)]
pub struct PricingSource {
    pub provider: Provider,
    pub url: String,
    pub parser: PageParser,
}

impl PricingSource {
    pub fn new(provider: Provider, url: impl Into<String>) -> Self {
        Self {
            provider,
            url: url.into(),
            parser: provider.parser(),
        }
    }

    pub fn with_parser(mut self, parser: PageParser) -> Self {
        self.parser = parser;
        self
    }

    /// The built-in provider table
    pub fn defaults() -> Vec<Self> {
        Provider::ALL
            .into_iter()
            .map(|provider| Self::new(provider, provider.pricing_url()))
            .collect()
    }
}

/// Everything one refresh run produced
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub before: Dataset,
    pub after: Dataset,
    pub updates: UpdateSet,
    pub events: Vec<MergeEvent>,
    pub diff: Vec<FieldChange>,
    /// Providers whose page could not be fetched
    pub skipped: Vec<Provider>,
    pub written: bool,
}

/// Refreshes the dashboard dataset from provider pricing pages.
///
/// load → fetch all → parse all → merge → stamp date → diff → optionally persist.
/// Only a dataset load or write failure aborts the run.
pub struct PricingUpdater {
    fetcher: PageFetcher,
    sources: Vec<PricingSource>,
    data_path: PathBuf,
}

impl PricingUpdater {
    pub fn new(fetcher: PageFetcher, data_path: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            sources: PricingSource::defaults(),
            data_path: data_path.into(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<PricingSource>) -> Self {
        self.sources = sources;
        self
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Run once, writing the human-readable report to `out`
    pub async fn run<W: Write>(
        &self,
        dry_run: bool,
        today: NaiveDate,
        out: &mut W,
    ) -> Result<RefreshOutcome, RefreshError> {
        let mut dataset = Dataset::load(&self.data_path).await?;
        let before = dataset.clone();

        writeln!(out, "LLM Dashboard — Data Refresh")?;
        writeln!(out, "{}", "=".repeat(40))?;
        writeln!(
            out,
            "Loaded {} models from {}",
            dataset.model_count(),
            self.data_path.display()
        )?;
        writeln!(out, "Last updated: {}", dataset.last_updated())?;
        writeln!(out)?;

        let (updates, skipped) = self.collect_updates(out).await?;
        writeln!(out)?;

        let events = if updates.is_empty() {
            writeln!(out, "No automated price updates extracted.")?;
            writeln!(
                out,
                "(This is normal — most providers use dynamic JS rendering.)"
            )?;
            writeln!(
                out,
                "Tip: Update {} manually when you see price changes.",
                self.data_path.display()
            )?;
            Vec::new()
        } else {
            let events = merge_updates(&mut dataset, &updates);
            if events.is_empty() {
                writeln!(out, "No price changes to apply.")?;
            } else {
                writeln!(out, "Changes detected:")?;
                for event in &events {
                    writeln!(out, "  {}", event)?;
                }
            }
            events
        };

        if !skipped.is_empty() {
            let names: Vec<&str> = skipped.iter().map(|p| p.key()).collect();
            writeln!(out, "Skipped (fetch failed): {}", names.join(", "))?;
        }

        dataset.set_last_updated(today);

        writeln!(out)?;
        writeln!(out, "Diff summary:")?;
        let diff = diff_datasets(&before, &dataset);
        if diff.is_empty() {
            writeln!(out, "  No pricing changes detected.")?;
        } else {
            for change in &diff {
                writeln!(out, "  {}", change)?;
            }
        }

        writeln!(out)?;
        if dry_run {
            writeln!(out, "[DRY RUN] No changes written to disk.")?;
        } else {
            dataset.save(&self.data_path).await?;
            info!(path = %self.data_path.display(), "Dataset written");
            writeln!(
                out,
                "Updated {} (last_updated: {})",
                self.data_path.display(),
                dataset.last_updated()
            )?;
            writeln!(
                out,
                "Run `git diff {}` to review changes.",
                self.data_path.display()
            )?;
        }

        Ok(RefreshOutcome {
            before,
            after: dataset,
            updates,
            events,
            diff,
            skipped,
            written: !dry_run,
        })
    }

    /// Fetch every page concurrently, then parse in table order.
    ///
    /// Later providers override earlier ones for the same model name.
    async fn collect_updates<W: Write>(
        &self,
        out: &mut W,
    ) -> Result<(UpdateSet, Vec<Provider>), RefreshError> {
        let pages = join_all(
            self.sources
                .iter()
                .map(|source| self.fetcher.fetch_page(&source.url)),
        )
        .await;

        let mut all_updates = UpdateSet::new();
        let mut skipped = Vec::new();

        for (source, page) in self.sources.iter().zip(pages) {
            writeln!(out, "Fetching {}...", source.provider)?;

            let page = match page {
                Ok(page) => page,
                Err(e) => {
                    warn!(provider = %source.provider, error = %e, "Skipping provider");
                    skipped.push(source.provider);
                    continue;
                }
            };

            let updates = (source.parser)(&page);
            if !updates.is_empty() {
                writeln!(out, "  Found {} model price updates", updates.len())?;
            }
            all_updates.extend(updates);
        }

        Ok((all_updates, skipped))
    }
}
