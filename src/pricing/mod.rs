pub mod dataset;
pub mod loader;
pub mod merge;
pub mod parsers;
pub mod updater;

pub use dataset::{diff_datasets, Dataset, FieldChange};
pub use loader::PageFetcher;
pub use merge::{merge_updates, MergeEvent, PriceUpdate, UpdateSet};
pub use parsers::Provider;
pub use updater::{PricingSource, PricingUpdater, RefreshOutcome};
