//! The update orchestrator.
//!
//! `update_item` runs one item through resolve → fetch-latest → scrape
//! → classify → conditional persist. `run_pass` fans out over every
//! tracked item with a bounded worker pool, collects outcomes in
//! completion order, forwards price falls to the notifier, and tallies
//! a pass report. Per-item failures never abort sibling items; only a
//! failed item-list load aborts the pass.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::UpdateError;
use crate::extractors::ExtractorRegistry;
use crate::fetch::resolve_source_url;
use crate::traits::notifier::Notifier;
use crate::traits::store::{ItemStore, PriceHistory};
use crate::types::config::UpdateConfig;
use crate::types::item::Item;
use crate::types::price::{PriceChange, PricePoint};
use crate::types::report::{PassReport, UpdateOutcome};

/// Drives single-item updates and full batch passes.
#[derive(Clone)]
pub struct UpdateRunner {
    items: Arc<dyn ItemStore>,
    history: Arc<dyn PriceHistory>,
    registry: Arc<ExtractorRegistry>,
    notifier: Arc<dyn Notifier>,
    config: UpdateConfig,
    locks: Arc<KeyedItemLocks>,
}

type KeyedItemLocks = crate::update::keyed_lock::KeyedLocks<Uuid>;

impl UpdateRunner {
    /// Create a runner with the default config.
    pub fn new(
        items: Arc<dyn ItemStore>,
        history: Arc<dyn PriceHistory>,
        registry: Arc<ExtractorRegistry>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_config(items, history, registry, notifier, UpdateConfig::default())
    }

    /// Create a runner with a custom config.
    pub fn with_config(
        items: Arc<dyn ItemStore>,
        history: Arc<dyn PriceHistory>,
        registry: Arc<ExtractorRegistry>,
        notifier: Arc<dyn Notifier>,
        config: UpdateConfig,
    ) -> Self {
        Self {
            items,
            history,
            registry,
            notifier,
            config,
            locks: Arc::new(KeyedItemLocks::new()),
        }
    }

    /// Update a single item and report its outcome.
    ///
    /// Holds the item's keyed lock for the whole run, so overlapping
    /// passes cannot interleave compare-and-write for one item (and a
    /// given page is never scraped twice at once).
    pub async fn update_item(&self, item: &Item) -> UpdateOutcome {
        let _guard = self.locks.lock(&item.id).await;
        self.update_item_locked(item).await
    }

    async fn update_item_locked(&self, item: &Item) -> UpdateOutcome {
        debug!(item_id = %item.id, url = %item.url, "updating item");

        // Resolve
        let url = match resolve_source_url(&item.url) {
            Ok(url) => url,
            Err(_) => {
                return UpdateOutcome::failed(
                    item.id,
                    UpdateError::InvalidItemUrl {
                        url: item.url.clone(),
                    },
                );
            }
        };

        let host = url.host_str().unwrap_or_default();
        let extractor = match self.registry.lookup(host) {
            Some(extractor) => extractor,
            None => {
                return UpdateOutcome::failed(
                    item.id,
                    UpdateError::UnsupportedSite {
                        host: host.to_string(),
                    },
                );
            }
        };

        // Fetch latest known price; no prior point is not an error
        let baseline = match self.history.latest(item.id).await {
            Ok(baseline) => baseline,
            Err(e) => return UpdateOutcome::failed(item.id, UpdateError::History(e)),
        };

        // Scrape current price
        let snapshot = match extractor.scrape_price(&item.descriptor()).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(item_id = %item.id, url = %item.url, error = %e, "price scrape failed");
                return UpdateOutcome::failed(item.id, UpdateError::Scrape(e));
            }
        };

        // Classify
        let change = PriceChange::classify(snapshot.price, baseline.map(|b| b.price));
        debug!(
            item_id = %item.id,
            price = snapshot.price,
            available = snapshot.available,
            change = ?change,
            "price classified"
        );

        // Persist only on change; the classification stands even if
        // the write fails
        if change.is_reportable() {
            let point = PricePoint::new(item.id, &snapshot);
            if let Err(e) = self.history.insert(&point).await {
                warn!(item_id = %item.id, error = %e, "price point insert failed");
                return UpdateOutcome::persist_failed(
                    item.id,
                    change,
                    snapshot.price,
                    UpdateError::Persist(e),
                );
            }
        }

        UpdateOutcome::classified(item.id, change, snapshot.price)
    }

    /// Run one full update pass over every tracked item.
    ///
    /// Returns `Err` only when the initial item-list load fails;
    /// per-item failures are captured in the report.
    pub async fn run_pass(&self) -> Result<PassReport, UpdateError> {
        let started_at = chrono::Utc::now();

        let items = self.items.all().await.map_err(UpdateError::BatchLoad)?;

        info!(
            items = items.len(),
            max_concurrency = self.config.max_concurrency,
            "update pass starting"
        );

        let deadline = self
            .config
            .pass_deadline
            .map(|d| tokio::time::Instant::now() + d);
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));

        let mut tasks: JoinSet<UpdateOutcome> = JoinSet::new();
        for item in items {
            let runner = self.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore is never closed");

                if deadline.is_some_and(|d| tokio::time::Instant::now() >= d) {
                    debug!(item_id = %item.id, "pass deadline expired; skipping item");
                    return UpdateOutcome::failed(item.id, UpdateError::DeadlineExceeded);
                }

                runner.update_item(&item).await
            });
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!(error = %e, "update task panicked"),
            }
        }

        // Forward every price fall to notification dispatch
        for outcome in &outcomes {
            if outcome.price_fell() {
                if let Some(price) = outcome.new_price {
                    if let Err(e) = self.notifier.price_fell(outcome.item_id, price).await {
                        warn!(
                            item_id = %outcome.item_id,
                            error = %e,
                            "price-fall notification failed"
                        );
                    }
                }
            }
        }

        let report = PassReport::from_outcomes(started_at, outcomes);
        info!(
            total = report.total(),
            rose = report.rose,
            fell = report.fell,
            unchanged = report.unchanged,
            errors = report.errors,
            skipped = report.skipped,
            "update pass finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::ExtractorRegistry;
    use crate::stores::MemoryStore;
    use crate::testing::{RecordingNotifier, ScriptedExtractor};

    fn runner_with_registry(registry: ExtractorRegistry, store: Arc<MemoryStore>) -> UpdateRunner {
        UpdateRunner::new(
            store.clone(),
            store,
            Arc::new(registry),
            Arc::new(RecordingNotifier::new()),
        )
    }

    #[tokio::test]
    async fn test_unsupported_host_is_terminal() {
        let store = Arc::new(MemoryStore::new());
        let registry = ExtractorRegistry::builder().build().unwrap();
        let runner = runner_with_registry(registry, store.clone());

        let item = Item::new("Widget", "unknown.example/widget");
        let outcome = runner.update_item(&item).await;

        assert!(matches!(
            outcome.error,
            Some(UpdateError::UnsupportedSite { ref host }) if host == "unknown.example"
        ));
        assert!(outcome.change.is_none());
        // No store interaction happened
        assert_eq!(store.price_point_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_item_url_is_terminal() {
        let store = Arc::new(MemoryStore::new());
        let registry = ExtractorRegistry::builder()
            .register(ScriptedExtractor::new("shop-a.example"))
            .build()
            .unwrap();
        let runner = runner_with_registry(registry, store);

        let item = Item::new("Broken", "");
        let outcome = runner.update_item(&item).await;

        assert!(matches!(
            outcome.error,
            Some(UpdateError::InvalidItemUrl { .. })
        ));
    }
}
