//! Timer-driven update passes.
//!
//! A long-running service that invokes [`UpdateRunner::run_pass`] on a
//! fixed cadence until cancelled. The first pass runs immediately on
//! start; subsequent passes follow the configured interval.

use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::update::runner::UpdateRunner;

/// Configuration for the update scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between passes. Default: 30 minutes.
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30 * 60),
        }
    }
}

impl SchedulerConfig {
    /// Create a config with a custom interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }
}

/// Background service that runs update passes on a timer.
///
/// # Example
///
/// ```rust,ignore
/// let scheduler = UpdateScheduler::new(runner);
/// let cancel = scheduler.cancellation_token();
///
/// tokio::spawn(scheduler.run());
/// // ... later
/// cancel.cancel();
/// ```
pub struct UpdateScheduler {
    runner: UpdateRunner,
    config: SchedulerConfig,
    cancel: CancellationToken,
}

impl UpdateScheduler {
    /// Create a scheduler with the default 30-minute cadence.
    pub fn new(runner: UpdateRunner) -> Self {
        Self::with_config(runner, SchedulerConfig::default())
    }

    /// Create a scheduler with a custom config.
    pub fn with_config(runner: UpdateRunner, config: SchedulerConfig) -> Self {
        Self {
            runner,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops the scheduler when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run passes until the cancellation token fires.
    pub async fn run(self) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            "update scheduler starting"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("update scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    match self.runner.run_pass().await {
                        Ok(report) => info!(
                            total = report.total(),
                            rose = report.rose,
                            fell = report.fell,
                            unchanged = report.unchanged,
                            errors = report.errors,
                            skipped = report.skipped,
                            "scheduled update pass finished"
                        ),
                        Err(e) => error!(error = %e, "scheduled update pass aborted"),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::ExtractorRegistry;
    use crate::stores::MemoryStore;
    use crate::testing::{RecordingNotifier, ScriptedExtractor};
    use crate::traits::store::ItemStore;
    use crate::types::item::Item;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_pass_runs_immediately_and_cancel_stops() {
        let store = Arc::new(MemoryStore::new());
        let item = Item::new("Widget", "shop-a.example/widget");
        store.insert(&item).await.unwrap();

        let registry = ExtractorRegistry::builder()
            .register(ScriptedExtractor::new("shop-a.example").with_price(100_000, true))
            .build()
            .unwrap();

        let runner = UpdateRunner::new(
            store.clone(),
            store.clone(),
            Arc::new(registry),
            Arc::new(RecordingNotifier::new()),
        );

        let scheduler =
            UpdateScheduler::with_config(runner, SchedulerConfig::with_interval(Duration::from_secs(3600)));
        let cancel = scheduler.cancellation_token();

        let handle = tokio::spawn(scheduler.run());

        // The immediate first tick should have written the first point
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.price_point_count(), 1);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("scheduler must stop on cancel")
            .unwrap();
    }
}
