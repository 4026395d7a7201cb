//! Per-item outcomes and the aggregate pass report.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::UpdateError;
use crate::types::price::PriceChange;

/// Transient, per-item outcome of one update run.
///
/// Never persisted; exists only for the duration of one pass to drive
/// aggregation and notification triggering. A persist failure carries
/// both the classification (the scrape did happen) and the error (the
/// record was lost).
#[derive(Debug)]
pub struct UpdateOutcome {
    /// Item this outcome belongs to
    pub item_id: Uuid,

    /// Classification, when the scrape succeeded
    pub change: Option<PriceChange>,

    /// The scraped price, when the scrape succeeded
    pub new_price: Option<i64>,

    /// Terminal error, if the run failed for this item
    pub error: Option<UpdateError>,
}

impl UpdateOutcome {
    /// A successful run with the given classification.
    pub fn classified(item_id: Uuid, change: PriceChange, new_price: i64) -> Self {
        Self {
            item_id,
            change: Some(change),
            new_price: Some(new_price),
            error: None,
        }
    }

    /// A run that terminated with an error before classification.
    pub fn failed(item_id: Uuid, error: UpdateError) -> Self {
        Self {
            item_id,
            change: None,
            new_price: None,
            error: Some(error),
        }
    }

    /// A run that classified a change but failed to persist it.
    pub fn persist_failed(
        item_id: Uuid,
        change: PriceChange,
        new_price: i64,
        error: UpdateError,
    ) -> Self {
        Self {
            item_id,
            change: Some(change),
            new_price: Some(new_price),
            error: Some(error),
        }
    }

    /// True when the price fell, regardless of persist errors.
    pub fn price_fell(&self) -> bool {
        self.change == Some(PriceChange::Fell)
    }
}

/// Aggregate report of one full update pass.
///
/// Counts are disjoint: an outcome lands in exactly one of
/// rose/fell/unchanged (error-free), `errors`, or `skipped` (deadline
/// expiry). The full per-item detail stays in `outcomes`.
#[derive(Debug)]
pub struct PassReport {
    /// When the pass started
    pub started_at: DateTime<Utc>,

    /// When the last task finished
    pub finished_at: DateTime<Utc>,

    /// Error-free outcomes classified Rose
    pub rose: usize,

    /// Error-free outcomes classified Fell
    pub fell: usize,

    /// Error-free outcomes classified Unchanged
    pub unchanged: usize,

    /// Outcomes that terminated with an error
    pub errors: usize,

    /// Items never scraped because the pass deadline expired
    pub skipped: usize,

    /// Every per-item outcome, in completion order (not input order)
    pub outcomes: Vec<UpdateOutcome>,
}

impl PassReport {
    /// Tally a completed pass from its outcomes.
    pub fn from_outcomes(started_at: DateTime<Utc>, outcomes: Vec<UpdateOutcome>) -> Self {
        let mut report = Self {
            started_at,
            finished_at: Utc::now(),
            rose: 0,
            fell: 0,
            unchanged: 0,
            errors: 0,
            skipped: 0,
            outcomes: Vec::new(),
        };

        for outcome in &outcomes {
            match (&outcome.error, outcome.change) {
                (Some(err), _) if err.is_deadline() => report.skipped += 1,
                (Some(_), _) => report.errors += 1,
                (None, Some(PriceChange::Rose)) => report.rose += 1,
                (None, Some(PriceChange::Fell)) => report.fell += 1,
                (None, Some(PriceChange::Unchanged)) => report.unchanged += 1,
                // A run without error always classifies
                (None, None) => report.errors += 1,
            }
        }

        report.outcomes = outcomes;
        report
    }

    /// Total number of items covered by the pass.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Item ids that failed, with their errors (deadline skips excluded).
    pub fn failed_items(&self) -> impl Iterator<Item = (Uuid, &UpdateError)> {
        self.outcomes.iter().filter_map(|o| match &o.error {
            Some(err) if !err.is_deadline() => Some((o.item_id, err)),
            _ => None,
        })
    }
}
