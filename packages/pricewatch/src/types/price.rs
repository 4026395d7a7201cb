//! Price observations and change classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// One timestamped price + availability observation for an item.
///
/// Price points are append-only: once written they are never mutated or
/// deleted. "Latest" means the point with the greatest timestamp for a
/// given item id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Owning item
    pub item_id: Uuid,

    /// When the price was observed
    pub time: DateTime<Utc>,

    /// Price in the smallest currency unit, non-negative
    pub price: i64,

    /// Whether the item was in stock at observation time
    pub available: bool,
}

impl PricePoint {
    /// Create a point for `item_id` from a scraped snapshot, stamped now.
    pub fn new(item_id: Uuid, snapshot: &PriceSnapshot) -> Self {
        Self {
            item_id,
            time: Utc::now(),
            price: snapshot.price,
            available: snapshot.available,
        }
    }

    /// Override the observation time.
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }
}

/// The current price and availability scraped from a product page,
/// before it is tied to an item and timestamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// Price in the smallest currency unit
    pub price: i64,

    /// Whether the site's structured data marked the item in stock
    pub available: bool,
}

impl PriceSnapshot {
    pub fn new(price: i64, available: bool) -> Self {
        Self { price, available }
    }
}

/// Outcome of comparing a scraped price against the latest stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceChange {
    /// Scraped price equals the baseline; nothing is written
    Unchanged,
    /// Scraped price is below the baseline
    Fell,
    /// Scraped price is above the baseline, or no baseline existed
    Rose,
}

impl PriceChange {
    /// Classify a scraped price against the latest stored price.
    ///
    /// With no baseline the first observation classifies `Rose`, which
    /// downstream treats as "first price discovered" and persists.
    /// Comparison is exact integer ordering; a 1-unit move is reportable.
    pub fn classify(scraped: i64, baseline: Option<i64>) -> Self {
        match baseline {
            None => PriceChange::Rose,
            Some(old) => match scraped.cmp(&old) {
                Ordering::Equal => PriceChange::Unchanged,
                Ordering::Greater => PriceChange::Rose,
                Ordering::Less => PriceChange::Fell,
            },
        }
    }

    /// True when the change warrants writing a new price point.
    pub fn is_reportable(self) -> bool {
        !matches!(self, PriceChange::Unchanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_without_baseline() {
        assert_eq!(PriceChange::classify(100_000, None), PriceChange::Rose);
        assert!(PriceChange::classify(100_000, None).is_reportable());
    }

    #[test]
    fn test_classify_against_baseline() {
        assert_eq!(
            PriceChange::classify(100_000, Some(100_000)),
            PriceChange::Unchanged
        );
        assert_eq!(
            PriceChange::classify(100_001, Some(100_000)),
            PriceChange::Rose
        );
        assert_eq!(
            PriceChange::classify(99_999, Some(100_000)),
            PriceChange::Fell
        );
    }

    #[test]
    fn test_unchanged_is_not_reportable() {
        assert!(!PriceChange::Unchanged.is_reportable());
        assert!(PriceChange::Fell.is_reportable());
        assert!(PriceChange::Rose.is_reportable());
    }
}
