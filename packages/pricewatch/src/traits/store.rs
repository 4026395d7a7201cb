//! Storage contracts for items and price history.
//!
//! The orchestrator consumes deliberately narrow surfaces: a snapshot
//! read of the item list and a get-latest / append pair on the price
//! history. Implementations must support concurrent reads and writes
//! for distinct item ids.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::types::item::Item;
use crate::types::price::PricePoint;

/// Read access to tracked items.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Snapshot of every tracked item. Items added after the call
    /// started are not required to appear.
    async fn all(&self) -> StoreResult<Vec<Item>>;

    /// Fetch a single item by id.
    async fn get(&self, id: Uuid) -> StoreResult<Option<Item>>;

    /// Register a new item. Used by registration flows and tests; the
    /// update orchestrator never calls this.
    async fn insert(&self, item: &Item) -> StoreResult<()>;
}

/// Append-only time-series of price observations per item.
#[async_trait]
pub trait PriceHistory: Send + Sync {
    /// The most recent price point for an item, by observation time.
    /// `None` when the item has never been observed; not an error.
    async fn latest(&self, item_id: Uuid) -> StoreResult<Option<PricePoint>>;

    /// Append a new observation. Existing points are never mutated or
    /// deleted.
    async fn insert(&self, point: &PricePoint) -> StoreResult<()>;

    /// Every observation for an item, oldest first.
    async fn all_for_item(&self, item_id: Uuid) -> StoreResult<Vec<PricePoint>>;

    /// Number of observations recorded for an item.
    async fn count(&self, item_id: Uuid) -> StoreResult<usize> {
        Ok(self.all_for_item(item_id).await?.len())
    }
}
