//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::traits::store::{ItemStore, PriceHistory};
use crate::types::item::Item;
use crate::types::price::PricePoint;

/// In-memory item store and price history.
///
/// Useful for tests and development. Not suitable for production as
/// data is lost on restart.
pub struct MemoryStore {
    items: RwLock<HashMap<Uuid, Item>>,
    prices: RwLock<HashMap<Uuid, Vec<PricePoint>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            prices: RwLock::new(HashMap::new()),
        }
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.items.write().unwrap().clear();
        self.prices.write().unwrap().clear();
    }

    /// Number of tracked items.
    pub fn item_count(&self) -> usize {
        self.items.read().unwrap().len()
    }

    /// Number of recorded price points across all items.
    pub fn price_point_count(&self) -> usize {
        self.prices.read().unwrap().values().map(Vec::len).sum()
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn all(&self) -> StoreResult<Vec<Item>> {
        Ok(self.items.read().unwrap().values().cloned().collect())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Item>> {
        Ok(self.items.read().unwrap().get(&id).cloned())
    }

    async fn insert(&self, item: &Item) -> StoreResult<()> {
        self.items.write().unwrap().insert(item.id, item.clone());
        Ok(())
    }
}

#[async_trait]
impl PriceHistory for MemoryStore {
    async fn latest(&self, item_id: Uuid) -> StoreResult<Option<PricePoint>> {
        Ok(self
            .prices
            .read()
            .unwrap()
            .get(&item_id)
            .and_then(|points| points.iter().max_by_key(|p| p.time))
            .cloned())
    }

    async fn insert(&self, point: &PricePoint) -> StoreResult<()> {
        self.prices
            .write()
            .unwrap()
            .entry(point.item_id)
            .or_default()
            .push(point.clone());
        Ok(())
    }

    async fn all_for_item(&self, item_id: Uuid) -> StoreResult<Vec<PricePoint>> {
        let mut points = self
            .prices
            .read()
            .unwrap()
            .get(&item_id)
            .cloned()
            .unwrap_or_default();
        points.sort_by_key(|p| p.time);
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::price::PriceSnapshot;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_latest_picks_max_timestamp() {
        let store = MemoryStore::new();
        let item_id = Uuid::new_v4();

        let older = PricePoint::new(item_id, &PriceSnapshot::new(100_000, true))
            .with_time(Utc::now() - Duration::hours(2));
        let newer = PricePoint::new(item_id, &PriceSnapshot::new(90_000, true));

        // Insertion order should not matter
        PriceHistory::insert(&store, &newer).await.unwrap();
        PriceHistory::insert(&store, &older).await.unwrap();

        let latest = store.latest(item_id).await.unwrap().unwrap();
        assert_eq!(latest.price, 90_000);
        assert_eq!(store.count(item_id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_latest_is_none_without_history() {
        let store = MemoryStore::new();
        assert!(store.latest(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_items_round_trip() {
        let store = MemoryStore::new();
        let item = Item::new("Blender", "tiki.vn/blender");

        ItemStore::insert(&store, &item).await.unwrap();
        assert_eq!(store.item_count(), 1);

        let fetched = store.get(item.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Blender");
        assert_eq!(store.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_all_for_item_sorted_oldest_first() {
        let store = MemoryStore::new();
        let item_id = Uuid::new_v4();

        let first = PricePoint::new(item_id, &PriceSnapshot::new(1, true))
            .with_time(Utc::now() - Duration::minutes(10));
        let second = PricePoint::new(item_id, &PriceSnapshot::new(2, true));

        PriceHistory::insert(&store, &second).await.unwrap();
        PriceHistory::insert(&store, &first).await.unwrap();

        let points = store.all_for_item(item_id).await.unwrap();
        assert_eq!(points[0].price, 1);
        assert_eq!(points[1].price, 2);
    }
}
