//! SQLite storage implementation.
//!
//! A file-based backend. Good for local development and single-server
//! deployments. Ids are stored as hyphenated TEXT and timestamps as
//! RFC 3339 TEXT (which sorts chronologically).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{ItemStore, PriceHistory};
use crate::types::item::Item;
use crate::types::price::PricePoint;

/// SQLite-backed item store and price history.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new store with the given connection URL.
    ///
    /// # Example URLs
    /// - `sqlite::memory:` - In-memory database (ephemeral)
    /// - `sqlite://./pricewatch.db?mode=rwc` - Create if not exists
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(StoreError::backend)?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub async fn in_memory() -> StoreResult<Self> {
        Self::new("sqlite::memory:").await
    }

    /// Run database migrations.
    async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                image_url TEXT NOT NULL DEFAULT '',
                url TEXT NOT NULL,
                currency TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS item_prices (
                item_id TEXT NOT NULL,
                time TEXT NOT NULL,
                price INTEGER NOT NULL,
                available INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_item_prices_item_time
                ON item_prices(item_id, time);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }
}

#[derive(FromRow)]
struct ItemRow {
    id: String,
    name: String,
    description: String,
    image_url: String,
    url: String,
    currency: String,
}

impl ItemRow {
    fn into_item(self) -> StoreResult<Item> {
        Ok(Item {
            id: Uuid::parse_str(&self.id).map_err(StoreError::backend)?,
            name: self.name,
            description: self.description,
            image_url: self.image_url,
            url: self.url,
            currency: self.currency,
        })
    }
}

#[derive(FromRow)]
struct PriceRow {
    item_id: String,
    time: String,
    price: i64,
    available: bool,
}

impl PriceRow {
    fn into_point(self) -> StoreResult<PricePoint> {
        Ok(PricePoint {
            item_id: Uuid::parse_str(&self.item_id).map_err(StoreError::backend)?,
            time: DateTime::parse_from_rfc3339(&self.time)
                .map_err(StoreError::backend)?
                .with_timezone(&Utc),
            price: self.price,
            available: self.available,
        })
    }
}

#[async_trait]
impl ItemStore for SqliteStore {
    async fn all(&self) -> StoreResult<Vec<Item>> {
        let rows: Vec<ItemRow> = sqlx::query_as("SELECT * FROM items")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        rows.into_iter().map(ItemRow::into_item).collect()
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Item>> {
        let row: Option<ItemRow> = sqlx::query_as("SELECT * FROM items WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        row.map(ItemRow::into_item).transpose()
    }

    async fn insert(&self, item: &Item) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO items (id, name, description, image_url, url, currency)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(item.id.to_string())
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.image_url)
        .bind(&item.url)
        .bind(&item.currency)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }
}

#[async_trait]
impl PriceHistory for SqliteStore {
    async fn latest(&self, item_id: Uuid) -> StoreResult<Option<PricePoint>> {
        let row: Option<PriceRow> = sqlx::query_as(
            "SELECT * FROM item_prices WHERE item_id = ?1 ORDER BY time DESC LIMIT 1",
        )
        .bind(item_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        row.map(PriceRow::into_point).transpose()
    }

    async fn insert(&self, point: &PricePoint) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO item_prices (item_id, time, price, available)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(point.item_id.to_string())
        .bind(point.time.to_rfc3339())
        .bind(point.price)
        .bind(point.available)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }

    async fn all_for_item(&self, item_id: Uuid) -> StoreResult<Vec<PricePoint>> {
        let rows: Vec<PriceRow> =
            sqlx::query_as("SELECT * FROM item_prices WHERE item_id = ?1 ORDER BY time ASC")
                .bind(item_id.to_string())
                .fetch_all(&self.pool)
                .await
                .map_err(StoreError::backend)?;

        rows.into_iter().map(PriceRow::into_point).collect()
    }
}
