//! PostgreSQL storage implementation.
//!
//! The production backend: native UUID and TIMESTAMPTZ columns, an
//! append-only `item_prices` table indexed for latest-point lookups.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{ItemStore, PriceHistory};
use crate::types::item::Item;
use crate::types::price::PricePoint;

/// Postgres-backed item store and price history.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect and run migrations.
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(StoreError::backend)?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Build a store around an existing pool.
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    pub async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                image_url TEXT NOT NULL DEFAULT '',
                url TEXT NOT NULL,
                currency TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS item_prices (
                item_id UUID NOT NULL REFERENCES items(id) ON DELETE CASCADE,
                time TIMESTAMPTZ NOT NULL,
                price BIGINT NOT NULL,
                available BOOLEAN NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_item_prices_item_time ON item_prices(item_id, time)",
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }
}

#[derive(FromRow)]
struct ItemRow {
    id: Uuid,
    name: String,
    description: String,
    image_url: String,
    url: String,
    currency: String,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            url: row.url,
            currency: row.currency,
        }
    }
}

#[derive(FromRow)]
struct PriceRow {
    item_id: Uuid,
    time: DateTime<Utc>,
    price: i64,
    available: bool,
}

impl From<PriceRow> for PricePoint {
    fn from(row: PriceRow) -> Self {
        PricePoint {
            item_id: row.item_id,
            time: row.time,
            price: row.price,
            available: row.available,
        }
    }
}

#[async_trait]
impl ItemStore for PostgresStore {
    async fn all(&self) -> StoreResult<Vec<Item>> {
        let rows: Vec<ItemRow> = sqlx::query_as("SELECT * FROM items")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Item>> {
        let row: Option<ItemRow> = sqlx::query_as("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(row.map(Item::from))
    }

    async fn insert(&self, item: &Item) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO items (id, name, description, image_url, url, currency)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.id)
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
impl PriceHistory for PostgresStore {
    async fn latest(&self, item_id: Uuid) -> StoreResult<Option<PricePoint>> {
        let row: Option<PriceRow> = sqlx::query_as(
            "SELECT * FROM item_prices WHERE item_id = $1 ORDER BY time DESC LIMIT 1",
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.map(PricePoint::from))
    }

    async fn insert(&self, point: &PricePoint) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO item_prices (item_id, time, price, available)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(point.item_id)
        .bind(point.time)
        .bind(point.price)
        .bind(point.available)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }

    async fn all_for_item(&self, item_id: Uuid) -> StoreResult<Vec<PricePoint>> {
        let rows: Vec<PriceRow> =
            sqlx::query_as("SELECT * FROM item_prices WHERE item_id = $1 ORDER BY time ASC")
                .bind(item_id)
                .fetch_all(&self.pool)
                .await
                .map_err(StoreError::backend)?;

        Ok(rows.into_iter().map(PricePoint::from).collect())
    }
}
