//! Notification dispatch implementations.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::traits::notifier::Notifier;

/// A notifier that logs each price fall.
///
/// Stands in for a real delivery channel (email, webhook); useful as a
/// default until one is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn price_fell(
        &self,
        item_id: Uuid,
        new_price: i64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(item_id = %item_id, new_price, "price fell; notifying subscribers");
        Ok(())
    }
}
