//! Notification dispatch trigger contract.

use async_trait::async_trait;
use uuid::Uuid;

/// Consumes price-fall events at the end of an update pass.
///
/// Delivery semantics (email, webhook, subscriber lookup) are entirely
/// the implementation's concern. A failed notification is logged by the
/// orchestrator but never affects the pass outcome.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Called once per item whose price fell during a pass.
    async fn price_fell(
        &self,
        item_id: Uuid,
        new_price: i64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
