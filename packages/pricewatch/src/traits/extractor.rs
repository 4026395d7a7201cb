//! The site extractor contract.

use async_trait::async_trait;
use url::Url;

use crate::error::ScrapeResult;
use crate::types::item::ItemDescriptor;
use crate::types::price::PriceSnapshot;

/// A site-specific strategy for turning a product page into structured
/// item and price data.
///
/// One implementation exists per supported shopping site. The
/// orchestrator only ever sees this trait; concrete site logic stays in
/// `crate::extractors`. Both scrape operations perform exactly one
/// outbound fetch of the target page; `scrape_price` re-fetches rather
/// than reusing anything `scrape_info` saw. Neither retries; transient
/// failures propagate to the caller.
#[async_trait]
pub trait SiteExtractor: Send + Sync {
    /// The exact hostname this extractor handles, e.g. `"tiki.vn"`.
    /// Used as the registry key; constant per implementation.
    fn host(&self) -> &str;

    /// Fetch the product page at `url` (whose host matches [`host`])
    /// and extract a normalized descriptor.
    ///
    /// Optional fields (description, image) are left empty when absent;
    /// a missing name fails with [`crate::error::ScrapeError::MissingField`].
    ///
    /// [`host`]: SiteExtractor::host
    async fn scrape_info(&self, url: &Url) -> ScrapeResult<ItemDescriptor>;

    /// Re-resolve the descriptor's source URL, fetch the page, and
    /// extract the current price and availability.
    ///
    /// A missing price, or one that parses to zero, fails with
    /// [`crate::error::ScrapeError::PriceNotFound`]; zero is never a
    /// valid price.
    async fn scrape_price(&self, item: &ItemDescriptor) -> ScrapeResult<PriceSnapshot>;
}
