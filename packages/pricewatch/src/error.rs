//! Typed errors for the pricewatch library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Each layer gets its own
//! enum; higher layers wrap lower ones with `#[from]` where the
//! conversion is unambiguous.

use thiserror::Error;

/// Errors that can occur while fetching a remote document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connection reset, TLS, ...)
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The site answered with a non-success status
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The per-request timeout expired
    #[error("timeout fetching {url}")]
    Timeout { url: String },

    /// The URL could not be parsed into something fetchable
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Errors that can occur while extracting item data from a page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The remote document could not be retrieved
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// A field required for a valid descriptor is absent
    #[error("missing required field `{field}` on {url}")]
    MissingField { field: &'static str, url: String },

    /// No price field was present, or the price parsed to zero
    #[error("no usable price found on {url}")]
    PriceNotFound { url: String },

    /// Structured data was present but could not be interpreted
    #[error("malformed structured data on {url}: {reason}")]
    Malformed { url: String, reason: String },
}

/// Errors raised while constructing the extractor registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two extractors claimed the same hostname
    #[error("duplicate extractor registration for host {host}")]
    DuplicateHost { host: String },
}

/// Errors from the item and price-history stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store rejected the operation
    #[error("storage error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wrap an arbitrary backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// Terminal, per-item errors of one update run.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The item's URL host has no registered extractor
    #[error("no extractor registered for host {host}")]
    UnsupportedSite { host: String },

    /// The item's stored URL could not be parsed
    #[error("item URL could not be parsed: {url}")]
    InvalidItemUrl { url: String },

    /// Scraping the current price failed
    #[error("scrape failed: {0}")]
    Scrape(#[from] ScrapeError),

    /// The latest stored price could not be read
    #[error("could not read latest price: {0}")]
    History(StoreError),

    /// The new price point could not be written
    #[error("could not persist new price point: {0}")]
    Persist(StoreError),

    /// The initial item list could not be loaded; aborts the whole pass
    #[error("item list could not be loaded: {0}")]
    BatchLoad(StoreError),

    /// The pass deadline expired before this item was scraped
    #[error("pass deadline expired before this item was scraped")]
    DeadlineExceeded,
}

impl UpdateError {
    /// True for the deadline marker, which is counted as skipped
    /// rather than failed in the pass report.
    pub fn is_deadline(&self) -> bool {
        matches!(self, UpdateError::DeadlineExceeded)
    }
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for scrape operations.
pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
