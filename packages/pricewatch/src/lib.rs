//! Price tracking and scrape orchestration for e-commerce items.
//!
//! Users register products by URL; this crate periodically re-scrapes
//! each one, records a time-series of observed prices, and triggers
//! notifications when a price falls. Site-specific scraping lives
//! behind a single extractor contract, so supporting a new shop never
//! touches the orchestrator.
//!
//! # Architecture
//!
//! ```text
//! UpdateScheduler (timer)
//!     └─► UpdateRunner.run_pass()
//!             ├─► ItemStore.all()                 (snapshot)
//!             ├─► N bounded-concurrency tasks, one per item:
//!             │       resolve host → ExtractorRegistry
//!             │       PriceHistory.latest()
//!             │       SiteExtractor.scrape_price()  ──► DocumentFetcher
//!             │       classify (Rose / Fell / Unchanged)
//!             │       PriceHistory.insert()       (only on change)
//!             ├─► Notifier.price_fell()           (for every fall)
//!             └─► PassReport
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pricewatch::{
//!     default_registry, HttpFetcher, LogNotifier, MemoryStore, UpdateRunner,
//! };
//!
//! let fetcher = Arc::new(HttpFetcher::new());
//! let registry = Arc::new(default_registry(fetcher));
//! let store = Arc::new(MemoryStore::new());
//!
//! let runner = UpdateRunner::new(
//!     store.clone(),
//!     store,
//!     registry,
//!     Arc::new(LogNotifier::new()),
//! );
//!
//! let report = runner.run_pass().await?;
//! println!("rose={} fell={} errors={}", report.rose, report.fell, report.errors);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core contracts (SiteExtractor, stores, Notifier)
//! - [`types`] - Items, price points, reports, configuration
//! - [`extractors`] - Per-site extractors and the hostname registry
//! - [`fetch`] - The shared HTTP document fetcher
//! - [`stores`] - Storage implementations (memory, SQLite, Postgres)
//! - [`update`] - Orchestrator, keyed locks, scheduler
//! - [`testing`] - Mock implementations for tests

pub mod error;
pub mod extractors;
pub mod fetch;
pub mod notify;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;
pub mod update;

// Re-export core types at crate root
pub use error::{FetchError, RegistryError, ScrapeError, StoreError, UpdateError};
pub use traits::{
    extractor::SiteExtractor,
    notifier::Notifier,
    store::{ItemStore, PriceHistory},
};
pub use types::{
    config::{FetchConfig, UpdateConfig, DEFAULT_USER_AGENT},
    item::{Item, ItemDescriptor},
    price::{PriceChange, PricePoint, PriceSnapshot},
    report::{PassReport, UpdateOutcome},
};

// Re-export extractors and registry
pub use extractors::{
    default_registry, ExtractorRegistry, LazadaExtractor, RegistryBuilder, TikiExtractor,
    IN_STOCK_HTTP, IN_STOCK_HTTPS,
};

// Re-export fetch layer
pub use fetch::{resolve_source_url, DocumentFetcher, HttpFetcher, RateLimitedFetcher};

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "sqlite")]
pub use stores::SqliteStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;

// Re-export orchestration
pub use notify::LogNotifier;
pub use update::{KeyedLocks, SchedulerConfig, UpdateRunner, UpdateScheduler};
