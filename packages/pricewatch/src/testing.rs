//! Testing utilities including mock implementations.
//!
//! Useful for exercising the orchestrator without network calls or a
//! real database: a canned-page fetcher, a scriptable extractor, and a
//! call-recording notifier.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::error::{FetchError, FetchResult, ScrapeError, ScrapeResult};
use crate::fetch::DocumentFetcher;
use crate::traits::extractor::SiteExtractor;
use crate::traits::notifier::Notifier;
use crate::types::item::ItemDescriptor;
use crate::types::price::PriceSnapshot;

/// A document fetcher serving canned HTML bodies by URL.
#[derive(Default)]
pub struct StaticFetcher {
    pages: StdMutex<HashMap<String, String>>,
    failures: StdMutex<HashSet<String>>,
    calls: StdMutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url` (scheme-less URLs are normalized).
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(normalize_key(&url.into()), html.into());
        self
    }

    /// Fail every fetch of `url` with an HTTP 503.
    pub fn with_failure(self, url: impl Into<String>) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(normalize_key(&url.into()));
        self
    }

    /// Every URL fetched, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

fn normalize_key(raw: &str) -> String {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    Url::parse(&candidate)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[async_trait]
impl DocumentFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> FetchResult<String> {
        let key = url.to_string();
        self.calls.lock().unwrap().push(key.clone());

        if self.failures.lock().unwrap().contains(&key) {
            return Err(FetchError::Status {
                url: key,
                status: 503,
            });
        }

        self.pages
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or(FetchError::Status {
                url: key,
                status: 404,
            })
    }
}

/// A site extractor with pre-programmed responses.
///
/// Each `scrape_price` call consumes the next scripted result; an
/// exhausted script fails with `PriceNotFound`. Tracks call counts and
/// the maximum number of concurrent `scrape_price` calls, which lets
/// tests assert on serialization and pool bounds.
pub struct ScriptedExtractor {
    host: String,
    info: StdMutex<Option<ItemDescriptor>>,
    prices: StdMutex<VecDeque<ScrapeResult<PriceSnapshot>>>,
    delay: Option<Duration>,
    price_calls: AtomicUsize,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl ScriptedExtractor {
    /// Create an extractor claiming `host`.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            info: StdMutex::new(None),
            prices: StdMutex::new(VecDeque::new()),
            delay: None,
            price_calls: AtomicUsize::new(0),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Script the next `scrape_price` call to succeed.
    pub fn with_price(self, price: i64, available: bool) -> Self {
        self.prices
            .lock()
            .unwrap()
            .push_back(Ok(PriceSnapshot { price, available }));
        self
    }

    /// Script the next `scrape_price` call to fail.
    pub fn with_error(self, error: ScrapeError) -> Self {
        self.prices.lock().unwrap().push_back(Err(error));
        self
    }

    /// Set the descriptor returned by `scrape_info`.
    pub fn with_info(self, info: ItemDescriptor) -> Self {
        *self.info.lock().unwrap() = Some(info);
        self
    }

    /// Delay every `scrape_price` call (for concurrency tests).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `scrape_price` calls made.
    pub fn price_calls(&self) -> usize {
        self.price_calls.load(Ordering::SeqCst)
    }

    /// Highest number of `scrape_price` calls observed in flight.
    pub fn max_concurrent(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SiteExtractor for ScriptedExtractor {
    fn host(&self) -> &str {
        &self.host
    }

    async fn scrape_info(&self, url: &Url) -> ScrapeResult<ItemDescriptor> {
        self.info
            .lock()
            .unwrap()
            .clone()
            .ok_or(ScrapeError::MissingField {
                field: "og:title",
                url: url.to_string(),
            })
    }

    async fn scrape_price(&self, item: &ItemDescriptor) -> ScrapeResult<PriceSnapshot> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let next = self.prices.lock().unwrap().pop_front();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        next.unwrap_or_else(|| {
            Err(ScrapeError::PriceNotFound {
                url: item.url.clone(),
            })
        })
    }
}

/// A notifier that records every price-fall trigger.
#[derive(Default)]
pub struct RecordingNotifier {
    notifications: StdMutex<Vec<(Uuid, i64)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(item_id, new_price)` received, in call order.
    pub fn notifications(&self) -> Vec<(Uuid, i64)> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn price_fell(
        &self,
        item_id: Uuid,
        new_price: i64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.notifications.lock().unwrap().push((item_id, new_price));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_fetcher_serves_and_records() {
        let fetcher = StaticFetcher::new()
            .with_page("tiki.vn/p/1", "<html>1</html>")
            .with_failure("https://tiki.vn/p/down");

        let ok = fetcher
            .fetch(&Url::parse("https://tiki.vn/p/1").unwrap())
            .await;
        assert_eq!(ok.unwrap(), "<html>1</html>");

        let down = fetcher
            .fetch(&Url::parse("https://tiki.vn/p/down").unwrap())
            .await;
        assert!(matches!(
            down,
            Err(FetchError::Status { status: 503, .. })
        ));

        let missing = fetcher
            .fetch(&Url::parse("https://tiki.vn/p/other").unwrap())
            .await;
        assert!(matches!(
            missing,
            Err(FetchError::Status { status: 404, .. })
        ));

        assert_eq!(fetcher.call_count(), 3);
    }

    #[tokio::test]
    async fn test_scripted_extractor_consumes_in_order() {
        let extractor = ScriptedExtractor::new("shop-a.example")
            .with_price(100_000, true)
            .with_error(ScrapeError::PriceNotFound {
                url: "shop-a.example/p".to_string(),
            });

        let item = ItemDescriptor {
            name: "Widget".to_string(),
            description: String::new(),
            image_url: String::new(),
            url: "shop-a.example/p".to_string(),
            currency: "VND".to_string(),
        };

        let first = extractor.scrape_price(&item).await.unwrap();
        assert_eq!(first.price, 100_000);

        assert!(extractor.scrape_price(&item).await.is_err());
        // Script exhausted
        assert!(extractor.scrape_price(&item).await.is_err());
        assert_eq!(extractor.price_calls(), 3);
    }
}
