//! Document fetching: the shared HTTP layer under every site extractor.
//!
//! The fetcher returns the raw HTML body; extractors parse it
//! synchronously. (`scraper::Html` is not `Send`, so parsed documents
//! never cross an await point: parse helpers take `&str` and return
//! owned values.)

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::types::config::FetchConfig;

/// Fetches a product page over the network.
///
/// Shared by all extractors. Implementations must set an identifying
/// client header and bound every request with a timeout.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the HTML body at `url`.
    async fn fetch(&self, url: &Url) -> FetchResult<String>;
}

/// Resolve a stored canonical URL into something fetchable.
///
/// Canonical URLs are scheme-less host + path; user-supplied ones may
/// still carry a scheme. Scheme-less input gets `https://` prepended.
pub fn resolve_source_url(stored: &str) -> FetchResult<Url> {
    let candidate = if stored.contains("://") {
        stored.to_string()
    } else {
        format!("https://{stored}")
    };

    Url::parse(&candidate)
        .ok()
        .filter(|url| url.host_str().is_some_and(|h| !h.is_empty()))
        .ok_or_else(|| FetchError::InvalidUrl {
            url: stored.to_string(),
        })
}

/// HTTP document fetcher backed by `reqwest`.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a fetcher with default settings.
    pub fn new() -> Self {
        Self::with_config(FetchConfig::default())
    }

    /// Create a fetcher from a config.
    pub fn with_config(config: FetchConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(config.timeout)
                .build()
                .expect("Failed to create HTTP client"),
            user_agent: config.user_agent,
        }
    }

    /// Replace the HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> FetchResult<String> {
        debug!(url = %url, "fetching document");

        let response = self
            .client
            .get(url.clone())
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "document fetch failed");
                if e.is_timeout() {
                    FetchError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    FetchError::Transport {
                        url: url.to_string(),
                        source: e,
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            source: e,
        })
    }
}

type HostRateLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// A fetcher wrapper that rate-limits requests per host.
///
/// Concurrent item updates against the same site share one quota, so a
/// large pass cannot hammer a single shop.
pub struct RateLimitedFetcher<F: DocumentFetcher> {
    inner: F,
    limiter: Arc<HostRateLimiter>,
}

impl<F: DocumentFetcher> RateLimitedFetcher<F> {
    /// Wrap `fetcher`, allowing at most `requests_per_second` requests
    /// to any single host.
    pub fn new(fetcher: F, requests_per_second: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_second).expect("requests_per_second must be > 0"),
        );
        Self {
            inner: fetcher,
            limiter: Arc::new(RateLimiter::keyed(quota)),
        }
    }

    /// Wrap with a custom quota.
    pub fn with_quota(fetcher: F, quota: Quota) -> Self {
        Self {
            inner: fetcher,
            limiter: Arc::new(RateLimiter::keyed(quota)),
        }
    }
}

#[async_trait]
impl<F: DocumentFetcher> DocumentFetcher for RateLimitedFetcher<F> {
    async fn fetch(&self, url: &Url) -> FetchResult<String> {
        let host = url.host_str().unwrap_or_default().to_string();
        self.limiter.until_key_ready(&host).await;
        self.inner.fetch(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticFetcher;
    use std::time::Instant;

    #[test]
    fn test_resolve_scheme_less() {
        let url = resolve_source_url("tiki.vn/p/123").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("tiki.vn"));
        assert_eq!(url.path(), "/p/123");
    }

    #[test]
    fn test_resolve_with_scheme() {
        let url = resolve_source_url("http://tiki.vn/p/123").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_str(), Some("tiki.vn"));
    }

    #[test]
    fn test_resolve_rejects_hostless() {
        assert!(resolve_source_url("").is_err());
        assert!(resolve_source_url("https:///nope").is_err());
    }

    #[tokio::test]
    async fn test_per_host_rate_limiting() {
        let fetcher = StaticFetcher::new()
            .with_page("https://tiki.vn/a", "<html></html>")
            .with_page("https://tiki.vn/b", "<html></html>")
            .with_page("https://tiki.vn/c", "<html></html>");

        let limited = RateLimitedFetcher::new(fetcher, 2);

        let start = Instant::now();
        for path in ["a", "b", "c"] {
            let url = Url::parse(&format!("https://tiki.vn/{path}")).unwrap();
            limited.fetch(&url).await.unwrap();
        }
        let elapsed = start.elapsed();

        // 3 requests at 2/sec: the first two pass, the third waits
        assert!(
            elapsed.as_millis() >= 400,
            "rate limiting not applied: {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn test_different_hosts_do_not_share_quota() {
        let fetcher = StaticFetcher::new()
            .with_page("https://tiki.vn/a", "<html></html>")
            .with_page("https://www.lazada.vn/b", "<html></html>");

        let limited = RateLimitedFetcher::new(fetcher, 1);

        let start = Instant::now();
        limited
            .fetch(&Url::parse("https://tiki.vn/a").unwrap())
            .await
            .unwrap();
        limited
            .fetch(&Url::parse("https://www.lazada.vn/b").unwrap())
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert!(
            elapsed.as_millis() < 400,
            "separate hosts should not contend: {elapsed:?}"
        );
    }
}
