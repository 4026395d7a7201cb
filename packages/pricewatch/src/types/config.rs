//! Configuration for fetching and update passes.

use std::time::Duration;

/// Default identifying User-Agent sent with every outbound fetch.
///
/// A generic bot string that the supported sites tolerate. Override it
/// via [`FetchConfig::with_user_agent`] when operating under your own
/// identity.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

/// Outbound HTTP behavior of the document fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Identifying client header sent with every request
    pub user_agent: String,

    /// Per-request timeout; an unresponsive site must not hang a worker
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl FetchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identifying User-Agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Tuning for a batch update pass.
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    /// Maximum number of items updated concurrently.
    ///
    /// Bounds both outbound network pressure and database connections.
    /// Default: 8.
    pub max_concurrency: usize,

    /// Optional overall pass deadline.
    ///
    /// On expiry, in-flight items finish naturally; items not yet
    /// started are skipped and the pass reports partial results.
    pub pass_deadline: Option<Duration>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            pass_deadline: None,
        }
    }
}

impl UpdateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency cap (must be at least 1).
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Set an overall pass deadline.
    pub fn with_pass_deadline(mut self, deadline: Duration) -> Self {
        self.pass_deadline = Some(deadline);
        self
    }
}
