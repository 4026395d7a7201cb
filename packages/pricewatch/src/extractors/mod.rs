//! Site extractor implementations and the hostname registry.
//!
//! One extractor exists per supported shopping site; the registry maps
//! each extractor's hostname to its implementation. Adding a site means
//! adding a module here and wiring it into [`default_registry`]; the
//! orchestrator never changes.

pub mod lazada;
pub mod registry;
pub mod tiki;

pub use lazada::LazadaExtractor;
pub use registry::{ExtractorRegistry, RegistryBuilder};
pub use tiki::TikiExtractor;

use scraper::{Html, Selector};
use std::sync::Arc;
use url::Url;

use crate::fetch::DocumentFetcher;

/// schema.org in-stock literal served with an HTTPS identifier.
pub const IN_STOCK_HTTPS: &str = "https://schema.org/InStock";

/// schema.org in-stock literal served with an HTTP identifier. Some
/// sites still emit this variant; the two are NOT interchangeable and
/// each extractor pins exactly one.
pub const IN_STOCK_HTTP: &str = "http://schema.org/InStock";

/// Registry wired with every supported site extractor, all sharing one
/// document fetcher.
pub fn default_registry(fetcher: Arc<dyn DocumentFetcher>) -> ExtractorRegistry {
    ExtractorRegistry::builder()
        .register(TikiExtractor::new(fetcher.clone()))
        .register(LazadaExtractor::new(fetcher))
        .build()
        .expect("built-in extractors have unique hosts")
}

/// Parse a static CSS selector.
pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// First matching element's attribute value, trimmed; `None` when the
/// element or attribute is absent or empty.
pub(crate) fn attr_value(doc: &Html, css: &'static str, attr: &str) -> Option<String> {
    let value = doc
        .select(&selector(css))
        .next()?
        .value()
        .attr(attr)?
        .trim()
        .to_string();
    (!value.is_empty()).then_some(value)
}

/// Canonical form of a URL: host + path, scheme and query stripped.
pub(crate) fn canonical_url(url: &Url) -> String {
    format!("{}{}", url.host_str().unwrap_or_default(), url.path())
}

/// Normalize a raw URL string (possibly protocol-relative or
/// scheme-less) to canonical host + path. Empty result when the value
/// cannot be parsed.
pub(crate) fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let candidate = if trimmed.starts_with("//") {
        format!("https:{trimmed}")
    } else if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    Url::parse(&candidate)
        .ok()
        .filter(|url| url.host_str().is_some_and(|h| !h.is_empty()))
        .map(|url| canonical_url(&url))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticFetcher;

    #[test]
    fn test_canonical_url_strips_query() {
        let url = Url::parse("https://tiki.vn/p/123?spid=456&src=search").unwrap();
        assert_eq!(canonical_url(&url), "tiki.vn/p/123");
    }

    #[test]
    fn test_normalize_url_variants() {
        assert_eq!(
            normalize_url("https://cdn.tiki.vn/img/1.jpg?w=200"),
            "cdn.tiki.vn/img/1.jpg"
        );
        assert_eq!(
            normalize_url("//cdn.lazada.vn/img/2.jpg"),
            "cdn.lazada.vn/img/2.jpg"
        );
        assert_eq!(normalize_url(""), "");
    }

    #[test]
    fn test_default_registry_hosts() {
        let registry = default_registry(Arc::new(StaticFetcher::new()));
        assert!(registry.lookup("tiki.vn").is_some());
        assert!(registry.lookup("www.lazada.vn").is_some());
        assert!(registry.lookup("unknown.example").is_none());
        assert_eq!(registry.len(), 2);
    }
}
