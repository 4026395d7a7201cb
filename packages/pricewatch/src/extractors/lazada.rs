//! Extractor for www.lazada.vn product pages.
//!
//! Lazada serves its OpenGraph tags with `meta[name]` attributes (not
//! `property`) and embeds pricing in a JSON-LD block: the offer carries
//! `lowPrice`/`highPrice` and an availability literal with an *https*
//! schema.org identifier.

use async_trait::async_trait;
use scraper::Html;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use super::{attr_value, canonical_url, normalize_url, selector, IN_STOCK_HTTPS};
use crate::error::{ScrapeError, ScrapeResult};
use crate::fetch::{resolve_source_url, DocumentFetcher};
use crate::traits::extractor::SiteExtractor;
use crate::types::item::ItemDescriptor;
use crate::types::price::PriceSnapshot;

const HOST: &str = "www.lazada.vn";
const CURRENCY: &str = "VND";

/// Site extractor for www.lazada.vn.
pub struct LazadaExtractor {
    fetcher: Arc<dyn DocumentFetcher>,
}

impl LazadaExtractor {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl SiteExtractor for LazadaExtractor {
    fn host(&self) -> &str {
        HOST
    }

    async fn scrape_info(&self, url: &Url) -> ScrapeResult<ItemDescriptor> {
        let html = self.fetcher.fetch(url).await?;
        parse_info(&html, url)
    }

    async fn scrape_price(&self, item: &ItemDescriptor) -> ScrapeResult<PriceSnapshot> {
        let url = resolve_source_url(&item.url)?;
        let html = self.fetcher.fetch(&url).await?;
        parse_price(&html, &item.url)
    }
}

fn parse_info(html: &str, url: &Url) -> ScrapeResult<ItemDescriptor> {
    let doc = Html::parse_document(html);

    let name = attr_value(&doc, r#"meta[name="og:title"]"#, "content").ok_or(
        ScrapeError::MissingField {
            field: "og:title",
            url: url.to_string(),
        },
    )?;

    let description =
        attr_value(&doc, r#"meta[name="description"]"#, "content").unwrap_or_default();

    let image_url = attr_value(&doc, r#"meta[name="og:image"]"#, "content")
        .map(|raw| normalize_url(&raw))
        .unwrap_or_default();

    Ok(ItemDescriptor {
        name,
        description,
        image_url,
        url: canonical_url(url),
        currency: CURRENCY.to_string(),
    })
}

fn parse_price(html: &str, source_url: &str) -> ScrapeResult<PriceSnapshot> {
    let doc = Html::parse_document(html);

    let raw: String = doc
        .select(&selector(r#"script[type="application/ld+json"]"#))
        .next()
        .map(|el| el.text().collect())
        .unwrap_or_default();

    let data: Value = serde_json::from_str(&raw).map_err(|e| ScrapeError::Malformed {
        url: source_url.to_string(),
        reason: format!("JSON-LD block unreadable: {e}"),
    })?;

    let offers = data.get("offers");

    let price = offers
        .and_then(|o| o.get("lowPrice"))
        .or_else(|| offers.and_then(|o| o.get("highPrice")))
        .and_then(Value::as_f64)
        .map(|p| p as i64)
        .unwrap_or(0);

    if price == 0 {
        return Err(ScrapeError::PriceNotFound {
            url: source_url.to_string(),
        });
    }

    let available = offers
        .and_then(|o| o.get("availability"))
        .and_then(Value::as_str)
        .is_some_and(|a| a == IN_STOCK_HTTPS);

    Ok(PriceSnapshot { price, available })
}
