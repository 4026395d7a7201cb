//! Extractor for tiki.vn product pages.
//!
//! Tiki exposes item metadata through OpenGraph `meta[property]` tags
//! and the price through microdata: `meta[itemprop="price"]` plus a
//! `link[itemprop="availability"]` whose href is the schema.org
//! in-stock literal with an *http* identifier.

use async_trait::async_trait;
use scraper::Html;
use std::sync::Arc;
use url::Url;

use super::{attr_value, canonical_url, normalize_url, selector, IN_STOCK_HTTP};
use crate::error::{ScrapeError, ScrapeResult};
use crate::fetch::{resolve_source_url, DocumentFetcher};
use crate::traits::extractor::SiteExtractor;
use crate::types::item::ItemDescriptor;
use crate::types::price::PriceSnapshot;

const HOST: &str = "tiki.vn";
const CURRENCY: &str = "VND";

/// Site extractor for tiki.vn.
pub struct TikiExtractor {
    fetcher: Arc<dyn DocumentFetcher>,
}

impl TikiExtractor {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl SiteExtractor for TikiExtractor {
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

    let name = attr_value(&doc, r#"meta[property="og:title"]"#, "content").ok_or(
        ScrapeError::MissingField {
            field: "og:title",
            url: url.to_string(),
        },
    )?;

    let description =
        attr_value(&doc, r#"meta[property="og:description"]"#, "content").unwrap_or_default();

    let image_url = attr_value(&doc, r#"meta[property="og:image"]"#, "content")
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

    let raw = attr_value(&doc, r#"meta[itemprop="price"]"#, "content").ok_or_else(|| {
        ScrapeError::PriceNotFound {
            url: source_url.to_string(),
        }
    })?;

    let price: i64 = raw.parse().map_err(|_| ScrapeError::Malformed {
        url: source_url.to_string(),
        reason: format!("price {raw:?} is not an integer"),
    })?;

    if price == 0 {
        return Err(ScrapeError::PriceNotFound {
            url: source_url.to_string(),
        });
    }

    let available = doc
        .select(&selector(r#"link[itemprop="availability"]"#))
        .next()
        .and_then(|el| el.value().attr("href"))
        .is_some_and(|href| href == IN_STOCK_HTTP);

    Ok(PriceSnapshot { price, available })
}
