//! Tracked items and the descriptors extractors produce for them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked product.
///
/// Items are created by a registration flow outside this crate and are
/// read-only to the update orchestrator. The stored `url` is canonical:
/// host + path with the scheme and query stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Free-form description (may be empty)
    pub description: String,

    /// Canonical image URL (host + path, may be empty)
    pub image_url: String,

    /// Canonical source URL (host + path)
    pub url: String,

    /// ISO currency code, fixed per source site
    pub currency: String,
}

impl Item {
    /// Create a new item with a fresh id.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            image_url: String::new(),
            url: url.into(),
            currency: "VND".to_string(),
        }
    }

    /// Build an item from a scraped descriptor.
    pub fn from_descriptor(descriptor: ItemDescriptor) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: descriptor.name,
            description: descriptor.description,
            image_url: descriptor.image_url,
            url: descriptor.url,
            currency: descriptor.currency,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the image URL.
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Set the currency code.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// The descriptor view of this item, as passed to `scrape_price`.
    pub fn descriptor(&self) -> ItemDescriptor {
        ItemDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            url: self.url.clone(),
            currency: self.currency.clone(),
        }
    }
}

/// Normalized item metadata extracted from a product page.
///
/// `url` and `image_url` are host + path with the query stripped;
/// `description` and `image_url` may be empty, `name` never is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub url: String,
    pub currency: String,
}
