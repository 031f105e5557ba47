//! Shared types used across the Sifter workspace.
//!
//! This module defines the scraped record shape and the newtypes and
//! sentinels that go with it.

use crate::error::SifterError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for a field that could not be determined (or was not attempted yet).
pub const UNKNOWN: &str = "unknown";

/// Description placeholder used when a detail page was fetched but had no usable text.
pub const NO_DESCRIPTION: &str = "no description available";

/// Newtype for marketplace item identifiers.
///
/// Item IDs are the numeric trailing segment of a canonical detail link
/// (`https://<host>/itm/<id>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create a new `ItemId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is empty or not purely numeric.
    pub fn new(id: impl Into<String>) -> Result<Self, SifterError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), SifterError> {
        if id.is_empty() {
            return Err(SifterError::Validation(
                "invalid item ID: must not be empty".to_string(),
            ));
        }

        if id.chars().all(|c| c.is_ascii_digit()) {
            Ok(())
        } else {
            Err(SifterError::Validation(format!(
                "invalid item ID: must be numeric, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single scraped marketplace item.
///
/// Created by the listing extractor. Only `description` is ever changed
/// afterwards (by detail enhancement).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Identifier derived from the canonical link
    pub id: Option<ItemId>,
    /// Normalized item title, never empty
    pub name: String,
    /// Normalized price text or [`UNKNOWN`]
    pub price: String,
    /// Canonical absolute link to the detail page
    pub link: String,
    /// Image URL or [`UNKNOWN`]
    pub image: String,
    /// Normalized description, [`UNKNOWN`] or [`NO_DESCRIPTION`]
    pub description: String,
}

impl Product {
    /// Whether the description still carries the "not attempted" sentinel.
    #[must_use]
    pub fn description_pending(&self) -> bool {
        self.description == UNKNOWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_valid() {
        let id = ItemId::new("256123456789").expect("numeric id");
        assert_eq!(id.as_str(), "256123456789");
        assert_eq!(id.to_string(), "256123456789");
    }

    #[test]
    fn test_item_id_invalid() {
        assert!(ItemId::new("").is_err());
        assert!(ItemId::new("abc123").is_err());
        assert!(ItemId::new("123?hash=1").is_err());
    }

    #[test]
    fn test_product_serializes_id_as_plain_string() {
        let product = Product {
            id: Some(ItemId::new("42").unwrap()),
            name: "Nike Air Max 90".to_string(),
            price: "$120.00".to_string(),
            link: "https://www.ebay.com/itm/42".to_string(),
            image: UNKNOWN.to_string(),
            description: UNKNOWN.to_string(),
        };

        let json = serde_json::to_value(&product).expect("serialize product");
        assert_eq!(json["id"], "42");
        assert_eq!(json["image"], "unknown");
        assert!(product.description_pending());
    }
}
