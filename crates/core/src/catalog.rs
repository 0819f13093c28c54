//! Catalog item shapes, drafts, and draft validation.
//!
//! The document store holds two independent collections, `products` and
//! `services`. Each document is a flat field map with no server-side schema,
//! so the types here are tolerant when decoding (missing fields become
//! defaults) and strict when validating admin input (drafts are checked
//! before any store call is made).

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{IconKey, ItemId};

// ============================================================================
// Collections
// ============================================================================

/// The two catalog collections.
///
/// Collections are independent: ids are unique per collection and there are
/// no cross-references between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Products,
    Services,
}

impl Collection {
    /// The collection's name on the store wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Services => "services",
        }
    }

    /// Icon pre-selected when the admin "Add" form opens.
    #[must_use]
    pub const fn default_icon(self) -> IconKey {
        match self {
            Self::Products => IconKey::Package,
            Self::Services => IconKey::Wrench,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" => Ok(Self::Products),
            "services" => Ok(Self::Services),
            _ => Err(format!("invalid collection: {s}")),
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Rejections raised before any store call is attempted.
///
/// Surfaced inline in the admin form; a draft that fails validation never
/// reaches the store or object storage.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name is required")]
    MissingName,
    #[error("title is required")]
    MissingTitle,
    #[error("description is required")]
    MissingDescription,
    #[error("price is required")]
    MissingPrice,
    #[error("an image is required")]
    MissingImage,
    #[error("uploaded file must be an image")]
    NotAnImage,
    #[error("image must be at most {max_bytes} bytes")]
    ImageTooLarge {
        /// Upload size cap.
        max_bytes: usize,
    },
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

// ============================================================================
// Products
// ============================================================================

/// A product as read from a snapshot.
///
/// Decoding is tolerant: old documents may lack any field, so everything
/// defaults rather than failing. `image` is `None` when absent or empty;
/// display code renders the icon glyph as a placeholder in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price: String,
    pub icon: IconKey,
    pub image: Option<String>,
}

impl Product {
    /// Decode a product from a stored field map.
    #[must_use]
    pub fn from_fields(id: ItemId, fields: &Map<String, Value>) -> Self {
        Self {
            id,
            name: string_field(fields, "name"),
            description: string_field(fields, "description"),
            price: string_field(fields, "price"),
            icon: icon_field(fields),
            image: optional_field(fields, "image"),
        }
    }
}

/// Admin input for creating or updating a product.
///
/// `image` holds the resolved public URL after upload; `None` on an edit
/// means "keep whatever URL the document already has": [`Self::into_fields`]
/// omits the key so a merge write preserves the prior value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: String,
    pub icon: IconKey,
    pub image: Option<String>,
}

impl ProductDraft {
    /// Check the fields a creation must carry: name, description, image.
    ///
    /// # Errors
    ///
    /// Returns the first missing requirement.
    pub fn validate_for_create(&self) -> Result<(), ValidationError> {
        self.validate_text()?;
        match &self.image {
            Some(url) if !is_blank(url) => Ok(()),
            _ => Err(ValidationError::MissingImage),
        }
    }

    /// Check the fields an update must carry; a new image is optional.
    ///
    /// # Errors
    ///
    /// Returns the first missing requirement.
    pub fn validate_for_update(&self) -> Result<(), ValidationError> {
        self.validate_text()
    }

    fn validate_text(&self) -> Result<(), ValidationError> {
        if is_blank(&self.name) {
            return Err(ValidationError::MissingName);
        }
        if is_blank(&self.description) {
            return Err(ValidationError::MissingDescription);
        }
        if is_blank(&self.price) {
            return Err(ValidationError::MissingPrice);
        }
        Ok(())
    }

    /// The flat field map written to the store.
    ///
    /// `image` is only present when a new URL was resolved, so merge writes
    /// retain the previous one.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("name".to_owned(), Value::String(self.name));
        fields.insert("description".to_owned(), Value::String(self.description));
        fields.insert("price".to_owned(), Value::String(self.price));
        fields.insert(
            "icon".to_owned(),
            Value::String(self.icon.as_str().to_owned()),
        );
        if let Some(url) = self.image {
            fields.insert("image".to_owned(), Value::String(url));
        }
        fields
    }
}

// ============================================================================
// Services
// ============================================================================

/// A service as read from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    pub icon: IconKey,
}

impl Service {
    /// Decode a service from a stored field map.
    #[must_use]
    pub fn from_fields(id: ItemId, fields: &Map<String, Value>) -> Self {
        Self {
            id,
            title: string_field(fields, "title"),
            description: string_field(fields, "description"),
            icon: icon_field(fields),
        }
    }
}

/// Admin input for creating or updating a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDraft {
    pub title: String,
    pub description: String,
    pub icon: IconKey,
}

impl ServiceDraft {
    /// Check the fields every service write must carry.
    ///
    /// # Errors
    ///
    /// Returns the first missing requirement.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.title) {
            return Err(ValidationError::MissingTitle);
        }
        if is_blank(&self.description) {
            return Err(ValidationError::MissingDescription);
        }
        Ok(())
    }

    /// The flat field map written to the store.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("title".to_owned(), Value::String(self.title));
        fields.insert("description".to_owned(), Value::String(self.description));
        fields.insert(
            "icon".to_owned(),
            Value::String(self.icon.as_str().to_owned()),
        );
        fields
    }
}

// ============================================================================
// Field helpers
// ============================================================================

fn string_field(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

fn optional_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

fn icon_field(fields: &Map<String, Value>) -> IconKey {
    fields
        .get("icon")
        .and_then(Value::as_str)
        .map_or_else(IconKey::default, IconKey::parse_or_default)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Test Mug".to_owned(),
            description: "x".to_owned(),
            price: "$10".to_owned(),
            icon: IconKey::Coffee,
            image: Some("https://media.example.com/products/1_mug.png".to_owned()),
        }
    }

    #[test]
    fn test_create_requires_name() {
        let mut d = draft();
        d.name = "  ".to_owned();
        assert_eq!(
            d.validate_for_create(),
            Err(ValidationError::MissingName)
        );
    }

    #[test]
    fn test_create_requires_description() {
        let mut d = draft();
        d.description = String::new();
        assert_eq!(
            d.validate_for_create(),
            Err(ValidationError::MissingDescription)
        );
    }

    #[test]
    fn test_create_requires_price() {
        let mut d = draft();
        d.price = " ".to_owned();
        assert_eq!(d.validate_for_create(), Err(ValidationError::MissingPrice));
        assert_eq!(d.validate_for_update(), Err(ValidationError::MissingPrice));
    }

    #[test]
    fn test_create_requires_image() {
        let mut d = draft();
        d.image = None;
        assert_eq!(
            d.validate_for_create(),
            Err(ValidationError::MissingImage)
        );

        d.image = Some(String::new());
        assert_eq!(
            d.validate_for_create(),
            Err(ValidationError::MissingImage)
        );
    }

    #[test]
    fn test_update_allows_missing_image() {
        let mut d = draft();
        d.image = None;
        assert!(d.validate_for_update().is_ok());
    }

    #[test]
    fn test_into_fields_omits_absent_image() {
        let mut d = draft();
        d.image = None;
        let fields = d.into_fields();
        assert!(!fields.contains_key("image"));
        assert_eq!(fields.get("name").unwrap(), "Test Mug");
        assert_eq!(fields.get("icon").unwrap(), "coffee");
    }

    #[test]
    fn test_into_fields_includes_new_image() {
        let fields = draft().into_fields();
        assert_eq!(
            fields.get("image").unwrap(),
            "https://media.example.com/products/1_mug.png"
        );
    }

    #[test]
    fn test_product_decode_tolerates_missing_fields() {
        let fields = Map::new();
        let product = Product::from_fields(ItemId::from("p1"), &fields);
        assert_eq!(product.name, "");
        assert_eq!(product.icon, IconKey::Package);
        assert_eq!(product.image, None);
    }

    #[test]
    fn test_product_decode_treats_empty_image_as_absent() {
        let mut fields = Map::new();
        fields.insert("image".to_owned(), Value::String(String::new()));
        let product = Product::from_fields(ItemId::from("p1"), &fields);
        assert_eq!(product.image, None);
    }

    #[test]
    fn test_product_decode_unknown_icon_falls_back() {
        let mut fields = Map::new();
        fields.insert("icon".to_owned(), Value::String("sparkles".to_owned()));
        let product = Product::from_fields(ItemId::from("p1"), &fields);
        assert_eq!(product.icon, IconKey::Package);
    }

    #[test]
    fn test_service_validate() {
        let s = ServiceDraft {
            title: String::new(),
            description: "d".to_owned(),
            icon: IconKey::Wrench,
        };
        assert_eq!(s.validate(), Err(ValidationError::MissingTitle));
    }

    #[test]
    fn test_collection_round_trip() {
        assert_eq!(Collection::Products.as_str(), "products");
        assert_eq!("services".parse::<Collection>(), Ok(Collection::Services));
        assert!("orders".parse::<Collection>().is_err());
    }

    #[test]
    fn test_default_icons() {
        assert_eq!(Collection::Products.default_icon(), IconKey::Package);
        assert_eq!(Collection::Services.default_icon(), IconKey::Wrench);
    }
}
