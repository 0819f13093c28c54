//! Store documents: an id plus a flat field map.

use allin_core::{ItemId, Product, Service};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A document in a store collection.
///
/// The store enforces no schema: a document is whatever flat field map was
/// last written, addressed by its id. Typed views ([`Product`], [`Service`])
/// are decoded tolerantly on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: ItemId,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Build a document from an id and its fields.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Merge `fields` into this document, overwriting existing keys.
    ///
    /// Keys absent from `fields` keep their prior values, which is what lets
    /// an image-less product edit retain the stored URL.
    pub fn merge(&mut self, fields: Map<String, Value>) {
        for (key, value) in fields {
            self.fields.insert(key, value);
        }
    }

    /// Decode this document as a product.
    #[must_use]
    pub fn to_product(&self) -> Product {
        Product::from_fields(self.id.clone(), &self.fields)
    }

    /// Decode this document as a service.
    #[must_use]
    pub fn to_service(&self) -> Service {
        Service::from_fields(self.id.clone(), &self.fields)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), Value::String((*v).to_owned())))
            .collect()
    }

    #[test]
    fn test_merge_overwrites_and_preserves() {
        let mut doc = Document::new(
            "p1",
            fields(&[
                ("name", "Test Mug"),
                ("price", "$10"),
                ("image", "https://cdn.example.com/mug.png"),
            ]),
        );

        doc.merge(fields(&[("price", "$12")]));

        assert_eq!(doc.fields.get("price").unwrap(), "$12");
        // Untouched keys survive the merge.
        assert_eq!(
            doc.fields.get("image").unwrap(),
            "https://cdn.example.com/mug.png"
        );
        assert_eq!(doc.fields.get("name").unwrap(), "Test Mug");
    }

    #[test]
    fn test_wire_shape() {
        let doc = Document::new("abc", fields(&[("name", "x")]));
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json.get("id").and_then(Value::as_str), Some("abc"));
        let name = json
            .get("fields")
            .and_then(|fields| fields.get("name"))
            .and_then(Value::as_str);
        assert_eq!(name, Some("x"));

        let parsed: Document = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_fields_default_when_missing() {
        let parsed: Document = serde_json::from_str(r#"{"id":"bare"}"#).unwrap();
        assert!(parsed.fields.is_empty());
    }

    #[test]
    fn test_typed_decode() {
        let doc = Document::new(
            "s1",
            fields(&[("title", "Logo Design"), ("icon", "palette")]),
        );
        let service = doc.to_service();
        assert_eq!(service.title, "Logo Design");
        assert_eq!(service.icon, allin_core::IconKey::Palette);
    }
}
