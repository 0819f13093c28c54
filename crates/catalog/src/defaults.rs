//! Built-in fallback catalogs.
//!
//! Served when a subscription cannot reach the store, and used to seed the
//! demo emulator so the admin screens have content to edit. The lists mirror
//! the company's long-standing print/merch lineup.

use allin_core::{Collection, ItemId, Product, Service};
use serde_json::{Map, Value};

use crate::document::Document;

/// The fallback catalog for a collection, as store documents.
#[must_use]
pub fn fallback_documents(collection: Collection) -> Vec<Document> {
    match collection {
        Collection::Products => FALLBACK_PRODUCTS
            .iter()
            .map(|(id, name, description, price, icon)| {
                let mut fields = Map::new();
                fields.insert("name".to_owned(), Value::String((*name).to_owned()));
                fields.insert(
                    "description".to_owned(),
                    Value::String((*description).to_owned()),
                );
                fields.insert("price".to_owned(), Value::String((*price).to_owned()));
                fields.insert("icon".to_owned(), Value::String((*icon).to_owned()));
                Document::new(ItemId::from(*id), fields)
            })
            .collect(),
        Collection::Services => FALLBACK_SERVICES
            .iter()
            .map(|(id, title, description, icon)| {
                let mut fields = Map::new();
                fields.insert("title".to_owned(), Value::String((*title).to_owned()));
                fields.insert(
                    "description".to_owned(),
                    Value::String((*description).to_owned()),
                );
                fields.insert("icon".to_owned(), Value::String((*icon).to_owned()));
                Document::new(ItemId::from(*id), fields)
            })
            .collect(),
    }
}

/// The fallback product list, typed.
#[must_use]
pub fn fallback_products() -> Vec<Product> {
    fallback_documents(Collection::Products)
        .iter()
        .map(Document::to_product)
        .collect()
}

/// The fallback service list, typed.
#[must_use]
pub fn fallback_services() -> Vec<Service> {
    fallback_documents(Collection::Services)
        .iter()
        .map(Document::to_service)
        .collect()
}

// (id, name, description, price, icon)
const FALLBACK_PRODUCTS: &[(&str, &str, &str, &str, &str)] = &[
    (
        "1",
        "Premium Brand Tee",
        "Ultra-soft cotton blend with embroidered logo. Perfect for team building and brand promotion.",
        "$45",
        "tshirt",
    ),
    (
        "2",
        "Luxury Coffee Mug",
        "Ceramic mug with gold accents and custom branding. Ideal for corporate gifts and promotions.",
        "$25",
        "coffee",
    ),
    (
        "3",
        "Executive Notebook",
        "Leather-bound with gold embossing and premium paper quality. Perfect for business professionals.",
        "$35",
        "notebook",
    ),
    (
        "4",
        "Branded Bottles",
        "Eco-friendly promotional drinkware with custom designs",
        "$30",
        "drop",
    ),
    (
        "5",
        "Wristbands",
        "Silicone and fabric promotional wristbands for events",
        "$8",
        "watch",
    ),
    (
        "6",
        "Buttons",
        "Custom pin badges and promotional buttons",
        "$5",
        "circle",
    ),
    (
        "7",
        "USBs",
        "Branded flash drives and tech accessories",
        "$20",
        "usb",
    ),
    (
        "8",
        "Umbrellas",
        "Weather protection with your brand",
        "$40",
        "umbrella",
    ),
];

// (id, title, description, icon)
const FALLBACK_SERVICES: &[(&str, &str, &str, &str)] = &[
    (
        "1",
        "Logo Design",
        "Unique brand identities that capture your essence and resonate with your audience.",
        "palette",
    ),
    (
        "2",
        "Event Video Editing",
        "Professional video production and editing for corporate events and campaigns.",
        "video",
    ),
    (
        "3",
        "Social Media Posters",
        "Eye-catching graphics designed for maximum engagement across all platforms.",
        "megaphone",
    ),
    (
        "4",
        "Printing (Flyers, Banners)",
        "High-quality print materials from business cards to large format displays.",
        "printer",
    ),
    (
        "5",
        "Company Profiles",
        "Comprehensive corporate documents that showcase your business professionally.",
        "briefcase",
    ),
    (
        "6",
        "Product Photography",
        "Studio-quality product shots that make your offerings irresistible.",
        "camera",
    ),
];

#[cfg(test)]
mod tests {
    use allin_core::IconKey;

    use super::*;

    #[test]
    fn test_fallback_products_shape() {
        let products = fallback_products();
        assert_eq!(products.len(), 8);

        let tee = products.first().expect("fallback catalog is never empty");
        assert_eq!(tee.name, "Premium Brand Tee");
        assert_eq!(tee.price, "$45");
        assert_eq!(tee.icon, IconKey::TShirt);
        // Fallback items render the glyph placeholder, never an image URL.
        assert!(tee.image.is_none());
    }

    #[test]
    fn test_fallback_services_shape() {
        let services = fallback_services();
        assert_eq!(services.len(), 6);

        let first = services.first().expect("fallback catalog is never empty");
        assert_eq!(first.title, "Logo Design");
        assert_eq!(first.icon, IconKey::Palette);
    }

    #[test]
    fn test_ids_unique_within_collection() {
        let docs = fallback_documents(Collection::Products);
        let mut ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), docs.len());
    }
}
