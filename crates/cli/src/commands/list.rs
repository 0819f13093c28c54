//! Print the store's current contents.

use std::time::Duration;

use allin_catalog::{CatalogStore, DemoStore};
use allin_core::Collection;
use allin_site::config::SiteConfig;
use tracing::info;

/// Print every document in both collections.
///
/// Live credentials select the remote store; without them the command
/// prints the seeded demo catalog the site would serve.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a store call fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = SiteConfig::from_env()?;
    let store = match config.store.as_ref() {
        Some(settings) => CatalogStore::Remote(super::remote_store(settings)?),
        None => {
            info!("no store credentials configured, listing the built-in demo catalog");
            CatalogStore::Demo(DemoStore::new(Duration::ZERO))
        }
    };

    let products = store.list(Collection::Products).await?;
    info!("Products: {}", products.len());
    for doc in &products {
        let product = doc.to_product();
        info!("  {}  {}  {}", product.id, product.name, product.price);
    }

    let services = store.list(Collection::Services).await?;
    info!("Services: {}", services.len());
    for doc in &services {
        let service = doc.to_service();
        info!("  {}  {}", service.id, service.title);
    }

    Ok(())
}
