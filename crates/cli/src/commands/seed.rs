//! Push the built-in fallback catalogs into the live store.
//!
//! Items whose name already exists in the target collection are skipped,
//! so re-running the command is safe. The demo store is in-memory and
//! already seeded at startup, which is why this command refuses to run
//! without live store credentials.

use std::collections::HashSet;

use allin_catalog::{CatalogStore, Document, defaults::fallback_documents};
use allin_core::Collection;
use allin_site::config::SiteConfig;
use tracing::info;

/// Seed the given collections from the built-in catalogs.
///
/// With `dry_run` the store is read but never written; the log shows what
/// a real run would create.
///
/// # Errors
///
/// Returns an error if store credentials are missing (demo mode), if the
/// configuration is invalid, or if a store call fails.
pub async fn run(
    collections: &[Collection],
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = SiteConfig::from_env()?;
    let Some(settings) = config.store.as_ref() else {
        return Err(
            "no store credentials configured: seeding writes to the live store, \
             and the demo store re-seeds itself on startup"
                .into(),
        );
    };

    let store = CatalogStore::Remote(super::remote_store(settings)?);

    let mut created = 0usize;
    let mut skipped = 0usize;

    for &collection in collections {
        let existing: HashSet<String> = store
            .list(collection)
            .await?
            .iter()
            .map(|doc| label(collection, doc))
            .collect();

        for doc in fallback_documents(collection) {
            let name = label(collection, &doc);
            if existing.contains(&name) {
                info!(%collection, item = %name, "already present, skipping");
                skipped += 1;
                continue;
            }
            if dry_run {
                info!(%collection, item = %name, "would create");
            } else {
                let stored = store.create(collection, doc.fields).await?;
                info!(%collection, item = %name, id = %stored.id, "created");
            }
            created += 1;
        }
    }

    if dry_run {
        info!("Dry run complete, nothing was written");
        info!("  Would create: {created}");
    } else {
        info!("Seeding complete!");
        info!("  Created: {created}");
    }
    info!("  Skipped (already present): {skipped}");

    Ok(())
}

/// The label used for duplicate detection: product name or service title.
fn label(collection: Collection, doc: &Document) -> String {
    match collection {
        Collection::Products => doc.to_product().name,
        Collection::Services => doc.to_service().title,
    }
}
