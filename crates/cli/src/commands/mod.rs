//! CLI command implementations.

pub mod list;
pub mod seed;

use allin_catalog::{RemoteStore, StoreConfig, StoreError};
use allin_site::config::StoreSettings;

/// Build a live store client from the site's store settings.
pub(crate) fn remote_store(settings: &StoreSettings) -> Result<RemoteStore, StoreError> {
    RemoteStore::new(&StoreConfig {
        base_url: settings.api_url.clone(),
        api_key: settings.api_key.clone(),
        poll_interval: settings.poll_interval,
    })
}
