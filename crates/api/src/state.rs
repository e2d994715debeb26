use std::sync::Arc;

use crackers_core::assets::AssetStore;
use crackers_db::store::RecordStore;

use crate::catalog::CatalogCoordinator;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything lives behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Record store for reads and order writes.
    pub records: Arc<dyn RecordStore>,
    /// Coordinates catalog writes with the asset store.
    pub catalog: Arc<CatalogCoordinator>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wire the coordinator to the given stores using the config's catalog settings.
    pub fn new(
        records: Arc<dyn RecordStore>,
        assets: Arc<dyn AssetStore>,
        config: ServerConfig,
    ) -> Self {
        let catalog = CatalogCoordinator::new(
            Arc::clone(&records),
            assets,
            config.catalog_settings(),
        );
        Self {
            records,
            catalog: Arc::new(catalog),
            config: Arc::new(config),
        }
    }
}
