//! The seam between the container and the asset services of the host.

use std::sync::Arc;

use crate::asset::catalog::AssetCatalog;
use crate::asset::manager::AssetManager;
use crate::asset::{Asset, AssetId, AssetInfo, AssetLoadBehavior, AssetStatus, AssetType};

/// The asset identity and catalog services the container registers its products with.
pub trait AssetRegistry: Send + Sync {
    /// Registers the catalog record of a product.
    fn register_asset(&self, id: AssetId, info: AssetInfo);

    /// Removes the catalog record of `id`.
    fn unregister_asset(&self, id: AssetId);

    fn find_or_create_asset(
        &self,
        id: AssetId,
        asset_type: AssetType,
        load_behavior: AssetLoadBehavior,
    ) -> Asset;

    /// Makes the data held by `asset` the live data of its identity.
    fn assign_asset_data(&self, asset: &Asset);

    /// Returns the live handle of `id`, starting an asynchronous load if required.
    fn get_asset(
        &self,
        id: AssetId,
        asset_type: AssetType,
        load_behavior: AssetLoadBehavior,
    ) -> Asset;

    fn block_until_load_complete(&self, asset: &Asset) -> AssetStatus;
}

/// An `AssetRegistry` backed by an `AssetCatalog` and an `AssetManager`.
#[derive(Clone)]
pub struct AssetRegistryBridge {
    catalog: Arc<AssetCatalog>,
    manager: Arc<AssetManager>,
}

impl AssetRegistryBridge {
    pub fn new(catalog: Arc<AssetCatalog>, manager: Arc<AssetManager>) -> Self {
        AssetRegistryBridge { catalog, manager }
    }

    #[inline]
    pub fn catalog(&self) -> &Arc<AssetCatalog> {
        &self.catalog
    }

    #[inline]
    pub fn manager(&self) -> &Arc<AssetManager> {
        &self.manager
    }
}

impl AssetRegistry for AssetRegistryBridge {
    fn register_asset(&self, id: AssetId, info: AssetInfo) {
        self.catalog.register_asset(id, info);
    }

    fn unregister_asset(&self, id: AssetId) {
        if self.catalog.unregister_asset(id).is_none() {
            warn!("[AssetRegistryBridge] unregisters unknown asset {}.", id);
        }
    }

    fn find_or_create_asset(
        &self,
        id: AssetId,
        asset_type: AssetType,
        load_behavior: AssetLoadBehavior,
    ) -> Asset {
        self.manager
            .find_or_create_asset(id, asset_type, load_behavior)
    }

    fn assign_asset_data(&self, asset: &Asset) {
        self.manager.assign_asset_data(asset);
    }

    fn get_asset(
        &self,
        id: AssetId,
        asset_type: AssetType,
        load_behavior: AssetLoadBehavior,
    ) -> Asset {
        self.manager.get_asset(id, asset_type, load_behavior)
    }

    fn block_until_load_complete(&self, asset: &Asset) -> AssetStatus {
        self.manager.block_until_load_complete(asset)
    }
}
