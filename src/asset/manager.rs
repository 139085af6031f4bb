//! # AssetManager
//!
//! The `AssetManager` keeps the table of live assets of the host, indexed by identity, and
//! drives the asynchronous loading of their data.
//!
//! The manager only holds weak references to the asset data. An identity stays in the live
//! table as long as somebody owns an [`Asset`] handle to it, and vanishes when the last handle
//! is released.
//!
//! Loading is delegated to the [`AssetHandler`] registered for the type of the asset. Handlers
//! are executed on a fixed-size pool of loader threads owned by the manager, and the callers
//! could block until the load completes with [`AssetManager::block_until_load_complete`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, RwLock, Weak};

use crate::errors::*;
use crate::utils::prelude::FastHashMap;

use super::worker::{LoaderPool, DEFAULT_LOADERS};
use super::{Asset, AssetData, AssetId, AssetLoadBehavior, AssetStatus, AssetType};

/// Produces the bytes of assets of a specific type.
pub trait AssetHandler: Send + Sync + 'static {
    fn load(&self, id: AssetId, asset_type: AssetType) -> Result<Box<[u8]>>;
}

impl<F> AssetHandler for F
where
    F: Fn(AssetId, AssetType) -> Result<Box<[u8]>> + Send + Sync + 'static,
{
    fn load(&self, id: AssetId, asset_type: AssetType) -> Result<Box<[u8]>> {
        (self)(id, asset_type)
    }
}

pub struct AssetManager {
    assets: Mutex<FastHashMap<AssetId, Weak<AssetData>>>,
    handlers: RwLock<FastHashMap<AssetType, Arc<dyn AssetHandler>>>,
    loaders: LoaderPool,
}

impl Default for AssetManager {
    fn default() -> Self {
        AssetManager::with_loaders(DEFAULT_LOADERS)
    }
}

impl AssetManager {
    pub fn new() -> Self {
        AssetManager::default()
    }

    /// Creates a manager which runs at most `num` loads at the same time.
    pub fn with_loaders(num: usize) -> Self {
        AssetManager {
            assets: Mutex::new(FastHashMap::default()),
            handlers: RwLock::new(FastHashMap::default()),
            loaders: LoaderPool::new(num.max(1)),
        }
    }

    /// Add or replace the handler of `asset_type`.
    pub fn register_handler<T: AssetHandler>(&self, asset_type: AssetType, handler: T) {
        info!("[AssetManager] registers handler of asset type {}.", asset_type);
        self.handlers
            .write()
            .unwrap()
            .insert(asset_type, Arc::new(handler));
    }

    /// Returns the live handle of `id` if exists.
    pub fn find_asset(&self, id: AssetId) -> Option<Asset> {
        let mut assets = self.assets.lock().unwrap();
        let data = assets.get(&id).map(Weak::upgrade)?;

        match data {
            Some(data) => Some(Asset::from_data(data, AssetLoadBehavior::Default)),
            None => {
                assets.remove(&id);
                None
            }
        }
    }

    /// Returns the live handle of `id`, or creates a not loaded one if there is none.
    pub fn find_or_create_asset(
        &self,
        id: AssetId,
        asset_type: AssetType,
        load_behavior: AssetLoadBehavior,
    ) -> Asset {
        let data = self.find_or_insert(id, asset_type);
        Asset::from_data(data, load_behavior)
    }

    /// Makes the data held by `asset` the live data of its identity. Handles obtained before
    /// keep pointing to the data they were created with.
    pub fn assign_asset_data(&self, asset: &Asset) {
        let data = match asset.data() {
            Some(data) => data,
            None => {
                warn!(
                    "[AssetManager] could not assign asset {}, the handle holds no data.",
                    asset.id()
                );
                return;
            }
        };

        let mut assets = self.assets.lock().unwrap();
        assets.retain(|_, v| v.upgrade().is_some());
        assets.insert(asset.id(), Arc::downgrade(data));
    }

    /// Returns the live handle of `id`, and starts loading its data asynchronously if it has
    /// not been loaded yet and `load_behavior` is not `NoLoad`.
    pub fn get_asset(
        &self,
        id: AssetId,
        asset_type: AssetType,
        load_behavior: AssetLoadBehavior,
    ) -> Asset {
        let data = self.find_or_insert(id, asset_type);

        if load_behavior != AssetLoadBehavior::NoLoad && data.queue() {
            self.spawn_load(data.clone());
        }

        Asset::from_data(data, load_behavior)
    }

    /// Blocks current thread until the loading process of `asset` finished, and returns its
    /// final status.
    pub fn block_until_load_complete(&self, asset: &Asset) -> AssetStatus {
        asset
            .data()
            .map(|data| data.wait())
            .unwrap_or(AssetStatus::NotLoaded)
    }

    /// Gets the number of assets alive in this manager.
    pub fn len(&self) -> usize {
        let mut assets = self.assets.lock().unwrap();
        assets.retain(|_, v| v.upgrade().is_some());
        assets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the number of entries of the live table, dead ones included.
    pub(crate) fn table_len(&self) -> usize {
        self.assets.lock().unwrap().len()
    }

    fn find_or_insert(&self, id: AssetId, asset_type: AssetType) -> Arc<AssetData> {
        let mut assets = self.assets.lock().unwrap();
        if let Some(data) = assets.get(&id).and_then(Weak::upgrade) {
            return data;
        }

        let data = Arc::new(AssetData::new(id, asset_type));
        assets.insert(id, Arc::downgrade(&data));
        data
    }

    fn spawn_load(&self, data: Arc<AssetData>) {
        let (id, asset_type) = (data.id(), data.asset_type());

        let handler = self.handlers.read().unwrap().get(&asset_type).cloned();
        let handler = match handler {
            Some(handler) => handler,
            None => {
                warn!(
                    "[AssetManager] could not load asset {}, no handler for type {}.",
                    id, asset_type
                );
                data.set_error();
                return;
            }
        };

        if self.loaders.len() == 0 {
            warn!("[AssetManager] could not load asset {}, no loader is running.", id);
            data.set_error();
            return;
        }

        self.loaders.spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| handler.load(id, asset_type)));
            match result {
                Ok(Ok(bytes)) => data.set_ready(bytes.into()),
                Ok(Err(err)) => {
                    warn!("[AssetManager] failed to load asset {}. {}", id, err);
                    data.set_error();
                }
                Err(_) => {
                    warn!("[AssetManager] handler panicked while loading asset {}.", id);
                    data.set_error();
                }
            }
        });
    }
}
