//! Identities, load policies and managed handles of live assets.
//!
//! # Identity
//!
//! Every asset known to the [`AssetCatalog`](catalog::AssetCatalog) or the
//! [`AssetManager`](manager::AssetManager) is addressed by an [`AssetId`], a pair of a guid and a
//! sub id. A source file can produce several products, they usually share the guid of the source
//! and are told apart by their sub ids.
//!
//! # Ownership & Lifetime
//!
//! An [`Asset`] is a reference-counted handle to the shared data of an asset. Cloning a handle
//! is cheap and increases the reference count by 1. The asset manager only keeps a weak
//! reference, so when the last handle is released (or dropped) the asset disappears from the
//! manager's live table.
//!
//! A handle could also be a bare _reference_, which only knows the identity, the type and the
//! load behavior of an asset without holding any data. That is what documents store, and what
//! the manager turns into a live handle when loading.

pub mod catalog;
pub mod manager;
mod worker;

pub mod prelude {
    pub use super::catalog::AssetCatalog;
    pub use super::manager::{AssetHandler, AssetManager};
    pub use super::{Asset, AssetId, AssetInfo, AssetLoadBehavior, AssetStatus, AssetType};
}

use std::fmt;
use std::sync::{Arc, Condvar, Mutex};

use uuid::Uuid;

/// A process-wide unique identity of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId {
    pub guid: Uuid,
    pub sub_id: u32,
}

impl AssetId {
    #[inline]
    pub fn new(guid: Uuid, sub_id: u32) -> Self {
        AssetId { guid, sub_id }
    }

    /// Constructs the sentinel identity, which never refers to an asset.
    #[inline]
    pub fn invalid() -> Self {
        AssetId {
            guid: Uuid::nil(),
            sub_id: 0,
        }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        !self.guid.is_nil()
    }
}

impl Default for AssetId {
    fn default() -> Self {
        AssetId::invalid()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{}}}:{:x}", self.guid.to_hyphenated(), self.sub_id)
    }
}

/// The type tag of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetType(pub Uuid);

impl AssetType {
    #[inline]
    pub fn new(uuid: Uuid) -> Self {
        AssetType(uuid)
    }

    /// The type of unknown assets.
    #[inline]
    pub fn nil() -> Self {
        AssetType(Uuid::nil())
    }

    /// The type of spawnable products.
    #[inline]
    pub fn spawnable() -> Self {
        AssetType(Uuid::from_u128(0x855e_3021_d305_4845_b284_20c3_f7fd_f16b))
    }

    #[inline]
    pub fn is_nil(self) -> bool {
        self.0.is_nil()
    }
}

impl Default for AssetType {
    fn default() -> Self {
        AssetType::nil()
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{}}}", self.0.to_hyphenated())
    }
}

/// Policy controlling whether and how eagerly a referenced asset is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetLoadBehavior {
    /// The reference is never loaded automatically.
    NoLoad,
    /// The load is queued, but nobody waits for it.
    Default,
    /// The load is queued, and the owner blocks until it completes.
    PreLoad,
}

impl Default for AssetLoadBehavior {
    fn default() -> Self {
        AssetLoadBehavior::Default
    }
}

/// The catalog record of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub id: AssetId,
    pub asset_type: AssetType,
    pub relative_path: String,
    pub size_bytes: u64,
}

impl AssetInfo {
    pub fn new<T: Into<String>>(id: AssetId, asset_type: AssetType, relative_path: T) -> Self {
        AssetInfo {
            id,
            asset_type,
            relative_path: relative_path.into(),
            size_bytes: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetStatus {
    /// Nobody requested the data yet.
    NotLoaded,
    /// A background load is in flight.
    Queued,
    Ready,
    Error,
}

/// The shared, thread-safe state of one asset.
pub(crate) struct AssetData {
    id: AssetId,
    asset_type: AssetType,
    m: Mutex<AssetState>,
    v: Condvar,
}

struct AssetState {
    status: AssetStatus,
    payload: Option<Arc<[u8]>>,
}

impl AssetData {
    pub(crate) fn new(id: AssetId, asset_type: AssetType) -> Self {
        AssetData {
            id,
            asset_type,
            m: Mutex::new(AssetState {
                status: AssetStatus::NotLoaded,
                payload: None,
            }),
            v: Condvar::new(),
        }
    }

    pub(crate) fn with_payload(id: AssetId, asset_type: AssetType, payload: Arc<[u8]>) -> Self {
        let data = AssetData::new(id, asset_type);
        data.set_ready(payload);
        data
    }

    #[inline]
    pub(crate) fn id(&self) -> AssetId {
        self.id
    }

    #[inline]
    pub(crate) fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    #[inline]
    pub(crate) fn status(&self) -> AssetStatus {
        self.m.lock().unwrap().status
    }

    #[inline]
    pub(crate) fn payload(&self) -> Option<Arc<[u8]>> {
        self.m.lock().unwrap().payload.clone()
    }

    /// Moves a not loaded asset into the `Queued` state. Returns false if the asset has been
    /// queued, loaded or failed already.
    pub(crate) fn queue(&self) -> bool {
        let mut guard = self.m.lock().unwrap();
        if guard.status != AssetStatus::NotLoaded {
            return false;
        }

        guard.status = AssetStatus::Queued;
        true
    }

    pub(crate) fn set_ready(&self, payload: Arc<[u8]>) {
        {
            let mut guard = self.m.lock().unwrap();
            guard.status = AssetStatus::Ready;
            guard.payload = Some(payload);
        }

        self.v.notify_all();
    }

    pub(crate) fn set_error(&self) {
        {
            let mut guard = self.m.lock().unwrap();
            guard.status = AssetStatus::Error;
            guard.payload = None;
        }

        self.v.notify_all();
    }

    /// Blocks current thread until the in-flight load of this asset finished.
    pub(crate) fn wait(&self) -> AssetStatus {
        let mut guard = self.m.lock().unwrap();
        while guard.status == AssetStatus::Queued {
            guard = self.v.wait(guard).unwrap();
        }

        guard.status
    }
}

/// A managed handle to an asset.
#[derive(Clone)]
pub struct Asset {
    id: AssetId,
    asset_type: AssetType,
    load_behavior: AssetLoadBehavior,
    data: Option<Arc<AssetData>>,
}

impl Asset {
    /// Creates a bare reference to an asset, which holds no data.
    pub fn reference(id: AssetId, asset_type: AssetType, load_behavior: AssetLoadBehavior) -> Self {
        Asset {
            id,
            asset_type,
            load_behavior,
            data: None,
        }
    }

    /// Creates a handle owning freshly produced, ready to use data.
    pub fn from_payload<T>(id: AssetId, asset_type: AssetType, payload: T) -> Self
    where
        T: Into<Arc<[u8]>>,
    {
        let data = AssetData::with_payload(id, asset_type, payload.into());
        Asset::from_data(Arc::new(data), AssetLoadBehavior::Default)
    }

    pub(crate) fn from_data(data: Arc<AssetData>, load_behavior: AssetLoadBehavior) -> Self {
        Asset {
            id: data.id(),
            asset_type: data.asset_type(),
            load_behavior,
            data: Some(data),
        }
    }

    /// Returns this handle with another load behavior.
    #[inline]
    pub fn with_load_behavior(mut self, load_behavior: AssetLoadBehavior) -> Self {
        self.load_behavior = load_behavior;
        self
    }

    #[inline]
    pub fn id(&self) -> AssetId {
        self.id
    }

    #[inline]
    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    #[inline]
    pub fn load_behavior(&self) -> AssetLoadBehavior {
        self.load_behavior
    }

    /// Gets the load status of the underlying data. Bare references are always `NotLoaded`.
    #[inline]
    pub fn status(&self) -> AssetStatus {
        self.data
            .as_ref()
            .map(|v| v.status())
            .unwrap_or(AssetStatus::NotLoaded)
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.status() == AssetStatus::Ready
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.status() == AssetStatus::Error
    }

    /// Returns the bytes of the asset if it has been loaded.
    #[inline]
    pub fn payload(&self) -> Option<Arc<[u8]>> {
        self.data.as_ref().and_then(|v| v.payload())
    }

    /// Returns true if this handle holds a share of the asset data.
    #[inline]
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Drops the ownership this handle has on the asset data. The identity, type and load
    /// behavior are kept.
    #[inline]
    pub fn release(&mut self) {
        self.data = None;
    }

    /// Gets the number of handles sharing the data of this asset.
    #[inline]
    pub fn use_count(&self) -> usize {
        self.data.as_ref().map(Arc::strong_count).unwrap_or(0)
    }

    #[inline]
    pub(crate) fn data(&self) -> Option<&Arc<AssetData>> {
        self.data.as_ref()
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Asset")
            .field("id", &self.id)
            .field("asset_type", &self.asset_type)
            .field("load_behavior", &self.load_behavior)
            .field("status", &self.status())
            .finish()
    }
}
