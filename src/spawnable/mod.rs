//! In-memory spawnable assets.

pub mod bridge;
pub mod container;
pub mod errors;
pub mod format;

pub mod prelude {
    pub use super::bridge::{AssetRegistry, AssetRegistryBridge};
    pub use super::container::{
        InMemorySpawnableAssetContainer, PrefabServices, SpawnableAssetData, SpawnableAssets,
    };
    pub use super::errors::{ContainerError, ContainerResult};
    pub use super::format::{Spawnable, SpawnableEntity, SPAWNABLE_EXTENSION};
}

pub use self::bridge::{AssetRegistry, AssetRegistryBridge};
pub use self::container::{InMemorySpawnableAssetContainer, PrefabServices};
pub use self::errors::ContainerError;
