//! # Spawnable
//!
//! Editor-time conversion of prefab templates into live, runtime-loadable
//! _spawnable_ assets, without ever touching the disk.
//!
//! The pipeline is made of a handful of small pieces:
//!
//! 1. A [`TemplateStore`](prefab::TemplateStore) owns the hierarchical prefab documents, and a
//! [`PathResolver`](prefab::PathResolver) turns raw file paths into the relative paths the store
//! is keyed by.
//! 2. A [`PrefabConversionPipeline`](conversion::PrefabConversionPipeline) runs a named stack of
//! processors over a copy of a document, producing typed and named binary products.
//! 3. An [`AssetRegistry`](spawnable::AssetRegistry) bridges to the host asset catalog and the
//! asset manager, so that every product becomes a live asset under a synthetic identity.
//! 4. The [`InMemorySpawnableAssetContainer`](spawnable::InMemorySpawnableAssetContainer) ties
//! everything together and keeps track of the produced assets by a caller chosen name.
//!
//! ```rust,ignore
//! let mut container = InMemorySpawnableAssetContainer::new(registry, profiles);
//! container.activate("IntegrationTests", services);
//!
//! let root = container.create_in_memory_spawnable_asset(template, "Hero", true)?;
//! assert_eq!(container.in_memory_spawnable_asset_id("Hero"), root.id());
//!
//! container.remove_in_memory_spawnable_asset("Hero")?;
//! ```

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

pub use uuid;

pub mod errors;
pub mod utils;

pub mod asset;
pub mod conversion;
pub mod prefab;
pub mod spawnable;

pub mod prelude {
    pub use crate::asset::prelude::*;
    pub use crate::conversion::prelude::*;
    pub use crate::prefab::prelude::*;
    pub use crate::spawnable::prelude::*;
}
