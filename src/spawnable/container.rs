//! # InMemorySpawnableAssetContainer
//!
//! The container converts prefab templates into spawnable assets which only live in memory.
//! Every product of the processor stack is registered as a live asset under a synthetic
//! identity, and the set of products is remembered under a name chosen by the caller.
//!
//! Every registration made by the container is undone when the entry is removed, cleared, or
//! when the container is deactivated or dropped. The only exception is
//! [`InMemorySpawnableAssetContainer::move_all_in_memory_spawnable_assets`], which hands the
//! entries, and the responsibility to unregister them, over to the caller.

use std::mem;
use std::sync::Arc;

use smallvec::SmallVec;
use uuid::Uuid;

use crate::asset::{Asset, AssetId, AssetInfo, AssetLoadBehavior, AssetStatus, AssetType};
use crate::conversion::context::PrefabProcessorContext;
use crate::conversion::pipeline::PrefabConversionPipeline;
use crate::conversion::profiles::ProcessorStackProfiles;
use crate::prefab::path::PathResolver;
use crate::prefab::{TemplateId, TemplateStore, INVALID_TEMPLATE_ID};
use crate::utils::prelude::FastHashMap;

use super::bridge::AssetRegistry;
use super::errors::{ContainerError, ContainerResult};
use super::format::SPAWNABLE_EXTENSION;

/// The template services resolved at activation.
#[derive(Clone)]
pub struct PrefabServices {
    pub templates: Arc<dyn TemplateStore>,
    pub paths: Arc<dyn PathResolver>,
}

impl PrefabServices {
    pub fn new(templates: Arc<dyn TemplateStore>, paths: Arc<dyn PathResolver>) -> Self {
        PrefabServices { templates, paths }
    }
}

/// The products of one named in-memory spawnable.
#[derive(Debug, Clone)]
pub struct SpawnableAssetData {
    assets: SmallVec<[Asset; 2]>,
    root_index: usize,
    referenced_assets: Vec<Asset>,
}

impl SpawnableAssetData {
    /// Gets the handles of all the products, in the order they were emitted.
    #[inline]
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    #[inline]
    pub fn assets_mut(&mut self) -> &mut [Asset] {
        &mut self.assets
    }

    /// Gets the index of the root spawnable in `assets`.
    #[inline]
    pub fn root_index(&self) -> usize {
        self.root_index
    }

    #[inline]
    pub fn root(&self) -> &Asset {
        &self.assets[self.root_index]
    }

    #[inline]
    pub fn spawnable_asset_id(&self) -> AssetId {
        self.root().id()
    }

    /// Gets the assets referenced by the products which have been requested from the asset
    /// manager. They are kept alive as long as this entry.
    #[inline]
    pub fn referenced_assets(&self) -> &[Asset] {
        &self.referenced_assets
    }
}

pub type SpawnableAssets = FastHashMap<String, SpawnableAssetData>;

pub struct InMemorySpawnableAssetContainer {
    registry: Arc<dyn AssetRegistry>,
    converter: PrefabConversionPipeline,
    services: Option<PrefabServices>,
    stock_profile: String,
    spawnable_assets: SpawnableAssets,
}

impl InMemorySpawnableAssetContainer {
    pub fn new(registry: Arc<dyn AssetRegistry>, profiles: Arc<ProcessorStackProfiles>) -> Self {
        InMemorySpawnableAssetContainer {
            registry,
            converter: PrefabConversionPipeline::new(profiles),
            services: None,
            stock_profile: String::new(),
            spawnable_assets: SpawnableAssets::default(),
        }
    }

    /// Loads the processor stack `profile`, and keeps `services` for the following
    /// conversions. Returns false if the stack could not be loaded.
    pub fn activate(&mut self, profile: &str, services: PrefabServices) -> bool {
        debug_assert!(
            !self.is_activated(),
            "[InMemorySpawnableAssetContainer] is activated already."
        );

        self.services = Some(services);
        self.stock_profile = profile.to_owned();

        if self.converter.load_stack_profile(profile) {
            info!(
                "[InMemorySpawnableAssetContainer] activates with profile '{}'.",
                profile
            );
            true
        } else {
            warn!(
                "[InMemorySpawnableAssetContainer] could not load processor stack '{}'.",
                profile
            );
            false
        }
    }

    /// Removes every in-memory spawnable, and forgets the profile and the services.
    pub fn deactivate(&mut self) {
        if self.is_activated() {
            info!(
                "[InMemorySpawnableAssetContainer] deactivates profile '{}'.",
                self.stock_profile
            );
        }

        self.clear_all_in_memory_spawnable_assets();
        self.converter.unload();
        self.services = None;
        self.stock_profile.clear();
    }

    #[inline]
    pub fn is_activated(&self) -> bool {
        self.converter.is_loaded()
    }

    /// Gets the profile name of the last activation.
    #[inline]
    pub fn stock_profile(&self) -> &str {
        &self.stock_profile
    }

    #[inline]
    pub fn has_in_memory_spawnable_asset(&self, name: &str) -> bool {
        self.spawnable_assets.contains_key(name)
    }

    /// Returns the identity of the root spawnable of `name`, or the invalid identity if there is
    /// no such entry.
    pub fn in_memory_spawnable_asset_id(&self, name: &str) -> AssetId {
        self.spawnable_assets
            .get(name)
            .map(|v| v.spawnable_asset_id())
            .unwrap_or_else(AssetId::invalid)
    }

    /// Converts the template `template_id` and stores its products under `name`. Returns the
    /// handle of the root spawnable.
    pub fn create_in_memory_spawnable_asset(
        &mut self,
        template_id: TemplateId,
        name: &str,
        load_referenced_assets: bool,
    ) -> ContainerResult<Asset> {
        let services = self.activated_services(name)?.clone();

        if self.spawnable_assets.contains_key(name) {
            return Err(ContainerError::DuplicateName(format!(
                "Spawnable '{}' already exists in memory.",
                name
            )));
        }

        let template = services.templates.find_template(template_id).ok_or_else(|| {
            ContainerError::TemplateNotFound(format!(
                "Template with id {} could not be found.",
                template_id
            ))
        })?;

        let mut ctx = PrefabProcessorContext::new(Uuid::new_v4());
        ctx.add_prefab(name, template.prefab_dom().clone());
        self.converter.process_prefab(&mut ctx);

        if !ctx.has_completed_successfully() || ctx.processed_objects().is_empty() {
            return Err(ContainerError::ConversionFailed(format!(
                "Failed to convert the prefab '{}' to a spawnable.",
                name
            )));
        }

        let root_id = format!("{}{}", name, SPAWNABLE_EXTENSION);
        let mut assets = SmallVec::<[Asset; 2]>::new();
        let mut referenced_assets = Vec::new();
        let mut root_index = None;
        let mut root_without_data = false;

        for object in ctx.processed_objects_mut().iter_mut() {
            let is_root = object.asset_type() == AssetType::spawnable() && object.id() == root_id;

            let product = match object.release_asset() {
                Some(product) => product,
                None => {
                    warn!(
                        "[InMemorySpawnableAssetContainer] skips product {}, it has no data.",
                        object.id()
                    );
                    root_without_data |= is_root;
                    continue;
                }
            };

            if is_root {
                root_index = Some(assets.len());
            }

            let id = product.id();
            let mut info = AssetInfo::new(id, object.asset_type(), object.id());
            info.size_bytes = product.payload().map(|v| v.len() as u64).unwrap_or(0);
            self.registry.register_asset(id, info);

            // The placeholder owned by the manager is replaced by the produced data.
            let placeholder = self.registry.find_or_create_asset(
                id,
                object.asset_type(),
                AssetLoadBehavior::Default,
            );
            self.registry.assign_asset_data(&product);
            drop(placeholder);

            assets.push(product.with_load_behavior(AssetLoadBehavior::Default));
            referenced_assets.append(object.referenced_assets_mut());
        }

        let root_index = match root_index {
            Some(index) => index,
            None => {
                warn!(
                    "[InMemorySpawnableAssetContainer] rolls back {} products of '{}'.",
                    assets.len(),
                    name
                );

                release_assets(&*self.registry, &mut assets);

                let reason = if root_without_data {
                    "was produced without data"
                } else {
                    "was not produced"
                };

                return Err(ContainerError::RootNotProduced(format!(
                    "Failed to create a spawnable for '{}', {} {}.",
                    name, root_id, reason
                )));
            }
        };

        if load_referenced_assets {
            load_referenced(&*self.registry, &mut referenced_assets);
        }

        let root = assets[root_index].clone();
        info!(
            "[InMemorySpawnableAssetContainer] creates '{}' as {}. (Products: {})",
            name,
            root.id(),
            assets.len()
        );

        self.spawnable_assets.insert(
            name.to_owned(),
            SpawnableAssetData {
                assets,
                root_index,
                referenced_assets,
            },
        );

        Ok(root)
    }

    /// Converts the template loaded from `file_path` and stores its products under `name`.
    pub fn create_in_memory_spawnable_asset_from_path(
        &mut self,
        file_path: &str,
        name: &str,
        load_referenced_assets: bool,
    ) -> ContainerResult<Asset> {
        let template_id = {
            let services = self.activated_services(name)?;
            let relative_path = services.paths.generate_relative_path(file_path);
            let template_id = services.templates.template_id_from_file_path(&relative_path);

            if template_id == INVALID_TEMPLATE_ID {
                return Err(ContainerError::TemplateNotFound(format!(
                    "Template with source path {} could not be found.",
                    relative_path.display()
                )));
            }

            template_id
        };

        self.create_in_memory_spawnable_asset(template_id, name, load_referenced_assets)
    }

    /// Unregisters every product of `name`, and forgets the entry.
    pub fn remove_in_memory_spawnable_asset(&mut self, name: &str) -> ContainerResult<()> {
        let mut entry = self.spawnable_assets.remove(name).ok_or_else(|| {
            ContainerError::NotFound(format!(
                "Spawnable '{}' does not exist in memory.",
                name
            ))
        })?;

        release_assets(&*self.registry, &mut entry.assets);
        info!("[InMemorySpawnableAssetContainer] removes '{}'.", name);
        Ok(())
    }

    /// Unregisters the products of every entry, and empties the table.
    pub fn clear_all_in_memory_spawnable_assets(&mut self) {
        if self.spawnable_assets.is_empty() {
            return;
        }

        let registry = &*self.registry;
        for entry in self.spawnable_assets.values_mut() {
            release_assets(registry, &mut entry.assets);
        }

        info!(
            "[InMemorySpawnableAssetContainer] clears {} spawnables.",
            self.spawnable_assets.len()
        );

        self.spawnable_assets.clear();
    }

    /// Takes the whole table out of this container. Unregistering the products becomes the
    /// responsibility of the caller.
    pub fn move_all_in_memory_spawnable_assets(&mut self) -> SpawnableAssets {
        mem::replace(&mut self.spawnable_assets, SpawnableAssets::default())
    }

    #[inline]
    pub fn all_in_memory_spawnable_assets(&self) -> &SpawnableAssets {
        &self.spawnable_assets
    }

    fn activated_services(&self, name: &str) -> ContainerResult<&PrefabServices> {
        match self.services {
            Some(ref services) if self.is_activated() => Ok(services),
            _ => Err(ContainerError::NotActivated(format!(
                "Could not create '{}', the container is not activated.",
                name
            ))),
        }
    }
}

impl Drop for InMemorySpawnableAssetContainer {
    fn drop(&mut self) {
        self.deactivate();
    }
}

/// Drops the handles of `assets`, and unregisters their identities.
pub fn release_assets(registry: &dyn AssetRegistry, assets: &mut [Asset]) {
    for asset in assets {
        let id = asset.id();
        asset.release();
        registry.unregister_asset(id);
    }
}

/// Requests the referenced assets from the asset manager, and waits for the `PreLoad` ones.
/// All the loads are issued before the first wait.
fn load_referenced(registry: &dyn AssetRegistry, references: &mut [Asset]) {
    for reference in references.iter_mut() {
        if !reference.id().is_valid() {
            error!(
                "[InMemorySpawnableAssetContainer] invalid asset {} found referenced, it is skipped.",
                reference.id()
            );
            continue;
        }

        if reference.load_behavior() == AssetLoadBehavior::NoLoad {
            continue;
        }

        *reference = registry.get_asset(
            reference.id(),
            reference.asset_type(),
            reference.load_behavior(),
        );
    }

    for reference in references.iter() {
        if !reference.id().is_valid() {
            error!(
                "[InMemorySpawnableAssetContainer] invalid asset {} found referenced, it is not waited.",
                reference.id()
            );
            continue;
        }

        if reference.load_behavior() != AssetLoadBehavior::PreLoad {
            continue;
        }

        if registry.block_until_load_complete(reference) == AssetStatus::Error {
            error!(
                "[InMemorySpawnableAssetContainer] could not load referenced asset {}.",
                reference.id()
            );
        }
    }
}
