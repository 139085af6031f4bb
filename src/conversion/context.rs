use uuid::Uuid;

use crate::asset::{Asset, AssetId, AssetType};
use crate::prefab::PrefabDom;
use crate::utils::prelude::hash32;

/// A typed, named product emitted by the processor stack.
#[derive(Debug)]
pub struct ProcessedObject {
    asset_type: AssetType,
    id: String,
    asset: Option<Asset>,
    referenced_assets: Vec<Asset>,
}

impl ProcessedObject {
    pub fn new<T: Into<String>>(asset_type: AssetType, id: T, asset: Asset) -> Self {
        ProcessedObject {
            asset_type,
            id: id.into(),
            asset: Some(asset),
            referenced_assets: Vec::new(),
        }
    }

    pub fn with_referenced_assets(mut self, referenced_assets: Vec<Asset>) -> Self {
        self.referenced_assets = referenced_assets;
        self
    }

    #[inline]
    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    /// The path-like identifier of this product, e.g. `Hero.spawnable`.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn asset(&self) -> Option<&Asset> {
        self.asset.as_ref()
    }

    /// Hands over the ownership of the payload to the caller.
    #[inline]
    pub fn release_asset(&mut self) -> Option<Asset> {
        self.asset.take()
    }

    #[inline]
    pub fn referenced_assets(&self) -> &[Asset] {
        &self.referenced_assets
    }

    #[inline]
    pub fn referenced_assets_mut(&mut self) -> &mut Vec<Asset> {
        &mut self.referenced_assets
    }
}

/// The state of one conversion. It is created for a single call, and never shared.
#[derive(Debug)]
pub struct PrefabProcessorContext {
    scope_id: Uuid,
    prefabs: Vec<(String, PrefabDom)>,
    processed: Vec<ProcessedObject>,
    completed: bool,
    errors: Vec<String>,
}

impl PrefabProcessorContext {
    pub fn new(scope_id: Uuid) -> Self {
        PrefabProcessorContext {
            scope_id,
            prefabs: Vec::new(),
            processed: Vec::new(),
            completed: false,
            errors: Vec::new(),
        }
    }

    /// The identifier every product identity of this conversion is derived from.
    #[inline]
    pub fn scope_id(&self) -> Uuid {
        self.scope_id
    }

    /// Adds a document to convert. Returns false if `name` has been added already.
    pub fn add_prefab<T: Into<String>>(&mut self, name: T, dom: PrefabDom) -> bool {
        let name = name.into();
        if self.prefabs.iter().any(|(v, _)| *v == name) {
            return false;
        }

        self.prefabs.push((name, dom));
        true
    }

    #[inline]
    pub fn prefabs(&self) -> &[(String, PrefabDom)] {
        &self.prefabs
    }

    #[inline]
    pub fn prefabs_mut(&mut self) -> &mut [(String, PrefabDom)] {
        &mut self.prefabs
    }

    #[inline]
    pub fn add_processed_object(&mut self, object: ProcessedObject) {
        self.processed.push(object);
    }

    #[inline]
    pub fn processed_objects(&self) -> &[ProcessedObject] {
        &self.processed
    }

    #[inline]
    pub fn processed_objects_mut(&mut self) -> &mut Vec<ProcessedObject> {
        &mut self.processed
    }

    /// Derives the identity of product `product_id` of this conversion.
    #[inline]
    pub fn product_asset_id(&self, product_id: &str) -> AssetId {
        AssetId::new(self.scope_id, hash32(product_id))
    }

    /// Records a failure of one of the processors. A context with errors never completes.
    pub fn error_encountered<T: Into<String>>(&mut self, message: T) {
        let message = message.into();
        warn!("[PrefabProcessorContext] {}", message);
        self.errors.push(message);
    }

    #[inline]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    #[inline]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[inline]
    pub fn has_completed_successfully(&self) -> bool {
        self.completed && !self.has_errors()
    }

    #[inline]
    pub(crate) fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }
}
