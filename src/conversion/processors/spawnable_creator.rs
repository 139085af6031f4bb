use std::convert::TryFrom;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::asset::{Asset, AssetId, AssetLoadBehavior, AssetType};
use crate::conversion::context::{PrefabProcessorContext, ProcessedObject};
use crate::conversion::pipeline::PrefabProcessor;
use crate::prefab::PrefabDom;
use crate::spawnable::format::{Spawnable, SPAWNABLE_EXTENSION};
use crate::utils::prelude::FastHashSet;

/// Emits one spawnable product per prefab of the context, named `<prefab>.spawnable`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpawnableProductCreator {}

impl SpawnableProductCreator {
    pub const NAME: &'static str = "SpawnableProductCreator";

    pub fn new() -> Self {
        SpawnableProductCreator {}
    }
}

impl PrefabProcessor for SpawnableProductCreator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn process(&mut self, ctx: &mut PrefabProcessorContext) {
        let mut products = Vec::new();
        let mut errors = Vec::new();

        for (name, dom) in ctx.prefabs() {
            let product_id = format!("{}{}", name, SPAWNABLE_EXTENSION);

            match Spawnable::from_prefab_dom(dom).and_then(|v| v.encode()) {
                Ok(bytes) => {
                    let id = ctx.product_asset_id(&product_id);
                    let asset = Asset::from_payload(id, AssetType::spawnable(), bytes);
                    let referenced_assets = referenced_assets(dom);

                    info!(
                        "[SpawnableProductCreator] creates {} as {}. (References: {})",
                        product_id,
                        id,
                        referenced_assets.len()
                    );

                    let object = ProcessedObject::new(AssetType::spawnable(), product_id, asset)
                        .with_referenced_assets(referenced_assets);
                    products.push(object);
                }
                Err(err) => {
                    errors.push(format!("Could not create {}. {}", product_id, err));
                }
            }
        }

        for object in products {
            ctx.add_processed_object(object);
        }

        for err in errors {
            ctx.error_encountered(err);
        }
    }
}

/// Collects the distinct asset references found anywhere in `dom`.
pub fn referenced_assets(dom: &PrefabDom) -> Vec<Asset> {
    let mut visited = FastHashSet::default();
    let mut assets = Vec::new();
    collect(dom, &mut visited, &mut assets);
    assets
}

fn collect(v: &Value, visited: &mut FastHashSet<AssetId>, assets: &mut Vec<Asset>) {
    match v {
        Value::Object(map) => {
            if let Some(asset) = parse_asset_reference(map) {
                if visited.insert(asset.id()) {
                    assets.push(asset);
                }

                return;
            }

            for child in map.values() {
                collect(child, visited, assets);
            }
        }
        Value::Array(array) => {
            for child in array {
                collect(child, visited, assets);
            }
        }
        _ => {}
    }
}

fn parse_asset_reference(map: &Map<String, Value>) -> Option<Asset> {
    let asset_id = map.get("assetId")?.as_object()?;

    let guid = asset_id
        .get("guid")
        .and_then(Value::as_str)
        .and_then(parse_uuid)
        .unwrap_or_else(Uuid::nil);

    let sub_id = asset_id.get("subId").and_then(Value::as_u64).unwrap_or(0);
    let id = match u32::try_from(sub_id) {
        Ok(sub_id) if !guid.is_nil() => AssetId::new(guid, sub_id),
        _ => AssetId::invalid(),
    };

    let asset_type = map
        .get("assetType")
        .and_then(Value::as_str)
        .and_then(parse_uuid)
        .map(AssetType)
        .unwrap_or_default();

    let load_behavior = map
        .get("loadBehavior")
        .and_then(|v| serde_json::from_value::<AssetLoadBehavior>(v.clone()).ok())
        .unwrap_or_default();

    Some(Asset::reference(id, asset_type, load_behavior))
}

fn parse_uuid(v: &str) -> Option<Uuid> {
    Uuid::parse_str(v.trim_matches(&['{', '}'][..])).ok()
}
