use serde_json::Value;

use crate::conversion::context::PrefabProcessorContext;
use crate::conversion::pipeline::PrefabProcessor;
use crate::prefab::PrefabDom;

/// Removes the entities which only make sense inside the editor, from the prefab and from
/// all its nested instances. The container entity is always kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct EditorOnlyEntityRemover {}

impl EditorOnlyEntityRemover {
    pub const NAME: &'static str = "EditorOnlyEntityRemover";

    pub fn new() -> Self {
        EditorOnlyEntityRemover {}
    }
}

impl PrefabProcessor for EditorOnlyEntityRemover {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn process(&mut self, ctx: &mut PrefabProcessorContext) {
        for (name, dom) in ctx.prefabs_mut() {
            let removed = remove_editor_only_entities(dom);
            if removed > 0 {
                info!(
                    "[EditorOnlyEntityRemover] removes {} entities from '{}'.",
                    removed, name
                );
            }
        }
    }
}

/// Checks if any component of `entity` is flagged with `"IsEditorOnly": true`.
pub fn is_editor_only(entity: &PrefabDom) -> bool {
    entity
        .get("Components")
        .and_then(Value::as_object)
        .map(|components| {
            components
                .values()
                .any(|v| v.get("IsEditorOnly").and_then(Value::as_bool) == Some(true))
        })
        .unwrap_or(false)
}

fn remove_editor_only_entities(instance: &mut PrefabDom) -> usize {
    let mut removed = 0;

    if let Some(entities) = instance.get_mut("Entities").and_then(Value::as_object_mut) {
        let aliases: Vec<_> = entities
            .iter()
            .filter(|(_, v)| is_editor_only(v))
            .map(|(k, _)| k.clone())
            .collect();

        for alias in aliases {
            entities.remove(&alias);
            removed += 1;
        }
    }

    if let Some(instances) = instance.get_mut("Instances").and_then(Value::as_object_mut) {
        for (_, nested) in instances.iter_mut() {
            removed += remove_editor_only_entities(nested);
        }
    }

    removed
}
