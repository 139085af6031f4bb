//! # Variable Overrides
//!
//! A graph could expose some of its variables as _component properties_, whose values are
//! chosen per instance by the component running the graph, e.g. inside a prefab. The
//! [`BuildVariableOverrides`] collects these properties at build time from the parsed graph
//! and its dependencies, and [`convert_to_runtime`] turns them into the data shipped with the
//! spawnable.
//!
//! When a graph is parsed again, the values the user overrode before could be carried over
//! with [`BuildVariableOverrides::copy_previous_overridden_values`], as long as the variables
//! still exist with the same type.

use std::fmt;
use std::path::{Path, PathBuf};

use spawnable::asset::{Asset, AssetId, AssetLoadBehavior, AssetType};
use spawnable::uuid::Uuid;

use super::grammar::AbstractCodeModel;
use super::variable::{Datum, GraphVariable, VariableData, VariableId};
use super::Result;

/// The sub id of the runtime asset produced from a graph.
pub const RUNTIME_DATA_SUB_ID: u32 = 1;

/// The type of the runtime assets produced from graphs.
pub fn runtime_asset_type() -> AssetType {
    AssetType::new(Uuid::from_u128(0x3e2a_c8cd_713f_453e_967f_2951_7f33_1784))
}

/// Identifies the source file of a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceHandle {
    id: Uuid,
    path: PathBuf,
}

impl SourceHandle {
    pub fn new<T: Into<PathBuf>>(id: Uuid, path: T) -> Self {
        SourceHandle {
            id,
            path: path.into(),
        }
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.id.is_nil()
    }
}

impl fmt::Display for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.path.display(), self.id.to_hyphenated())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildVariableOverrides {
    /// The graph these overrides belong to.
    pub source: SourceHandle,
    /// The overridable variables of the graph, excluding entity references.
    pub variables: Vec<GraphVariable>,
    /// The entity references of the graph, which are always overridden.
    pub entity_ids: Vec<(VariableId, u64)>,
    /// The variables exposed to the user for editing.
    pub overrides: Vec<GraphVariable>,
    /// The component properties declared by the graph but unused by it.
    pub overrides_unused: Vec<GraphVariable>,
    /// The overrides of the graphs this graph depends on.
    pub dependencies: Vec<BuildVariableOverrides>,
}

impl BuildVariableOverrides {
    pub fn clear(&mut self) {
        self.source = SourceHandle::default();
        self.variables.clear();
        self.entity_ids.clear();
        self.overrides.clear();
        self.overrides_unused.clear();
        self.dependencies.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
            && self.entity_ids.is_empty()
            && self.overrides.is_empty()
            && self.overrides_unused.is_empty()
            && self.dependencies.is_empty()
    }

    /// Keeps the values overridden in `source` for the variables which still exist with the
    /// same type. Dependencies are matched by their source graph.
    pub fn copy_previous_overridden_values(&mut self, source: &BuildVariableOverrides) {
        copy_data(&mut self.variables, &source.variables);
        copy_data(&mut self.overrides, &source.overrides);
        copy_data(&mut self.overrides_unused, &source.overrides_unused);

        for (id, entity) in &mut self.entity_ids {
            if let Some(&(_, prev)) = source.entity_ids.iter().find(|(v, _)| *v == *id) {
                *entity = prev;
            }
        }

        for dependency in &mut self.dependencies {
            let prev = source
                .dependencies
                .iter()
                .find(|v| v.source == dependency.source);

            if let Some(prev) = prev {
                dependency.copy_previous_overridden_values(prev);
            }
        }
    }

    /// Collects the component properties of `variables` which are used by the parsed graph.
    /// Entity references go to `entity_ids`, everything else to `variables` and `overrides`.
    /// The component properties the graph does not use go to `overrides_unused`.
    pub fn populate_from_parsed_results(
        &mut self,
        model: &AbstractCodeModel,
        variables: &VariableData,
    ) {
        for parsed in model.variables() {
            let variable = match variables.find_variable(parsed.source_variable_id) {
                Some(variable) if variable.is_component_property() => variable,
                _ => continue,
            };

            if let Datum::EntityId(entity) = *variable.datum() {
                self.entity_ids.push((variable.id(), entity));
            } else {
                self.variables.push(variable.clone());
                self.overrides.push(variable.clone());
            }
        }

        for variable in variables.variables() {
            if variable.is_component_property() && !model.is_used(variable.id()) {
                self.overrides_unused.push(variable.clone());
            }
        }

        debug!(
            "[BuildVariableOverrides] populates {}. (Variables: {}, EntityIds: {}, Unused: {})",
            self.source,
            self.variables.len(),
            self.entity_ids.len(),
            self.overrides_unused.len()
        );
    }
}

fn copy_data(dst: &mut [GraphVariable], src: &[GraphVariable]) {
    for variable in dst {
        let prev = src
            .iter()
            .find(|v| v.id() == variable.id() && v.data_type() == variable.data_type());

        if let Some(prev) = prev {
            variable.set_datum(prev.datum().clone());
        }
    }
}

/// The overrides of a graph, as consumed at runtime.
#[derive(Debug, Clone)]
pub struct RuntimeDataOverrides {
    /// The runtime asset of the graph. It must be loaded before the graph could run.
    pub runtime_asset: Asset,
    /// The overridden values, in the order of the overridden variables.
    pub variables: Vec<Datum>,
    /// Tells, for every variable of the graph, whether it has been overridden.
    pub variable_indices: Vec<bool>,
    pub entity_ids: Vec<u64>,
    pub dependencies: Vec<RuntimeDataOverrides>,
}

/// Copies the variables overridden at build time into runtime data.
pub fn convert_to_runtime(overrides: &BuildVariableOverrides) -> RuntimeDataOverrides {
    let runtime_asset = Asset::reference(
        AssetId::new(overrides.source.id(), RUNTIME_DATA_SUB_ID),
        runtime_asset_type(),
        AssetLoadBehavior::PreLoad,
    );

    let mut variables = Vec::new();
    let mut variable_indices = Vec::with_capacity(overrides.variables.len());

    for variable in &overrides.variables {
        match overrides.overrides.iter().find(|v| v.id() == variable.id()) {
            Some(v) => {
                variables.push(v.datum().clone());
                variable_indices.push(true);
            }
            None => variable_indices.push(false),
        }
    }

    RuntimeDataOverrides {
        runtime_asset,
        variables,
        variable_indices,
        entity_ids: overrides.entity_ids.iter().map(|&(_, v)| v).collect(),
        dependencies: overrides
            .dependencies
            .iter()
            .map(convert_to_runtime)
            .collect(),
    }
}

/// A graph together with the graphs it depends on, as loaded in the editor.
#[derive(Debug, Clone, Default)]
pub struct EditorAssetTree {
    pub source: SourceHandle,
    pub variables: VariableData,
    /// The parse result of the graph, or `None` if it could not be parsed.
    pub parsed: Option<AbstractCodeModel>,
    pub dependencies: Vec<EditorAssetTree>,
}

/// Builds the overrides of `tree` and of all its dependencies.
pub fn parse_editor_asset_tree(tree: &EditorAssetTree) -> Result<BuildVariableOverrides> {
    if !tree.source.is_valid() {
        bail!("Graph {} has no valid source id.", tree.source);
    }

    let model = tree
        .parsed
        .as_ref()
        .ok_or_else(|| format_err!("Graph {} failed to parse.", tree.source))?;

    let mut result = BuildVariableOverrides::default();
    result.source = tree.source.clone();
    result.populate_from_parsed_results(model, &tree.variables);

    for dependency in &tree.dependencies {
        result
            .dependencies
            .push(parse_editor_asset_tree(dependency)?);
    }

    Ok(result)
}
