//! Extracts the variable overrides of visual-scripting graphs, so that prefabs could carry
//! per-instance values of the graphs they run into their spawnables.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

pub mod grammar;
pub mod overrides;
pub mod variable;

pub mod prelude {
    pub use super::grammar::{AbstractCodeModel, ParsedVariable};
    pub use super::overrides::{convert_to_runtime, parse_editor_asset_tree};
    pub use super::overrides::{
        BuildVariableOverrides, EditorAssetTree, RuntimeDataOverrides, SourceHandle,
    };
    pub use super::variable::{
        DataType, Datum, GraphVariable, InitialValueSource, VariableData, VariableId,
    };
}

pub type Result<T> = ::std::result::Result<T, failure::Error>;
