//! # Processor Stack
//!
//! The processor stack converts prefab documents into typed, named binary products. It is an
//! ordered list of [`PrefabProcessor`](pipeline::PrefabProcessor)s, configured by a named
//! profile of the [`ProcessorStackProfiles`](profiles::ProcessorStackProfiles) registry.
//!
//! Every conversion happens in a fresh [`PrefabProcessorContext`](context::PrefabProcessorContext),
//! which owns copies of the input documents, collects the products, and records whether all
//! the processors succeeded.

pub mod context;
pub mod pipeline;
pub mod processors;
pub mod profiles;

pub mod prelude {
    pub use super::context::{PrefabProcessorContext, ProcessedObject};
    pub use super::pipeline::{PrefabConversionPipeline, PrefabProcessor};
    pub use super::processors::{EditorOnlyEntityRemover, SpawnableProductCreator};
    pub use super::profiles::{ProcessorStackProfiles, INTEGRATION_TESTS, PLAY_IN_EDITOR};
}

pub use self::context::{PrefabProcessorContext, ProcessedObject};
pub use self::pipeline::{PrefabConversionPipeline, PrefabProcessor};
pub use self::profiles::ProcessorStackProfiles;
