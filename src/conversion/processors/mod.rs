//! The built-in stages of the processor stack.

pub mod editor_only;
pub mod spawnable_creator;

pub use self::editor_only::EditorOnlyEntityRemover;
pub use self::spawnable_creator::SpawnableProductCreator;
