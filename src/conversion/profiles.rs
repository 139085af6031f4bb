//! Named processor stacks, configured in code or from JSON.
//!
//! ```json
//! {
//!     "profiles": {
//!         "IntegrationTests": ["EditorOnlyEntityRemover", "SpawnableProductCreator"],
//!         "Bare": ["SpawnableProductCreator"]
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::io::Read;

use crate::errors::*;
use crate::utils::prelude::FastHashMap;

use super::pipeline::PrefabProcessor;
use super::processors::{EditorOnlyEntityRemover, SpawnableProductCreator};

/// The profile used to produce assets for automated tests.
pub const INTEGRATION_TESTS: &str = "IntegrationTests";
/// The profile used to produce assets for play sessions inside the editor.
pub const PLAY_IN_EDITOR: &str = "PlayInEditor";

type ProcessorFactory = Box<dyn Fn() -> Box<dyn PrefabProcessor> + Send + Sync>;

#[derive(Deserialize)]
struct ProfilesConfig {
    profiles: BTreeMap<String, Vec<String>>,
}

/// The registry of processor factories and of the profiles made of them.
#[derive(Default)]
pub struct ProcessorStackProfiles {
    factories: FastHashMap<String, ProcessorFactory>,
    profiles: FastHashMap<String, Vec<String>>,
}

impl ProcessorStackProfiles {
    pub fn new() -> Self {
        ProcessorStackProfiles::default()
    }

    /// Creates a registry with the built-in processors, and the `IntegrationTests` and
    /// `PlayInEditor` profiles.
    pub fn with_defaults() -> Self {
        let mut profiles = ProcessorStackProfiles::new();
        profiles.register_processor(EditorOnlyEntityRemover::NAME, || {
            Box::new(EditorOnlyEntityRemover::new())
        });

        profiles.register_processor(SpawnableProductCreator::NAME, || {
            Box::new(SpawnableProductCreator::new())
        });

        let stack = [EditorOnlyEntityRemover::NAME, SpawnableProductCreator::NAME];
        profiles.add_profile(INTEGRATION_TESTS, &stack);
        profiles.add_profile(PLAY_IN_EDITOR, &stack);
        profiles
    }

    /// Add or replace the factory of processor `name`.
    pub fn register_processor<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn PrefabProcessor> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_owned(), Box::new(factory));
    }

    #[inline]
    pub fn has_processor(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Add or replace profile `name`. The processors are resolved when the profile is built.
    pub fn add_profile<T: AsRef<str>>(&mut self, name: &str, processors: &[T]) {
        let processors = processors.iter().map(|v| v.as_ref().to_owned()).collect();
        self.profiles.insert(name.to_owned(), processors);
    }

    /// Reads profiles from a JSON document, and returns the number of profiles added. Nothing
    /// is added if any profile refers to an unregistered processor.
    pub fn load_config(&mut self, file: &mut dyn Read) -> Result<usize> {
        let config: ProfilesConfig = serde_json::from_reader(file)?;

        for (name, processors) in &config.profiles {
            for processor in processors {
                if !self.has_processor(processor) {
                    bail!(
                        "Processor '{}' of profile '{}' is not registered.",
                        processor,
                        name
                    );
                }
            }
        }

        let len = config.profiles.len();
        for (name, processors) in config.profiles {
            info!(
                "[ProcessorStackProfiles] adds profile '{}'. (Processors: {:?})",
                name, processors
            );
            self.profiles.insert(name, processors);
        }

        Ok(len)
    }

    #[inline]
    pub fn has_profile(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    #[inline]
    pub fn profile(&self, name: &str) -> Option<&[String]> {
        self.profiles.get(name).map(|v| v.as_slice())
    }

    /// Instantiates the processors of profile `name`.
    pub fn build(&self, name: &str) -> Result<Vec<Box<dyn PrefabProcessor>>> {
        let processors = self
            .profiles
            .get(name)
            .ok_or_else(|| format_err!("Profile '{}' is not defined.", name))?;

        processors
            .iter()
            .map(|v| {
                self.factories
                    .get(v)
                    .map(|factory| factory())
                    .ok_or_else(|| format_err!("Processor '{}' is not registered.", v))
            })
            .collect()
    }
}
