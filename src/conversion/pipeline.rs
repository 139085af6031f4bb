use std::sync::Arc;

use super::context::PrefabProcessorContext;
use super::profiles::ProcessorStackProfiles;

/// A stage of the processor stack.
pub trait PrefabProcessor: Send {
    fn name(&self) -> &str;

    /// Transforms the documents of `ctx`, or emits products into it. Failures are reported
    /// with `PrefabProcessorContext::error_encountered`.
    fn process(&mut self, ctx: &mut PrefabProcessorContext);
}

/// Runs the processors of a named profile, in order, over a conversion context.
pub struct PrefabConversionPipeline {
    profiles: Arc<ProcessorStackProfiles>,
    processors: Vec<Box<dyn PrefabProcessor>>,
    profile: Option<String>,
}

impl PrefabConversionPipeline {
    pub fn new(profiles: Arc<ProcessorStackProfiles>) -> Self {
        PrefabConversionPipeline {
            profiles,
            processors: Vec::new(),
            profile: None,
        }
    }

    /// Instantiates the processors of profile `name`, replacing the loaded ones. Returns false
    /// if the profile could not be built, the pipeline is left unloaded in that case.
    pub fn load_stack_profile(&mut self, name: &str) -> bool {
        self.unload();

        match self.profiles.build(name) {
            Ok(processors) => {
                info!(
                    "[PrefabConversionPipeline] loads profile '{}'. (Processors: {})",
                    name,
                    processors.len()
                );

                self.processors = processors;
                self.profile = Some(name.to_owned());
                true
            }
            Err(err) => {
                warn!(
                    "[PrefabConversionPipeline] could not load profile '{}'. {}",
                    name, err
                );
                false
            }
        }
    }

    pub fn unload(&mut self) {
        self.processors.clear();
        self.profile = None;
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.profile.is_some()
    }

    #[inline]
    pub fn profile_name(&self) -> Option<&str> {
        self.profile.as_ref().map(|v| v.as_str())
    }

    /// Gets the names of the loaded processors, in execution order.
    pub fn processor_names(&self) -> Vec<&str> {
        self.processors.iter().map(|v| v.name()).collect()
    }

    /// Runs every loaded processor over `ctx`. The context is marked completed only if none of
    /// them reported an error.
    pub fn process_prefab(&mut self, ctx: &mut PrefabProcessorContext) {
        if !self.is_loaded() {
            ctx.error_encountered("No processor stack profile has been loaded.");
            ctx.set_completed(false);
            return;
        }

        for processor in &mut self.processors {
            debug!("[PrefabConversionPipeline] runs processor '{}'.", processor.name());
            processor.process(ctx);
        }

        let completed = !ctx.has_errors();
        ctx.set_completed(completed);
    }
}
