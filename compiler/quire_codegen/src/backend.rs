//! Output targets.

use std::collections::BTreeMap;

use crate::options::GeneratorOptions;
use crate::resources::ResourceSet;
use crate::translator::EmitPhase;

/// Text produced by each emit phase.
pub type Sections = BTreeMap<EmitPhase, String>;

/// Everything a backend needs to frame its output.
#[derive(Debug)]
pub struct Assembly<'a> {
    pub sections: &'a Sections,
    pub resources: &'a ResourceSet,
    pub link_order: &'a [String],
    pub options: &'a GeneratorOptions,
}

impl Assembly<'_> {
    pub fn section(&self, phase: EmitPhase) -> &str {
        self.sections.get(&phase).map_or("", String::as_str)
    }
}

/// A named generator: which phases it runs and how it frames the result.
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    /// Emit phases, in order.
    fn emit_phases(&self) -> &'static [EmitPhase] {
        &[EmitPhase::Body]
    }

    /// Resources every document of this backend needs.
    fn base_resources(&self, _resources: &mut ResourceSet) {}

    /// Frame the emitted sections as a complete document.
    fn assemble(&self, assembly: &Assembly<'_>) -> String;
}
