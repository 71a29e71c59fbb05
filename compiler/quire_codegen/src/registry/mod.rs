//! Type and translator registry.
//!
//! One explicit object holds every table the generators consult:
//!
//! | Table        | Key                        | Conflict policy                 |
//! |--------------|----------------------------|---------------------------------|
//! | creators     | element type               | fail unless `overwrite`         |
//! | translators  | (backend, element type)    | fail unless `overwrite`         |
//! | decoders     | value type                 | at most one, ever               |
//! | functions    | internal / display name    | variants accumulate             |
//! | payloads     | library                    | first wins                      |
//! | dependencies | library                    | first wins                      |
//! | libraries    | library                    | first wins, identical accepted  |
//! | backends     | backend name               | first wins                      |
//!
//! Registration never panics or errors; conflicts return `false` and leave
//! the existing entry intact. Once loading is complete the registry is
//! frozen into a [`SharedRegistry`] and only read.

mod functions;
mod libraries;
mod payload;
mod registrar;

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use quire_tree::{Element, ElementFactory, ValueType};

use crate::backend::Backend;
use crate::decode::Decoder;
use crate::translator::Translator;
use crate::SharedRegistry;

pub use functions::{
    FunctionRecord, FunctionTable, FunctionVariant, Parameter, DEFAULT_CATEGORY,
    DEFAULT_DESCRIPTION,
};
pub use libraries::{LibraryDependency, LibraryKind, LibraryOwner, RuntimeLibrary};
pub use payload::{compress, DeclarationPayload};
pub use registrar::Registrar;

/// Builds a fresh, detached element of one type.
pub type ElementCreator = Arc<dyn Fn() -> Element + Send + Sync>;

#[derive(Default)]
pub struct Registry {
    creators: FxHashMap<String, ElementCreator>,
    /// backend name -> element type -> translator
    translators: FxHashMap<String, FxHashMap<String, &'static dyn Translator>>,
    decoders: [Option<&'static dyn Decoder>; ValueType::COUNT],
    functions: FunctionTable,
    payloads: FxHashMap<String, DeclarationPayload>,
    dependencies: FxHashMap<String, Vec<LibraryDependency>>,
    libraries: FxHashMap<String, RuntimeLibrary>,
    backends: Vec<Arc<dyn Backend>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in element, translator, decoder and
    /// backend.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register(&mut registry);
        registry
    }

    /// End the load phase.
    pub fn freeze(self) -> SharedRegistry<Registry> {
        SharedRegistry::new(self)
    }

    // Element creators

    pub fn register_element_creator(
        &mut self,
        type_name: &str,
        creator: ElementCreator,
        overwrite: bool,
    ) -> bool {
        if !overwrite && self.creators.contains_key(type_name) {
            tracing::debug!(type_name, "element creator already registered");
            return false;
        }
        self.creators.insert(type_name.to_string(), creator);
        true
    }

    pub fn has_element_creator(&self, type_name: &str) -> bool {
        self.creators.contains_key(type_name)
    }

    pub fn create_element(&self, type_name: &str) -> Option<Element> {
        self.creators.get(type_name).map(|create| create())
    }

    /// Registered element types, sorted.
    pub fn element_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.creators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    // Translators

    pub fn register_translator(
        &mut self,
        backend: &str,
        type_name: &str,
        translator: &'static dyn Translator,
        overwrite: bool,
    ) -> bool {
        let table = self.translators.entry(backend.to_string()).or_default();
        if !overwrite && table.contains_key(type_name) {
            tracing::debug!(backend, type_name, "translator already registered");
            return false;
        }
        table.insert(type_name.to_string(), translator);
        true
    }

    /// Absence is not an error here; the engine decides when it is.
    pub fn translator(&self, backend: &str, type_name: &str) -> Option<&'static dyn Translator> {
        self.translators.get(backend)?.get(type_name).copied()
    }

    pub fn has_translator(&self, backend: &str, type_name: &str) -> bool {
        self.translator(backend, type_name).is_some()
    }

    // Decoders

    pub fn register_decoder(&mut self, value_type: ValueType, decoder: &'static dyn Decoder) -> bool {
        let slot = &mut self.decoders[value_type.index()];
        if slot.is_some() {
            tracing::debug!(%value_type, "decoder already registered");
            return false;
        }
        *slot = Some(decoder);
        true
    }

    pub fn decoder(&self, value_type: ValueType) -> Option<&'static dyn Decoder> {
        self.decoders[value_type.index()]
    }

    // Functions

    pub fn register_function(&mut self, record: FunctionRecord) -> bool {
        let internal_name = record.internal_name.clone();
        let accepted = self.functions.insert(record);
        if !accepted {
            tracing::debug!(internal_name, "function conflicts with an existing record");
        }
        accepted
    }

    /// Look up by internal name or display name.
    pub fn function(&self, name: &str) -> Option<&FunctionRecord> {
        self.functions.get(name)
    }

    /// Accumulator for an existing function's variants.
    pub fn function_mut(&mut self, name: &str) -> Option<&mut FunctionRecord> {
        self.functions.get_mut(name)
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    // Declaration payloads

    pub fn register_declaration_payload(
        &mut self,
        library: &str,
        bytes: Vec<u8>,
        compressed: bool,
    ) -> bool {
        if self.payloads.contains_key(library) {
            tracing::debug!(library, "declaration payload already registered");
            return false;
        }
        self.payloads
            .insert(library.to_string(), DeclarationPayload::new(bytes, compressed));
        true
    }

    /// Decompressed payload bytes.
    pub fn payload(&self, library: &str) -> Option<Cow<'_, [u8]>> {
        self.payloads.get(library)?.contents()
    }

    pub fn has_payload(&self, library: &str) -> bool {
        self.payloads.contains_key(library)
    }

    /// Libraries with a payload, sorted.
    pub fn payload_libraries(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.payloads.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    // Runtime libraries and dependencies

    pub fn register_library_dependencies(
        &mut self,
        library: &str,
        dependencies: Vec<LibraryDependency>,
    ) -> bool {
        if self.dependencies.contains_key(library) {
            tracing::debug!(library, "library dependencies already registered");
            return false;
        }
        self.dependencies.insert(library.to_string(), dependencies);
        true
    }

    pub fn library_dependencies(&self, library: &str) -> Option<&[LibraryDependency]> {
        self.dependencies.get(library).map(Vec::as_slice)
    }

    /// Accepts an identical re-registration.
    pub fn register_runtime_library(&mut self, library: RuntimeLibrary) -> bool {
        match self.libraries.get(&library.name) {
            Some(existing) => *existing == library,
            None => {
                self.libraries.insert(library.name.clone(), library);
                true
            }
        }
    }

    pub fn runtime_library(&self, name: &str) -> Option<&RuntimeLibrary> {
        self.libraries.get(name)
    }

    /// Each library before its dependencies, without duplicates.
    pub fn link_order<'a>(&self, roots: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        libraries::link_order(roots, &self.dependencies)
    }

    // Backends

    pub fn register_backend(&mut self, backend: Arc<dyn Backend>) -> bool {
        if self.backend(backend.name()).is_some() {
            tracing::debug!(backend = backend.name(), "backend already registered");
            return false;
        }
        self.backends.push(backend);
        true
    }

    pub fn backend(&self, name: &str) -> Option<Arc<dyn Backend>> {
        self.backends.iter().find(|b| b.name() == name).cloned()
    }

    /// Backend names in registration order.
    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Move every entry of a validated staging registry into this one.
    ///
    /// Staged entries win: the registrar already rejected conflicts that
    /// were not explicit overwrites.
    fn absorb(&mut self, staged: Registry) {
        self.creators.extend(staged.creators);
        for (backend, table) in staged.translators {
            self.translators.entry(backend).or_default().extend(table);
        }
        for (slot, decoder) in self.decoders.iter_mut().zip(staged.decoders) {
            if decoder.is_some() {
                *slot = decoder;
            }
        }
        for record in staged.functions.iter() {
            self.functions.insert(record.clone());
        }
        self.payloads.extend(staged.payloads);
        self.dependencies.extend(staged.dependencies);
        self.libraries.extend(staged.libraries);
        self.backends.extend(staged.backends);
    }
}

impl ElementFactory for Registry {
    fn create_element(&self, type_name: &str) -> Option<Element> {
        Registry::create_element(self, type_name)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("creators", &self.creators.len())
            .field(
                "translators",
                &self.translators.values().map(FxHashMap::len).sum::<usize>(),
            )
            .field(
                "decoders",
                &self.decoders.iter().filter(|d| d.is_some()).count(),
            )
            .field("functions", &self.functions.len())
            .field("payloads", &self.payloads.len())
            .field("backends", &self.backend_names())
            .finish()
    }
}
