//! Staged, all-or-nothing registration on behalf of one plug-in.
//!
//! Every call is validated against the live registry and against what has
//! already been staged, so a conflict is reported at the call that causes
//! it. Nothing reaches the live registry until [`Registrar::commit`];
//! dropping the registrar discards the whole batch.

use std::sync::Arc;

use quire_tree::ValueType;

use super::{ElementCreator, FunctionRecord, LibraryDependency, Registry, RuntimeLibrary};
use crate::backend::Backend;
use crate::decode::Decoder;
use crate::translator::Translator;

pub struct Registrar<'r> {
    live: &'r mut Registry,
    staged: Registry,
    owner: String,
}

impl<'r> Registrar<'r> {
    /// Start a batch on behalf of `owner` (a plug-in name, used in logs).
    pub fn new(live: &'r mut Registry, owner: impl Into<String>) -> Self {
        Registrar {
            live,
            staged: Registry::new(),
            owner: owner.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Read access to the live registry.
    pub fn live(&self) -> &Registry {
        self.live
    }

    /// Entries staged so far.
    pub fn staged(&self) -> &Registry {
        &self.staged
    }

    pub fn register_element_creator(
        &mut self,
        type_name: &str,
        creator: ElementCreator,
        overwrite: bool,
    ) -> bool {
        if !overwrite && self.live.has_element_creator(type_name) {
            return self.reject("element creator", type_name);
        }
        self.staged
            .register_element_creator(type_name, creator, overwrite)
            || self.reject("element creator", type_name)
    }

    pub fn register_translator(
        &mut self,
        backend: &str,
        type_name: &str,
        translator: &'static dyn Translator,
        overwrite: bool,
    ) -> bool {
        if !overwrite && self.live.has_translator(backend, type_name) {
            return self.reject("translator", type_name);
        }
        self.staged
            .register_translator(backend, type_name, translator, overwrite)
            || self.reject("translator", type_name)
    }

    pub fn register_decoder(&mut self, value_type: ValueType, decoder: &'static dyn Decoder) -> bool {
        if self.live.decoder(value_type).is_some() || !self.staged.register_decoder(value_type, decoder)
        {
            return self.reject("decoder", value_type.name());
        }
        true
    }

    /// Functions merge with the live record of the same internal name, so
    /// the live table decides acceptance first.
    pub fn register_function(&mut self, record: FunctionRecord) -> bool {
        if !self.live.functions().accepts(&record) {
            return self.reject("function", &record.internal_name);
        }
        let internal_name = record.internal_name.clone();
        self.staged.register_function(record) || self.reject("function", &internal_name)
    }

    pub fn register_declaration_payload(
        &mut self,
        library: &str,
        bytes: Vec<u8>,
        compressed: bool,
    ) -> bool {
        if self.live.has_payload(library)
            || !self
                .staged
                .register_declaration_payload(library, bytes, compressed)
        {
            return self.reject("declaration payload", library);
        }
        true
    }

    pub fn register_library_dependencies(
        &mut self,
        library: &str,
        dependencies: Vec<LibraryDependency>,
    ) -> bool {
        if self.live.library_dependencies(library).is_some()
            || !self
                .staged
                .register_library_dependencies(library, dependencies)
        {
            return self.reject("library dependencies", library);
        }
        true
    }

    pub fn register_runtime_library(&mut self, library: RuntimeLibrary) -> bool {
        if let Some(existing) = self.live.runtime_library(&library.name) {
            return *existing == library || self.reject("runtime library", &library.name);
        }
        let name = library.name.clone();
        self.staged.register_runtime_library(library) || self.reject("runtime library", &name)
    }

    pub fn register_backend(&mut self, backend: Arc<dyn Backend>) -> bool {
        let name = backend.name().to_string();
        if self.live.backend(&name).is_some() || !self.staged.register_backend(backend) {
            return self.reject("backend", &name);
        }
        true
    }

    /// Runtime library known to either the live or the staged registry.
    pub fn runtime_library(&self, name: &str) -> Option<&RuntimeLibrary> {
        self.staged
            .runtime_library(name)
            .or_else(|| self.live.runtime_library(name))
    }

    /// Apply the batch to the live registry.
    pub fn commit(self) {
        tracing::debug!(owner = %self.owner, staged = ?self.staged, "committing registrations");
        self.live.absorb(self.staged);
    }

    fn reject(&self, what: &str, key: &str) -> bool {
        tracing::debug!(owner = %self.owner, what, key, "registration rejected");
        false
    }
}
