//! Plug-in discovery and the per-file load state machine.
//!
//! Each file passes through a fixed sequence of gates:
//!
//! ```text
//! NotLoaded -> Loading -> Validating -> Registering -> Declaring -> Loaded
//!                  \            \             \             \
//!                   +------------+-------------+-------------+--> Failed
//! ```
//!
//! A failure at any gate marks only that file failed. Its registrations
//! are staged in a [`Registrar`] and never reach the registry, and the
//! batch continues with the next file.


use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use quire_codegen::registry::compress;
use quire_codegen::{LibraryOwner, Registrar, Registry};

use crate::abi::{DestroyFn, RegistrarHandle, ABI_VERSION};
use crate::declarations::synthesize;
use crate::error::PlugInError;
use crate::platform::{Module, NativePlatform, Platform};
use crate::validate::{read_functions, read_libraries, read_metadata, PlugInInfo};

/// Environment variable listing extra plug-in directories.
pub const PLUGIN_PATH_VAR: &str = "QUIRE_PLUGIN_PATH";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Validating,
    Registering,
    Declaring,
    Loaded,
    Failed,
}

impl LoadState {
    pub fn name(self) -> &'static str {
        match self {
            LoadState::NotLoaded => "not loaded",
            LoadState::Loading => "loading",
            LoadState::Validating => "validating",
            LoadState::Registering => "registering",
            LoadState::Declaring => "declaring",
            LoadState::Loaded => "loaded",
            LoadState::Failed => "failed",
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one file in a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStatus {
    pub path: PathBuf,
    pub state: LoadState,
    /// Gate that rejected the file.
    pub failed_at: Option<LoadState>,
    pub error: Option<PlugInError>,
}

/// Called once per failed file.
pub type FailureHook = Box<dyn FnMut(&Path, &PlugInError)>;

struct LoadedPlugIn {
    info: PlugInInfo,
    destroy: Option<DestroyFn>,
    module: Box<dyn Module>,
}

pub struct PlugInLoader<P: Platform = NativePlatform> {
    platform: P,
    loaded: Vec<LoadedPlugIn>,
    statuses: Vec<FileStatus>,
    on_failure: Option<FailureHook>,
}

impl PlugInLoader<NativePlatform> {
    pub fn new() -> Self {
        PlugInLoader::with_platform(NativePlatform)
    }
}

impl Default for PlugInLoader<NativePlatform> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Platform> PlugInLoader<P> {
    pub fn with_platform(platform: P) -> Self {
        PlugInLoader {
            platform,
            loaded: Vec::new(),
            statuses: Vec::new(),
            on_failure: None,
        }
    }

    /// Report each failed file to `hook` in addition to the log.
    #[must_use]
    pub fn on_failure(mut self, hook: impl FnMut(&Path, &PlugInError) + 'static) -> Self {
        self.on_failure = Some(Box::new(hook));
        self
    }

    /// Module files directly inside `dir`, sorted by path.
    ///
    /// A missing or unreadable directory yields nothing.
    pub fn discover(&self, dir: &Path) -> Vec<PathBuf> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(error) => {
                tracing::debug!(dir = %dir.display(), %error, "plug-in directory not readable");
                return Vec::new();
            }
        };
        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && self.platform.is_module(path))
            .collect();
        paths.sort();
        paths
    }

    /// Load every file, best effort. Returns `true` iff all of them loaded.
    pub fn load_plug_ins<I>(&mut self, registry: &mut Registry, paths: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let mut all_loaded = true;
        for path in paths {
            all_loaded &= self.load_plug_in(registry, path.as_ref()).is_ok();
        }
        all_loaded
    }

    /// Drive one file through every gate.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn load_plug_in(&mut self, registry: &mut Registry, path: &Path) -> Result<(), PlugInError> {
        let mut state = LoadState::NotLoaded;
        match self.run_gates(registry, path, &mut state) {
            Ok(plug_in) => {
                tracing::debug!(name = %plug_in.info.name, "plug-in loaded");
                self.statuses.push(FileStatus {
                    path: path.to_path_buf(),
                    state: LoadState::Loaded,
                    failed_at: None,
                    error: None,
                });
                self.loaded.push(plug_in);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), gate = %state, %error, "plug-in failed to load");
                if let Some(hook) = self.on_failure.as_mut() {
                    hook(path, &error);
                }
                self.statuses.push(FileStatus {
                    path: path.to_path_buf(),
                    state: LoadState::Failed,
                    failed_at: Some(state),
                    error: Some(error.clone()),
                });
                Err(error)
            }
        }
    }

    fn run_gates(
        &self,
        registry: &mut Registry,
        path: &Path,
        state: &mut LoadState,
    ) -> Result<LoadedPlugIn, PlugInError> {
        *state = LoadState::Loading;
        tracing::debug!("opening module");
        let module = self.platform.open(path)?;
        let descriptor = module
            .descriptor()
            .ok_or_else(|| PlugInError::MissingDescriptor(path.to_path_buf()))?;
        if descriptor.abi_version() != ABI_VERSION {
            return Err(PlugInError::AbiMismatch {
                expected: ABI_VERSION,
                found: descriptor.abi_version(),
            });
        }

        *state = LoadState::Validating;
        tracing::debug!("validating metadata");
        let info = read_metadata(descriptor, path)?;
        if self.plug_in(&info.name).is_some() {
            return Err(PlugInError::DuplicateName(info.name));
        }

        *state = LoadState::Registering;
        let functions = read_functions(descriptor)?;
        let libraries = read_libraries(descriptor)?;
        tracing::debug!(
            name = %info.name,
            functions = functions.len(),
            libraries = libraries.len(),
            "registering"
        );
        let mut registrar = Registrar::new(registry, info.name.clone());
        let mut customer_libraries = Vec::new();
        for library in libraries {
            if library.owner == LibraryOwner::Customer {
                customer_libraries.push(library.name.clone());
            }
            let name = library.name.clone();
            if !registrar.register_runtime_library(library) {
                return Err(PlugInError::Conflict {
                    what: "runtime library",
                    key: name,
                });
            }
        }
        for record in functions {
            let key = record.internal_name.clone();
            if !registrar.register_function(record) {
                return Err(PlugInError::Conflict {
                    what: "function",
                    key,
                });
            }
        }
        if let Some(initialize) = module.initializer() {
            tracing::debug!("running initialize hook");
            let handle = RegistrarHandle::from_registrar(&mut registrar);
            // SAFETY: the handle points at a live registrar for the whole
            // call, and the hook's signature is fixed by the ABI.
            if !unsafe { initialize(handle) } {
                return Err(PlugInError::InitializationFailed(info.name));
            }
        }

        *state = LoadState::Declaring;
        let mut seen = FxHashSet::default();
        for library in customer_libraries {
            if !seen.insert(library.clone()) {
                continue;
            }
            let text = synthesize(&library, registrar.staged().functions().in_library(&library));
            tracing::debug!(%library, bytes = text.len(), "synthesized declarations");
            let (bytes, compressed) = match compress(text.as_bytes()) {
                Ok(bytes) => (bytes, true),
                Err(error) => {
                    tracing::warn!(%library, %error, "storing declarations uncompressed");
                    (text.into_bytes(), false)
                }
            };
            if !registrar.register_declaration_payload(&library, bytes, compressed) {
                return Err(PlugInError::DeclarationConflict(library));
            }
        }

        registrar.commit();
        *state = LoadState::Loaded;
        Ok(LoadedPlugIn {
            destroy: module.destructor(),
            info,
            module,
        })
    }

    /// Loaded plug-ins keyed by name.
    pub fn plug_ins_by_name(&self) -> BTreeMap<&str, &PlugInInfo> {
        self.loaded
            .iter()
            .map(|plug_in| (plug_in.info.name.as_str(), &plug_in.info))
            .collect()
    }

    pub fn plug_in(&self, name: &str) -> Option<&PlugInInfo> {
        self.loaded
            .iter()
            .map(|plug_in| &plug_in.info)
            .find(|info| info.name == name)
    }

    /// One entry per attempted file, in load order.
    pub fn statuses(&self) -> &[FileStatus] {
        &self.statuses
    }
}

impl<P: Platform> Drop for PlugInLoader<P> {
    fn drop(&mut self) {
        for plug_in in self.loaded.drain(..).rev() {
            if let Some(destroy) = plug_in.destroy {
                tracing::debug!(name = %plug_in.info.name, "running destroy hook");
                // SAFETY: the module is still open and the hook's signature
                // is fixed by the ABI.
                unsafe { destroy() };
            }
            // Translators registered by the module are `'static`; the code
            // must stay mapped for the life of the process.
            std::mem::forget(plug_in.module);
        }
    }
}

/// Directories listed in `QUIRE_PLUGIN_PATH`, in order.
pub fn search_path() -> Vec<PathBuf> {
    std::env::var_os(PLUGIN_PATH_VAR)
        .map(|value| search_path_from(&value))
        .unwrap_or_default()
}

fn search_path_from(value: &OsStr) -> Vec<PathBuf> {
    std::env::split_paths(value)
        .filter(|path| !path.as_os_str().is_empty())
        .collect()
}
