//! Operating-system capability for opening plug-in modules.
//!
//! The loader never touches `libloading` directly; it goes through
//! [`Platform`], so tests can serve descriptors from memory.

use std::ffi::OsStr;
use std::path::Path;

use libloading::Library;

use crate::abi::{
    DescriptorFn, DestroyFn, InitializeFn, PlugInDescriptor, DESCRIPTOR_SYMBOL, DESTROY_SYMBOL,
    INITIALIZE_SYMBOL,
};
use crate::error::PlugInError;

/// An opened plug-in. Dropping it closes the underlying library.
pub trait Module {
    /// The exported descriptor, if the module has one.
    fn descriptor(&self) -> Option<&PlugInDescriptor>;

    fn initializer(&self) -> Option<InitializeFn>;

    fn destructor(&self) -> Option<DestroyFn>;
}

pub trait Platform {
    fn open(&self, path: &Path) -> Result<Box<dyn Module>, PlugInError>;

    /// Whether `path` looks like a loadable module on this platform.
    fn is_module(&self, path: &Path) -> bool {
        path.extension() == Some(OsStr::new(std::env::consts::DLL_EXTENSION))
    }
}

/// Shared libraries through the system dynamic loader.
#[derive(Copy, Clone, Debug, Default)]
pub struct NativePlatform;

struct NativeModule {
    library: Library,
}

impl Platform for NativePlatform {
    fn open(&self, path: &Path) -> Result<Box<dyn Module>, PlugInError> {
        // SAFETY: loading runs the library's initializers; plug-in
        // directories are trusted.
        let library = unsafe { Library::new(path) }.map_err(|e| PlugInError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Box::new(NativeModule { library }))
    }
}

impl Module for NativeModule {
    fn descriptor(&self) -> Option<&PlugInDescriptor> {
        // SAFETY: the ABI fixes the symbol's signature, and the returned
        // descriptor lives as long as the library.
        unsafe {
            let entry = self.library.get::<DescriptorFn>(DESCRIPTOR_SYMBOL).ok()?;
            entry().as_ref()
        }
    }

    fn initializer(&self) -> Option<InitializeFn> {
        // SAFETY: the ABI fixes the symbol's signature.
        unsafe { self.library.get::<InitializeFn>(INITIALIZE_SYMBOL) }
            .ok()
            .map(|symbol| *symbol)
    }

    fn destructor(&self) -> Option<DestroyFn> {
        // SAFETY: the ABI fixes the symbol's signature.
        unsafe { self.library.get::<DestroyFn>(DESTROY_SYMBOL) }
            .ok()
            .map(|symbol| *symbol)
    }
}
