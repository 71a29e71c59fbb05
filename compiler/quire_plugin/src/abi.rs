//! The plug-in ABI.
//!
//! A plug-in is a shared library exporting [`DESCRIPTOR_SYMBOL`], a function
//! returning a pointer to a [`PlugInDescriptor`] that lives as long as the
//! library. Everything the host reads from that descriptor is copied into
//! owned values during loading.
//!
//! ```text
//! PlugInDescriptor
//!   abi_version                         checked before anything else
//!   name, author, company, license,
//!   brief/detailed description, version  StrRef
//!   functions  -> [FunctionDef]
//!                   variants -> [VariantDef]
//!                                 parameters -> [ParameterDef]
//!   libraries  -> [LibraryDef]
//! ```
//!
//! The optional [`INITIALIZE_SYMBOL`] receives a [`RegistrarHandle`]; it is
//! only meaningful for plug-ins built against the same `quire_codegen`,
//! since it exchanges Rust types through the handle.
//!
//! Fields are private: descriptors built in Rust go through the `const`
//! constructors, which guarantee every pointer/length pair describes a
//! `'static` slice.

use std::{slice, str};

use quire_codegen::Registrar;
use quire_tree::ValueType;

/// Bumped whenever any `#[repr(C)]` layout in this module changes.
pub const ABI_VERSION: u32 = 1;

pub const DESCRIPTOR_SYMBOL: &[u8] = b"quire_plug_in_descriptor";
pub const INITIALIZE_SYMBOL: &[u8] = b"quire_plug_in_initialize";
pub const DESTROY_SYMBOL: &[u8] = b"quire_plug_in_destroy";

pub type DescriptorFn = unsafe extern "C" fn() -> *const PlugInDescriptor;
/// Returns `true` on success.
pub type InitializeFn = unsafe extern "C" fn(*mut RegistrarHandle) -> bool;
pub type DestroyFn = unsafe extern "C" fn();

pub const LIBRARY_STATIC: u32 = 0;
pub const LIBRARY_DYNAMIC: u32 = 1;
pub const OWNER_CUSTOMER: u32 = 0;
pub const OWNER_VENDOR: u32 = 1;

/// Borrowed UTF-8 text. A null pointer reads as the empty string.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct StrRef {
    ptr: *const u8,
    len: usize,
}

// SAFETY: a StrRef only ever points at immutable 'static data.
unsafe impl Sync for StrRef {}
unsafe impl Send for StrRef {}

impl StrRef {
    pub const EMPTY: StrRef = StrRef {
        ptr: std::ptr::null(),
        len: 0,
    };

    pub const fn new(text: &'static str) -> Self {
        StrRef {
            ptr: text.as_ptr(),
            len: text.len(),
        }
    }

    /// The text, or `None` when it is not valid UTF-8.
    pub fn to_str(&self) -> Option<&str> {
        if self.ptr.is_null() || self.len == 0 {
            return Some("");
        }
        // SAFETY: constructed from a 'static str, or supplied by a loaded
        // library whose descriptor contract requires a valid byte range.
        let bytes = unsafe { slice::from_raw_parts(self.ptr, self.len) };
        str::from_utf8(bytes).ok()
    }
}

/// `'static` slice as a pointer/length pair.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct Table<T> {
    len: usize,
    ptr: *const T,
}

// SAFETY: tables only ever point at immutable 'static data.
unsafe impl<T: Sync> Sync for Table<T> {}
unsafe impl<T: Sync> Send for Table<T> {}

impl<T> Table<T> {
    pub const EMPTY: Table<T> = Table {
        len: 0,
        ptr: std::ptr::null(),
    };

    pub const fn new(items: &'static [T]) -> Self {
        Table {
            len: items.len(),
            ptr: items.as_ptr(),
        }
    }

    pub fn as_slice(&self) -> &[T] {
        if self.ptr.is_null() || self.len == 0 {
            return &[];
        }
        // SAFETY: see `StrRef::to_str`.
        unsafe { slice::from_raw_parts(self.ptr, self.len) }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct ParameterDef {
    value_type: u32,
    description: StrRef,
}

impl ParameterDef {
    pub const fn new(value_type: ValueType, description: &'static str) -> Self {
        ParameterDef {
            value_type: value_type.code(),
            description: StrRef::new(description),
        }
    }

    pub fn value_type(&self) -> u32 {
        self.value_type
    }

    pub fn description(&self) -> StrRef {
        self.description
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct VariantDef {
    return_type: u32,
    parameters: Table<ParameterDef>,
}

impl VariantDef {
    pub const fn new(return_type: ValueType, parameters: &'static [ParameterDef]) -> Self {
        VariantDef {
            return_type: return_type.code(),
            parameters: Table::new(parameters),
        }
    }

    pub fn return_type(&self) -> u32 {
        self.return_type
    }

    pub fn parameters(&self) -> &[ParameterDef] {
        self.parameters.as_slice()
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct FunctionDef {
    internal_name: StrRef,
    library: StrRef,
    name: StrRef,
    subscript: StrRef,
    command: StrRef,
    description: StrRef,
    category: StrRef,
    requires_rng: bool,
    subscripted_first_parameter: bool,
    variants: Table<VariantDef>,
}

impl FunctionDef {
    pub const fn new(
        internal_name: &'static str,
        library: &'static str,
        name: &'static str,
        variants: &'static [VariantDef],
    ) -> Self {
        FunctionDef {
            internal_name: StrRef::new(internal_name),
            library: StrRef::new(library),
            name: StrRef::new(name),
            subscript: StrRef::EMPTY,
            command: StrRef::EMPTY,
            description: StrRef::EMPTY,
            category: StrRef::EMPTY,
            requires_rng: false,
            subscripted_first_parameter: false,
            variants: Table::new(variants),
        }
    }

    #[must_use]
    pub const fn with_subscript(mut self, subscript: &'static str) -> Self {
        self.subscript = StrRef::new(subscript);
        self
    }

    #[must_use]
    pub const fn with_command(mut self, command: &'static str) -> Self {
        self.command = StrRef::new(command);
        self
    }

    #[must_use]
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = StrRef::new(description);
        self
    }

    #[must_use]
    pub const fn with_category(mut self, category: &'static str) -> Self {
        self.category = StrRef::new(category);
        self
    }

    #[must_use]
    pub const fn with_rng(mut self) -> Self {
        self.requires_rng = true;
        self
    }

    #[must_use]
    pub const fn with_subscripted_first_parameter(mut self) -> Self {
        self.subscripted_first_parameter = true;
        self
    }

    pub fn internal_name(&self) -> StrRef {
        self.internal_name
    }

    pub fn library(&self) -> StrRef {
        self.library
    }

    pub fn name(&self) -> StrRef {
        self.name
    }

    pub fn subscript(&self) -> StrRef {
        self.subscript
    }

    pub fn command(&self) -> StrRef {
        self.command
    }

    pub fn description(&self) -> StrRef {
        self.description
    }

    pub fn category(&self) -> StrRef {
        self.category
    }

    pub fn requires_rng(&self) -> bool {
        self.requires_rng
    }

    pub fn subscripted_first_parameter(&self) -> bool {
        self.subscripted_first_parameter
    }

    pub fn variants(&self) -> &[VariantDef] {
        self.variants.as_slice()
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct LibraryDef {
    name: StrRef,
    /// [`LIBRARY_STATIC`] or [`LIBRARY_DYNAMIC`].
    kind: u32,
    /// [`OWNER_CUSTOMER`] or [`OWNER_VENDOR`].
    owner: u32,
}

impl LibraryDef {
    pub const fn new(name: &'static str, kind: u32, owner: u32) -> Self {
        LibraryDef {
            name: StrRef::new(name),
            kind,
            owner,
        }
    }

    pub fn name(&self) -> StrRef {
        self.name
    }

    pub fn kind(&self) -> u32 {
        self.kind
    }

    pub fn owner(&self) -> u32 {
        self.owner
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct PlugInDescriptor {
    abi_version: u32,
    name: StrRef,
    author: StrRef,
    company: StrRef,
    license: StrRef,
    brief_description: StrRef,
    detailed_description: StrRef,
    version: StrRef,
    functions: Table<FunctionDef>,
    libraries: Table<LibraryDef>,
}

impl PlugInDescriptor {
    /// A descriptor with the required metadata and no tables.
    pub const fn new(
        name: &'static str,
        author: &'static str,
        company: &'static str,
        brief_description: &'static str,
        version: &'static str,
    ) -> Self {
        PlugInDescriptor {
            abi_version: ABI_VERSION,
            name: StrRef::new(name),
            author: StrRef::new(author),
            company: StrRef::new(company),
            license: StrRef::EMPTY,
            brief_description: StrRef::new(brief_description),
            detailed_description: StrRef::EMPTY,
            version: StrRef::new(version),
            functions: Table::EMPTY,
            libraries: Table::EMPTY,
        }
    }

    #[must_use]
    pub const fn with_license(mut self, license: &'static str) -> Self {
        self.license = StrRef::new(license);
        self
    }

    #[must_use]
    pub const fn with_detailed_description(mut self, description: &'static str) -> Self {
        self.detailed_description = StrRef::new(description);
        self
    }

    #[must_use]
    pub const fn with_functions(mut self, functions: &'static [FunctionDef]) -> Self {
        self.functions = Table::new(functions);
        self
    }

    #[must_use]
    pub const fn with_libraries(mut self, libraries: &'static [LibraryDef]) -> Self {
        self.libraries = Table::new(libraries);
        self
    }

    /// Override the stamped ABI version.
    #[must_use]
    pub const fn with_abi_version(mut self, abi_version: u32) -> Self {
        self.abi_version = abi_version;
        self
    }

    pub fn abi_version(&self) -> u32 {
        self.abi_version
    }

    pub fn name(&self) -> StrRef {
        self.name
    }

    pub fn author(&self) -> StrRef {
        self.author
    }

    pub fn company(&self) -> StrRef {
        self.company
    }

    pub fn license(&self) -> StrRef {
        self.license
    }

    pub fn brief_description(&self) -> StrRef {
        self.brief_description
    }

    pub fn detailed_description(&self) -> StrRef {
        self.detailed_description
    }

    pub fn version(&self) -> StrRef {
        self.version
    }

    pub fn functions(&self) -> &[FunctionDef] {
        self.functions.as_slice()
    }

    pub fn libraries(&self) -> &[LibraryDef] {
        self.libraries.as_slice()
    }
}

/// Opaque registrar pointer handed to a plug-in's initialize hook.
#[repr(C)]
pub struct RegistrarHandle {
    _private: [u8; 0],
}

impl RegistrarHandle {
    pub(crate) fn from_registrar(registrar: &mut Registrar<'_>) -> *mut RegistrarHandle {
        std::ptr::from_mut(registrar).cast()
    }
}

/// Recover the registrar inside an initialize hook.
///
/// # Safety
///
/// `handle` must be the pointer the host passed to the hook, and the
/// returned reference must not outlive that call.
pub unsafe fn registrar<'h>(handle: *mut RegistrarHandle) -> Option<&'h mut Registrar<'h>> {
    // SAFETY: upheld by the caller.
    unsafe { handle.cast::<Registrar<'h>>().as_mut() }
}

#[cfg(test)]
mod tests {
    use super::*;

    static PARAMETERS: [ParameterDef; 2] = [
        ParameterDef::new(ValueType::Real, "x"),
        ParameterDef::new(ValueType::Integer, "n"),
    ];
    static VARIANTS: [VariantDef; 1] = [VariantDef::new(ValueType::Real, &PARAMETERS)];
    static FUNCTIONS: [FunctionDef; 1] =
        [FunctionDef::new("acme_pow", "acme", "pow", &VARIANTS).with_subscript("n")];

    #[test]
    fn test_null_text_reads_empty() {
        assert_eq!(StrRef::EMPTY.to_str(), Some(""));
        assert_eq!(StrRef::new("Acme").to_str(), Some("Acme"));
    }

    #[test]
    fn test_tables_round_through_pointers() {
        let variant = &VARIANTS[0];
        assert_eq!(variant.return_type(), ValueType::Real.code());
        assert_eq!(variant.parameters().len(), 2);
        assert_eq!(variant.parameters()[1].description().to_str(), Some("n"));
        assert!(Table::<ParameterDef>::EMPTY.as_slice().is_empty());

        let descriptor =
            PlugInDescriptor::new("Acme", "A. Author", "Acme", "ok", "1.0").with_functions(&FUNCTIONS);
        assert_eq!(descriptor.abi_version(), ABI_VERSION);
        assert_eq!(descriptor.functions()[0].subscript().to_str(), Some("n"));
        assert!(descriptor.libraries().is_empty());
    }
}
