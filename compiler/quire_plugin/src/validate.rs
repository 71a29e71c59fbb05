//! Descriptor validation: raw ABI tables into owned registry records.

use std::path::{Path, PathBuf};

use quire_codegen::registry::{DEFAULT_CATEGORY, DEFAULT_DESCRIPTION};
use quire_codegen::{
    FunctionRecord, FunctionVariant, LibraryKind, LibraryOwner, Parameter, RuntimeLibrary,
};
use quire_tree::ValueType;

use crate::abi::{
    FunctionDef, LibraryDef, PlugInDescriptor, StrRef, LIBRARY_DYNAMIC, LIBRARY_STATIC,
    OWNER_CUSTOMER, OWNER_VENDOR,
};
use crate::error::PlugInError;

/// License implied by a descriptor that names none.
pub const DEFAULT_LICENSE: &str = "Quire Plug-In License";

/// Validated metadata of a loaded plug-in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlugInInfo {
    pub name: String,
    pub author: String,
    pub company: String,
    pub license: String,
    pub brief_description: String,
    pub detailed_description: String,
    pub version: String,
    pub path: PathBuf,
}

fn text(value: StrRef, field: &'static str) -> Result<String, PlugInError> {
    value
        .to_str()
        .map(str::to_string)
        .ok_or(PlugInError::InvalidText(field))
}

fn required(value: StrRef, field: &'static str) -> Result<String, PlugInError> {
    let text = text(value, field)?;
    if text.trim().is_empty() {
        return Err(PlugInError::MissingMetadata(field));
    }
    Ok(text)
}

/// Name, author, company, brief description and version must be present;
/// license and detailed description may be empty.
pub fn read_metadata(
    descriptor: &PlugInDescriptor,
    path: &Path,
) -> Result<PlugInInfo, PlugInError> {
    let license = text(descriptor.license(), "license")?;
    Ok(PlugInInfo {
        name: required(descriptor.name(), "name")?,
        author: required(descriptor.author(), "author")?,
        company: required(descriptor.company(), "company")?,
        brief_description: required(descriptor.brief_description(), "brief description")?,
        version: required(descriptor.version(), "version")?,
        license: if license.is_empty() {
            DEFAULT_LICENSE.to_string()
        } else {
            license
        },
        detailed_description: text(descriptor.detailed_description(), "detailed description")?,
        path: path.to_path_buf(),
    })
}

fn value_type(code: u32, index: usize) -> Result<ValueType, PlugInError> {
    ValueType::from_code(code).ok_or_else(|| PlugInError::InvalidFunction {
        index,
        reason: format!("unknown value type code {code}"),
    })
}

fn function_text(value: StrRef, index: usize, field: &str) -> Result<String, PlugInError> {
    value
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| PlugInError::InvalidFunction {
            index,
            reason: format!("{field} is not valid UTF-8"),
        })
}

fn optional(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn read_function(def: &FunctionDef, index: usize) -> Result<FunctionRecord, PlugInError> {
    let invalid = |reason: &str| PlugInError::InvalidFunction {
        index,
        reason: reason.to_string(),
    };
    let internal_name = function_text(def.internal_name(), index, "internal name")?;
    let library = function_text(def.library(), index, "library")?;
    let name = function_text(def.name(), index, "name")?;
    if internal_name.is_empty() {
        return Err(invalid("internal name is empty"));
    }
    if library.is_empty() {
        return Err(invalid("library is empty"));
    }
    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if def.variants().is_empty() {
        return Err(invalid("no variants"));
    }

    let mut record = FunctionRecord::new(internal_name, library, name);
    record.subscript = optional(function_text(def.subscript(), index, "subscript")?);
    record.command = optional(function_text(def.command(), index, "command")?);
    record.description = optional(function_text(def.description(), index, "description")?)
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
    record.category = optional(function_text(def.category(), index, "category")?)
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    record.requires_rng = def.requires_rng();
    record.subscripted_first_parameter = def.subscripted_first_parameter();

    for variant in def.variants() {
        let parameters = variant
            .parameters()
            .iter()
            .map(|p| {
                Ok(Parameter::new(
                    value_type(p.value_type(), index)?,
                    function_text(p.description(), index, "parameter description")?,
                ))
            })
            .collect::<Result<Vec<_>, PlugInError>>()?;
        record
            .variants
            .push(FunctionVariant::new(value_type(variant.return_type(), index)?, parameters));
    }
    Ok(record)
}

/// Every exported function definition, in table order.
pub fn read_functions(descriptor: &PlugInDescriptor) -> Result<Vec<FunctionRecord>, PlugInError> {
    descriptor
        .functions()
        .iter()
        .enumerate()
        .map(|(index, def)| read_function(def, index))
        .collect()
}

fn read_library(def: &LibraryDef, index: usize) -> Result<RuntimeLibrary, PlugInError> {
    let invalid = |reason: String| PlugInError::InvalidLibrary { index, reason };
    let name_ref = def.name();
    let name = name_ref
        .to_str()
        .ok_or_else(|| invalid("name is not valid UTF-8".to_string()))?;
    if name.is_empty() {
        return Err(invalid("name is empty".to_string()));
    }
    let kind = match def.kind() {
        LIBRARY_STATIC => LibraryKind::Static,
        LIBRARY_DYNAMIC => LibraryKind::Dynamic,
        other => return Err(invalid(format!("unknown library kind {other}"))),
    };
    let owner = match def.owner() {
        OWNER_CUSTOMER => LibraryOwner::Customer,
        OWNER_VENDOR => LibraryOwner::Vendor,
        other => return Err(invalid(format!("unknown library owner {other}"))),
    };
    Ok(RuntimeLibrary::new(name, kind, owner))
}

/// Every runtime library definition, in table order.
pub fn read_libraries(descriptor: &PlugInDescriptor) -> Result<Vec<RuntimeLibrary>, PlugInError> {
    descriptor
        .libraries()
        .iter()
        .enumerate()
        .map(|(index, def)| read_library(def, index))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::abi::{ParameterDef, VariantDef};

    static X: [ParameterDef; 1] = [ParameterDef::new(ValueType::Real, "x")];
    static REAL: [VariantDef; 1] = [VariantDef::new(ValueType::Real, &X)];

    #[test]
    fn test_empty_author_is_missing_metadata() {
        let descriptor = PlugInDescriptor::new("Acme", "", "Acme Corp", "ok", "1.0");
        assert_eq!(
            read_metadata(&descriptor, Path::new("acme.so")),
            Err(PlugInError::MissingMetadata("author"))
        );
    }

    #[test]
    fn test_empty_license_implies_default() {
        let descriptor = PlugInDescriptor::new("Acme", "Ada", "Acme Corp", "ok", "1.0");
        let info = read_metadata(&descriptor, Path::new("acme.so")).unwrap();
        assert_eq!(info.license, DEFAULT_LICENSE);
        assert_eq!(info.detailed_description, "");
    }

    #[test]
    fn test_function_defaults() {
        static FUNCTIONS: [FunctionDef; 1] = [FunctionDef::new("acme_sin", "acme", "sin", &REAL)];
        let descriptor =
            PlugInDescriptor::new("Acme", "Ada", "Acme Corp", "ok", "1.0").with_functions(&FUNCTIONS);
        let records = read_functions(&descriptor).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, DEFAULT_DESCRIPTION);
        assert_eq!(records[0].category, DEFAULT_CATEGORY);
        assert_eq!(records[0].subscript, None);
        assert_eq!(
            records[0].variants,
            vec![FunctionVariant::new(
                ValueType::Real,
                vec![Parameter::new(ValueType::Real, "x")]
            )]
        );
    }

    #[test]
    fn test_function_without_variants_rejected() {
        static FUNCTIONS: [FunctionDef; 1] = [FunctionDef::new("acme_sin", "acme", "sin", &[])];
        let descriptor =
            PlugInDescriptor::new("Acme", "Ada", "Acme Corp", "ok", "1.0").with_functions(&FUNCTIONS);
        assert!(matches!(
            read_functions(&descriptor),
            Err(PlugInError::InvalidFunction { index: 0, .. })
        ));
    }

    #[test]
    fn test_unknown_library_owner_rejected() {
        static LIBRARIES: [LibraryDef; 2] = [
            LibraryDef::new("acme", LIBRARY_DYNAMIC, OWNER_CUSTOMER),
            LibraryDef::new("blas", LIBRARY_STATIC, 7),
        ];
        let descriptor =
            PlugInDescriptor::new("Acme", "Ada", "Acme Corp", "ok", "1.0").with_libraries(&LIBRARIES);
        assert!(matches!(
            read_libraries(&descriptor),
            Err(PlugInError::InvalidLibrary { index: 1, .. })
        ));
    }
}
