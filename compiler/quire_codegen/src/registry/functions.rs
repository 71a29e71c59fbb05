//! Persistent function records.
//!
//! Functions are the one registry entry that several plug-ins may extend:
//! a second registration of the same internal name appends its call
//! signatures to the existing record instead of failing.

use rustc_hash::FxHashMap;

use quire_tree::ValueType;

pub const DEFAULT_DESCRIPTION: &str = "User defined function";
pub const DEFAULT_CATEGORY: &str = "User Defined";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub value_type: ValueType,
    pub description: String,
}

impl Parameter {
    pub fn new(value_type: ValueType, description: impl Into<String>) -> Self {
        Parameter {
            value_type,
            description: description.into(),
        }
    }
}

/// One call signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionVariant {
    pub return_type: ValueType,
    pub parameters: Vec<Parameter>,
}

impl FunctionVariant {
    pub fn new(return_type: ValueType, parameters: Vec<Parameter>) -> Self {
        FunctionVariant {
            return_type,
            parameters,
        }
    }

    /// Same return and parameter types, ignoring descriptions.
    pub fn same_signature(&self, other: &FunctionVariant) -> bool {
        self.return_type == other.return_type
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.value_type == b.value_type)
    }
}

/// A function callable from documents, implemented by a runtime library.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionRecord {
    /// Symbol name in the runtime library.
    pub internal_name: String,
    /// Runtime library that implements the function.
    pub library: String,
    /// Name shown to users.
    pub name: String,
    pub subscript: Option<String>,
    /// Optional command alias.
    pub command: Option<String>,
    pub description: String,
    pub category: String,
    /// Takes an implicit leading random-number-generator argument.
    pub requires_rng: bool,
    /// The first parameter is shown as the name's subscript.
    pub subscripted_first_parameter: bool,
    pub variants: Vec<FunctionVariant>,
}

impl FunctionRecord {
    pub fn new(
        internal_name: impl Into<String>,
        library: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        FunctionRecord {
            internal_name: internal_name.into(),
            library: library.into(),
            name: name.into(),
            subscript: None,
            command: None,
            description: DEFAULT_DESCRIPTION.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            requires_rng: false,
            subscripted_first_parameter: false,
            variants: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_variant(mut self, variant: FunctionVariant) -> Self {
        self.variants.push(variant);
        self
    }

    #[must_use]
    pub fn with_subscript(mut self, subscript: impl Into<String>) -> Self {
        self.subscript = Some(subscript.into());
        self
    }

    #[must_use]
    pub fn with_rng(mut self) -> Self {
        self.requires_rng = true;
        self
    }

    /// Visible name plus `_subscript` when there is one.
    pub fn display_name(&self) -> String {
        match &self.subscript {
            Some(subscript) => format!("{}_{subscript}", self.name),
            None => self.name.clone(),
        }
    }

    /// Append variants whose signature is not already present. Returns the
    /// number of variants added.
    pub fn merge_variants(&mut self, variants: &[FunctionVariant]) -> usize {
        let mut added = 0;
        for variant in variants {
            if !self.variants.iter().any(|v| v.same_signature(variant)) {
                self.variants.push(variant.clone());
                added += 1;
            }
        }
        added
    }
}

/// Function records addressable by internal or display name.
#[derive(Clone, Debug, Default)]
pub struct FunctionTable {
    records: Vec<FunctionRecord>,
    by_internal: FxHashMap<String, usize>,
    by_display: FxHashMap<String, usize>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `record` can be inserted without conflicting.
    ///
    /// An existing record of the same internal name must belong to the same
    /// library, and the display name must not already belong to a different
    /// function.
    pub fn accepts(&self, record: &FunctionRecord) -> bool {
        if let Some(&index) = self.by_internal.get(&record.internal_name) {
            return self.records[index].library == record.library;
        }
        !self.by_display.contains_key(&record.display_name())
    }

    /// Insert a new record or extend the existing one with its variants.
    pub fn insert(&mut self, record: FunctionRecord) -> bool {
        if !self.accepts(&record) {
            return false;
        }
        if let Some(&index) = self.by_internal.get(&record.internal_name) {
            self.records[index].merge_variants(&record.variants);
            return true;
        }
        let index = self.records.len();
        self.by_internal.insert(record.internal_name.clone(), index);
        self.by_display.insert(record.display_name(), index);
        self.records.push(record);
        true
    }

    /// Look up by internal name, then by display name.
    pub fn get(&self, name: &str) -> Option<&FunctionRecord> {
        self.index_of(name).map(|index| &self.records[index])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FunctionRecord> {
        self.index_of(name).map(|index| &mut self.records[index])
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.by_internal
            .get(name)
            .or_else(|| self.by_display.get(name))
            .copied()
    }

    /// Records in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &FunctionRecord> {
        self.records.iter()
    }

    /// Records owned by `library`.
    pub fn in_library<'a>(&'a self, library: &'a str) -> impl Iterator<Item = &'a FunctionRecord> {
        self.records.iter().filter(move |r| r.library == library)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
