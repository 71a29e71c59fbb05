//! Backend resources discovered before any output is produced.

use std::collections::BTreeSet;
use std::fmt;

/// What kind of external artifact a translator depends on.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ResourceKind {
    /// Native header to `#include`.
    Header,
    /// Runtime library to link.
    Library,
    /// LaTeX package to `\usepackage`.
    Package,
    /// HTML stylesheet to link from the document head.
    Stylesheet,
    /// HTML script to load from the document head.
    Script,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct Resource {
    pub kind: ResourceKind,
    pub name: String,
}

impl Resource {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Resource {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.name)
    }
}

/// Ordered, de-duplicated set of resources.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct ResourceSet(BTreeSet<Resource>);

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the resource was already present.
    pub fn insert(&mut self, kind: ResourceKind, name: impl Into<String>) -> bool {
        self.0.insert(Resource::new(kind, name))
    }

    pub fn contains(&self, kind: ResourceKind, name: &str) -> bool {
        self.0.iter().any(|r| r.kind == kind && r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.0.iter()
    }

    /// Names of every resource of `kind`, in sorted order.
    pub fn names(&self, kind: ResourceKind) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(move |r| r.kind == kind)
            .map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
