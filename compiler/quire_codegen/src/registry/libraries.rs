//! Runtime libraries and their dependency graph.

use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LibraryKind {
    Static,
    Dynamic,
}

/// Who ships a runtime library. Customer libraries need generated forward
/// declarations; vendor libraries are declared by the model API header.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LibraryOwner {
    Customer,
    Vendor,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RuntimeLibrary {
    pub name: String,
    pub kind: LibraryKind,
    pub owner: LibraryOwner,
}

impl RuntimeLibrary {
    pub fn new(name: impl Into<String>, kind: LibraryKind, owner: LibraryOwner) -> Self {
        RuntimeLibrary {
            name: name.into(),
            kind,
            owner,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LibraryDependency {
    pub name: String,
    pub kind: LibraryKind,
}

impl LibraryDependency {
    pub fn new(name: impl Into<String>, kind: LibraryKind) -> Self {
        LibraryDependency {
            name: name.into(),
            kind,
        }
    }
}

/// Order `roots` and everything they depend on so that each library comes
/// before its dependencies. Roots keep their relative order where the
/// graph allows; cycles are broken at the first revisit.
pub fn link_order<'a>(
    roots: impl IntoIterator<Item = &'a str>,
    dependencies: &FxHashMap<String, Vec<LibraryDependency>>,
) -> Vec<String> {
    fn visit(
        library: &str,
        dependencies: &FxHashMap<String, Vec<LibraryDependency>>,
        visited: &mut FxHashSet<String>,
        post_order: &mut Vec<String>,
    ) {
        if !visited.insert(library.to_string()) {
            return;
        }
        if let Some(deps) = dependencies.get(library) {
            for dep in deps.iter().rev() {
                visit(&dep.name, dependencies, visited, post_order);
            }
        }
        post_order.push(library.to_string());
    }

    let roots: Vec<&str> = roots.into_iter().collect();
    let mut visited = FxHashSet::default();
    let mut post_order = Vec::new();
    for root in roots.into_iter().rev() {
        visit(root, dependencies, &mut visited, &mut post_order);
    }
    post_order.reverse();
    post_order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> FxHashMap<String, Vec<LibraryDependency>> {
        edges
            .iter()
            .map(|(lib, deps)| {
                let deps = deps
                    .iter()
                    .map(|d| LibraryDependency::new(*d, LibraryKind::Static))
                    .collect();
                ((*lib).to_string(), deps)
            })
            .collect()
    }

    #[test]
    fn test_shared_dependency_comes_last() {
        let deps = graph(&[("stats", &["core"]), ("plot", &["core"])]);
        assert_eq!(link_order(["stats", "plot"], &deps), ["stats", "plot", "core"]);
    }

    #[test]
    fn test_transitive_chain() {
        let deps = graph(&[("a", &["b"]), ("b", &["c"])]);
        assert_eq!(link_order(["a"], &deps), ["a", "b", "c"]);
    }

    #[test]
    fn test_cycle_terminates() {
        let deps = graph(&[("a", &["b"]), ("b", &["a"])]);
        let order = link_order(["a"], &deps);
        assert_eq!(order.len(), 2);
        assert!(order.contains(&"a".to_string()));
        assert!(order.contains(&"b".to_string()));
    }

    #[test]
    fn test_duplicate_roots_collapse() {
        let deps = graph(&[]);
        assert_eq!(link_order(["m", "m"], &deps), ["m"]);
    }
}
