//! Element nodes and their child arrangements.

use crate::{
    Associativity, ChildPlacement, ElementId, ElementKind, Format, Precedence, TypeRule, ValueType,
};

/// Anchor of a floating child, in points relative to its container.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Anchor {
    pub x: i32,
    pub y: i32,
}

impl Anchor {
    pub const fn new(x: i32, y: i32) -> Self {
        Anchor { x, y }
    }
}

/// Children of an element, shaped by its [`ChildPlacement`].
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Children {
    Leaf,
    /// Fixed slots; unset slots hold [`ElementId::INVALID`].
    Positional(Vec<ElementId>),
    Group(Vec<ElementId>),
    /// Row-major cells. `columns` is zero until the first row is added.
    Grid { columns: usize, cells: Vec<ElementId> },
    /// `ids[i]` is anchored at `anchors[i]`.
    Floating { ids: Vec<ElementId>, anchors: Vec<Anchor> },
}

impl Children {
    /// Empty child storage for a placement kind.
    pub fn for_placement(placement: ChildPlacement) -> Self {
        match placement {
            ChildPlacement::Leaf => Children::Leaf,
            ChildPlacement::Positional(arity) => Children::Positional(vec![ElementId::INVALID; arity]),
            ChildPlacement::Group => Children::Group(Vec::new()),
            ChildPlacement::Grid => Children::Grid {
                columns: 0,
                cells: Vec::new(),
            },
            ChildPlacement::Floating => Children::Floating {
                ids: Vec::new(),
                anchors: Vec::new(),
            },
        }
    }

    /// All child slots in traversal order (row-major for grids).
    pub fn ids(&self) -> &[ElementId] {
        match self {
            Children::Leaf => &[],
            Children::Positional(ids) | Children::Group(ids) => ids,
            Children::Grid { cells, .. } => cells,
            Children::Floating { ids, .. } => ids,
        }
    }

    pub fn len(&self) -> usize {
        self.ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids().is_empty()
    }

    /// `(rows, columns)` for grids.
    pub fn grid_dimensions(&self) -> Option<(usize, usize)> {
        match self {
            Children::Grid { columns, cells } => {
                if *columns == 0 {
                    Some((0, 0))
                } else {
                    Some((cells.len() / columns, *columns))
                }
            }
            _ => None,
        }
    }
}

/// One node of a document.
#[derive(Clone, Debug)]
pub struct Element {
    type_name: String,
    kind: ElementKind,
    children: Children,
    format: Option<Format>,
    text: Option<String>,
    pub(crate) parent: ElementId,
}

impl Element {
    /// A detached element of the given kind with empty child slots.
    pub fn new(type_name: impl Into<String>, kind: ElementKind) -> Self {
        Element {
            type_name: type_name.into(),
            children: Children::for_placement(kind.placement),
            kind,
            format: None,
            text: None,
            parent: ElementId::INVALID,
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    #[must_use]
    pub fn with_declared_type(mut self, value_type: ValueType) -> Self {
        self.kind.declared_type = value_type;
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn placement(&self) -> ChildPlacement {
        self.kind.placement
    }

    pub fn precedence(&self) -> Precedence {
        self.kind.precedence
    }

    pub fn associativity(&self) -> Associativity {
        self.kind.associativity
    }

    pub fn type_rule(&self) -> TypeRule {
        self.kind.type_rule
    }

    pub fn declared_type(&self) -> ValueType {
        self.kind.declared_type
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Children {
        &mut self.children
    }

    pub fn format(&self) -> Option<&Format> {
        self.format.as_ref()
    }

    pub fn set_format(&mut self, format: Option<Format>) {
        self.format = format;
    }

    /// Raw text: literal spelling, identifier, or prose.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent.is_valid().then_some(self.parent)
    }
}
