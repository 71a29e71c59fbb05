//! Arena-backed element tree and its read-only navigation contract.
//!
//! Ownership flows strictly parent to child: the arena owns every element,
//! parents refer to children by [`ElementId`], and children keep a plain
//! back-link to their parent. Generators only ever see an [`ElementRef`],
//! which borrows the tree immutably.

use std::ops::Index;

use crate::element::{Anchor, Children, Element};
use crate::{ChildPlacement, ElementId};

/// Structural errors raised while building a tree.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("element {0} does not exist in this tree")]
    UnknownElement(ElementId),
    #[error("element {child} already has a parent")]
    AlreadyAttached { child: ElementId },
    #[error("'{type_name}' does not accept children this way (placement {placement:?})")]
    PlacementMismatch {
        type_name: String,
        placement: ChildPlacement,
    },
    #[error("slot {slot} is out of range for '{type_name}' with {arity} operands")]
    SlotOutOfRange {
        type_name: String,
        slot: usize,
        arity: usize,
    },
    #[error("row of {found} cells does not match grid width {expected}")]
    RaggedRow { expected: usize, found: usize },
    #[error("element {child} is {parent} or one of its ancestors")]
    Cycle { parent: ElementId, child: ElementId },
}

/// Arena of elements with a designated root.
#[derive(Clone, Debug, Default)]
pub struct ElementTree {
    elements: Vec<Element>,
    root: ElementId,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a detached element into the arena.
    pub fn alloc(&mut self, element: Element) -> ElementId {
        let index = u32::try_from(self.elements.len()).unwrap_or(u32::MAX - 1);
        self.elements.push(element);
        ElementId::new(index)
    }

    pub fn set_root(&mut self, id: ElementId) {
        self.root = id;
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        id.is_valid() && id.index() < self.elements.len()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        if id.is_valid() {
            self.elements.get(id.index())
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        if id.is_valid() {
            self.elements.get_mut(id.index())
        } else {
            None
        }
    }

    /// Navigation handle for `id`, `None` for invalid or foreign handles.
    pub fn cursor(&self, id: ElementId) -> Option<ElementRef<'_>> {
        self.contains(id).then_some(ElementRef { tree: self, id })
    }

    /// Navigation handle for the root.
    pub fn root_cursor(&self) -> Option<ElementRef<'_>> {
        self.cursor(self.root)
    }

    /// Fill operand slot `slot` of a positional element.
    pub fn set_child(
        &mut self,
        parent: ElementId,
        slot: usize,
        child: ElementId,
    ) -> Result<(), TreeError> {
        self.check_attachable(parent, child)?;
        let element = self.element_mut(parent)?;
        let type_name = element.type_name().to_string();
        let placement = element.placement();
        let Children::Positional(slots) = element.children_mut() else {
            return Err(TreeError::PlacementMismatch {
                type_name,
                placement,
            });
        };
        let arity = slots.len();
        let Some(target) = slots.get_mut(slot) else {
            return Err(TreeError::SlotOutOfRange {
                type_name,
                slot,
                arity,
            });
        };
        *target = child;
        self.attach(parent, child)
    }

    /// Append a child to a group, or the next free slot of a positional
    /// element.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), TreeError> {
        self.check_attachable(parent, child)?;
        let element = self.element_mut(parent)?;
        let type_name = element.type_name().to_string();
        let placement = element.placement();
        match element.children_mut() {
            Children::Group(ids) => ids.push(child),
            Children::Positional(slots) => {
                let arity = slots.len();
                let Some(free) = slots.iter_mut().find(|slot| !slot.is_valid()) else {
                    return Err(TreeError::SlotOutOfRange {
                        type_name,
                        slot: arity,
                        arity,
                    });
                };
                *free = child;
            }
            Children::Floating { ids, anchors } => {
                ids.push(child);
                anchors.push(Anchor::default());
            }
            Children::Leaf | Children::Grid { .. } => {
                return Err(TreeError::PlacementMismatch {
                    type_name,
                    placement,
                });
            }
        }
        self.attach(parent, child)
    }

    /// Append a full row to a grid. The first row fixes the column count.
    pub fn push_row(&mut self, parent: ElementId, row: &[ElementId]) -> Result<(), TreeError> {
        for &child in row {
            self.check_attachable(parent, child)?;
        }
        let element = self.element_mut(parent)?;
        let type_name = element.type_name().to_string();
        let placement = element.placement();
        let Children::Grid { columns, cells } = element.children_mut() else {
            return Err(TreeError::PlacementMismatch {
                type_name,
                placement,
            });
        };
        if *columns == 0 {
            *columns = row.len();
        } else if *columns != row.len() {
            return Err(TreeError::RaggedRow {
                expected: *columns,
                found: row.len(),
            });
        }
        cells.extend_from_slice(row);
        for &child in row {
            self.attach(parent, child)?;
        }
        Ok(())
    }

    /// Place a child of a floating container at `anchor`.
    pub fn place(
        &mut self,
        parent: ElementId,
        child: ElementId,
        anchor: Anchor,
    ) -> Result<(), TreeError> {
        self.check_attachable(parent, child)?;
        let element = self.element_mut(parent)?;
        let type_name = element.type_name().to_string();
        let placement = element.placement();
        let Children::Floating { ids, anchors } = element.children_mut() else {
            return Err(TreeError::PlacementMismatch {
                type_name,
                placement,
            });
        };
        ids.push(child);
        anchors.push(anchor);
        self.attach(parent, child)
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Element, TreeError> {
        self.get_mut(id).ok_or(TreeError::UnknownElement(id))
    }

    fn check_attachable(&self, parent: ElementId, child: ElementId) -> Result<(), TreeError> {
        if !self.contains(parent) {
            return Err(TreeError::UnknownElement(parent));
        }
        match self.get(child) {
            None => return Err(TreeError::UnknownElement(child)),
            Some(element) if element.parent.is_valid() => {
                return Err(TreeError::AlreadyAttached { child });
            }
            Some(_) => {}
        }
        // Attachment never creates a cycle, so the chain is finite.
        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child {
                return Err(TreeError::Cycle { parent, child });
            }
            ancestor = self.get(id).and_then(Element::parent);
        }
        Ok(())
    }

    fn attach(&mut self, parent: ElementId, child: ElementId) -> Result<(), TreeError> {
        self.element_mut(child)?.parent = parent;
        Ok(())
    }
}

impl Index<ElementId> for ElementTree {
    type Output = Element;

    #[inline]
    fn index(&self, id: ElementId) -> &Element {
        &self.elements[id.index()]
    }
}

/// Read-only view of one element plus navigation to its relatives.
#[derive(Copy, Clone)]
pub struct ElementRef<'t> {
    tree: &'t ElementTree,
    id: ElementId,
}

impl<'t> ElementRef<'t> {
    pub fn id(self) -> ElementId {
        self.id
    }

    pub fn tree(self) -> &'t ElementTree {
        self.tree
    }

    pub fn element(self) -> &'t Element {
        &self.tree[self.id]
    }

    pub fn type_name(self) -> &'t str {
        self.element().type_name()
    }

    pub fn text(self) -> Option<&'t str> {
        self.element().text()
    }

    pub fn format(self) -> Option<&'t crate::Format> {
        self.element().format()
    }

    pub fn precedence(self) -> crate::Precedence {
        self.element().precedence()
    }

    /// Number of child slots, including unset positional slots.
    pub fn child_count(self) -> usize {
        self.element().children().len()
    }

    /// Child in slot `index`; `None` if the slot is unset or out of range.
    pub fn child(self, index: usize) -> Option<ElementRef<'t>> {
        let id = *self.element().children().ids().get(index)?;
        self.tree.cursor(id)
    }

    /// Set children in traversal order.
    pub fn children(self) -> impl Iterator<Item = ElementRef<'t>> + 't {
        let tree = self.tree;
        self.element()
            .children()
            .ids()
            .iter()
            .filter_map(move |&id| tree.cursor(id))
    }

    /// `(rows, columns)` of a grid element.
    pub fn grid_dimensions(self) -> Option<(usize, usize)> {
        self.element().children().grid_dimensions()
    }

    /// Grid cell at `row`, `column`.
    pub fn cell(self, row: usize, column: usize) -> Option<ElementRef<'t>> {
        let (rows, columns) = self.grid_dimensions()?;
        if row >= rows || column >= columns {
            return None;
        }
        self.child(row * columns + column)
    }

    /// Anchor of floating child `index`.
    pub fn anchor(self, index: usize) -> Option<Anchor> {
        match self.element().children() {
            Children::Floating { anchors, .. } => anchors.get(index).copied(),
            _ => None,
        }
    }

    pub fn parent(self) -> Option<ElementRef<'t>> {
        self.tree.cursor(self.element().parent()?)
    }

    /// Slot index of this element within its parent.
    pub fn index_in_parent(self) -> Option<usize> {
        let parent = self.parent()?;
        parent
            .element()
            .children()
            .ids()
            .iter()
            .position(|&id| id == self.id)
    }

    /// Nearest set sibling before this one.
    pub fn previous_sibling(self) -> Option<ElementRef<'t>> {
        let parent = self.parent()?;
        let index = self.index_in_parent()?;
        parent.element().children().ids()[..index]
            .iter()
            .rev()
            .find_map(|&id| self.tree.cursor(id))
    }

    /// Nearest set sibling after this one.
    pub fn next_sibling(self) -> Option<ElementRef<'t>> {
        let parent = self.parent()?;
        let index = self.index_in_parent()?;
        parent.element().children().ids()[index + 1..]
            .iter()
            .find_map(|&id| self.tree.cursor(id))
    }

    /// Earlier siblings, nearest first.
    pub fn predecessors(self) -> impl Iterator<Item = ElementRef<'t>> + 't {
        std::iter::successors(self.previous_sibling(), |sibling| sibling.previous_sibling())
    }
}

impl std::fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.type_name(), self.id)
    }
}

#[cfg(test)]
mod tests;
