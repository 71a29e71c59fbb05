#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use crate::{ElementKind, Format, ListStyle, Precedence, TypeRule, ValueType};

fn leaf(tree: &mut ElementTree, text: &str) -> ElementId {
    tree.alloc(Element::new("Literal", ElementKind::leaf(ValueType::Integer)).with_text(text))
}

fn binary(tree: &mut ElementTree, name: &str) -> ElementId {
    tree.alloc(Element::new(
        name,
        ElementKind::operator(
            2,
            Precedence::ADDITION,
            crate::Associativity::Both,
            TypeRule::Promote,
        ),
    ))
}

#[test]
fn test_positional_slots_and_navigation() {
    let mut tree = ElementTree::new();
    let add = binary(&mut tree, "Addition");
    let one = leaf(&mut tree, "1");
    let two = leaf(&mut tree, "2");
    tree.set_child(add, 1, two).unwrap();
    tree.set_child(add, 0, one).unwrap();
    tree.set_root(add);

    let root = tree.root_cursor().unwrap();
    assert_eq!(root.type_name(), "Addition");
    assert_eq!(root.child_count(), 2);
    assert_eq!(root.child(0).unwrap().text(), Some("1"));
    assert_eq!(root.child(1).unwrap().text(), Some("2"));

    let right = tree.cursor(two).unwrap();
    assert_eq!(right.parent().unwrap().id(), add);
    assert_eq!(right.index_in_parent(), Some(1));
    assert_eq!(right.previous_sibling().unwrap().id(), one);
    assert!(right.next_sibling().is_none());
}

#[test]
fn test_unset_slot_is_skipped() {
    let mut tree = ElementTree::new();
    let add = binary(&mut tree, "Addition");
    let one = leaf(&mut tree, "1");
    tree.set_child(add, 1, one).unwrap();

    let cursor = tree.cursor(add).unwrap();
    assert!(cursor.child(0).is_none());
    assert_eq!(cursor.children().count(), 1);
}

#[test]
fn test_append_fills_positional_then_fails() {
    let mut tree = ElementTree::new();
    let add = binary(&mut tree, "Addition");
    let a = leaf(&mut tree, "1");
    let b = leaf(&mut tree, "2");
    let c = leaf(&mut tree, "3");
    tree.append_child(add, a).unwrap();
    tree.append_child(add, b).unwrap();
    let err = tree.append_child(add, c).unwrap_err();
    assert_eq!(
        err,
        TreeError::SlotOutOfRange {
            type_name: "Addition".to_string(),
            slot: 2,
            arity: 2
        }
    );
}

#[test]
fn test_child_cannot_have_two_parents() {
    let mut tree = ElementTree::new();
    let first = binary(&mut tree, "Addition");
    let second = binary(&mut tree, "Addition");
    let one = leaf(&mut tree, "1");
    tree.append_child(first, one).unwrap();
    assert_eq!(
        tree.append_child(second, one),
        Err(TreeError::AlreadyAttached { child: one })
    );
}

#[test]
fn test_ancestor_cannot_become_a_descendant() {
    let mut tree = ElementTree::new();
    let outer = binary(&mut tree, "Addition");
    let inner = binary(&mut tree, "Addition");
    tree.append_child(outer, inner).unwrap();
    tree.set_root(outer);

    assert_eq!(
        tree.append_child(inner, outer),
        Err(TreeError::Cycle {
            parent: inner,
            child: outer
        })
    );
    assert_eq!(
        tree.append_child(inner, inner),
        Err(TreeError::Cycle {
            parent: inner,
            child: inner
        })
    );
    assert!(tree.cursor(outer).unwrap().parent().is_none());
    assert_eq!(tree.cursor(inner).unwrap().child_count(), 0);
}

#[test]
fn test_leaf_rejects_children() {
    let mut tree = ElementTree::new();
    let a = leaf(&mut tree, "1");
    let b = leaf(&mut tree, "2");
    assert!(matches!(
        tree.append_child(a, b),
        Err(TreeError::PlacementMismatch { .. })
    ));
}

#[test]
fn test_grid_rows() {
    let mut tree = ElementTree::new();
    let matrix = tree.alloc(Element::new(
        "Matrix",
        ElementKind::group().with_placement(crate::ChildPlacement::Grid),
    ));
    let cells: Vec<_> = (1..=6).map(|n| leaf(&mut tree, &n.to_string())).collect();
    tree.push_row(matrix, &cells[0..3]).unwrap();
    tree.push_row(matrix, &cells[3..6]).unwrap();

    let cursor = tree.cursor(matrix).unwrap();
    assert_eq!(cursor.grid_dimensions(), Some((2, 3)));
    assert_eq!(cursor.cell(1, 2).unwrap().text(), Some("6"));
    assert_eq!(cursor.cell(0, 1).unwrap().text(), Some("2"));
    assert!(cursor.cell(2, 0).is_none());
}

#[test]
fn test_ragged_grid_row_rejected() {
    let mut tree = ElementTree::new();
    let matrix = tree.alloc(Element::new(
        "Matrix",
        ElementKind::group().with_placement(crate::ChildPlacement::Grid),
    ));
    let a = leaf(&mut tree, "1");
    let b = leaf(&mut tree, "2");
    let c = leaf(&mut tree, "3");
    tree.push_row(matrix, &[a, b]).unwrap();
    assert_eq!(
        tree.push_row(matrix, &[c]),
        Err(TreeError::RaggedRow {
            expected: 2,
            found: 1
        })
    );
}

#[test]
fn test_floating_anchors() {
    let mut tree = ElementTree::new();
    let frame = tree.alloc(Element::new(
        "Frame",
        ElementKind::group().with_placement(crate::ChildPlacement::Floating),
    ));
    let a = leaf(&mut tree, "1");
    tree.place(frame, a, Anchor::new(10, 20)).unwrap();
    let cursor = tree.cursor(frame).unwrap();
    assert_eq!(cursor.anchor(0), Some(Anchor::new(10, 20)));
    assert_eq!(cursor.anchor(1), None);
}

#[test]
fn test_predecessors_walk_nearest_first() {
    let mut tree = ElementTree::new();
    let root = tree.alloc(Element::new("Root", ElementKind::group()));
    let paragraphs: Vec<_> = (0..4)
        .map(|n| {
            let style = ListStyle::Numbered { restart_at: None };
            tree.alloc(
                Element::new("Paragraph", ElementKind::group())
                    .with_text(n.to_string())
                    .with_format(Format::new().with_list_style(style)),
            )
        })
        .collect();
    for &p in &paragraphs {
        tree.append_child(root, p).unwrap();
    }

    let last = tree.cursor(paragraphs[3]).unwrap();
    let texts: Vec<_> = last.predecessors().map(|p| p.text().unwrap()).collect();
    assert_eq!(texts, vec!["2", "1", "0"]);
    assert!(last.format().unwrap().is_numbered());
}

#[test]
fn test_foreign_handle_has_no_cursor() {
    let tree = ElementTree::new();
    assert!(tree.cursor(ElementId::new(0)).is_none());
    assert!(tree.cursor(ElementId::INVALID).is_none());
}
