//! List membership of paragraphs, derived from document lineage.
//!
//! A paragraph does not know whether it starts, continues or ends a list;
//! that follows from its neighbours. Translators ask here instead of
//! keeping state in the engine.

use std::iter;

use quire_tree::{ElementRef, ListStyle};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ListKind {
    Bullet,
    Numbered,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ListPosition {
    pub kind: ListKind,
    /// Item number; always 0 for bullet lists.
    pub number: u32,
    /// First item of its list: the list must be opened before it.
    pub opens: bool,
    /// Last item of its list: the list must be closed after it.
    pub closes: bool,
}

fn style(element: ElementRef<'_>) -> Option<ListStyle> {
    element.format()?.list_style
}

fn list_kind(style: ListStyle) -> ListKind {
    match style {
        ListStyle::Bullet => ListKind::Bullet,
        ListStyle::Numbered { .. } => ListKind::Numbered,
    }
}

fn restart(style: ListStyle) -> Option<u32> {
    match style {
        ListStyle::Numbered { restart_at } => restart_at,
        ListStyle::Bullet => None,
    }
}

/// Where `element` sits in a run of list items, if it is one.
pub fn list_position(element: ElementRef<'_>) -> Option<ListPosition> {
    let own = style(element)?;
    let kind = list_kind(own);
    let same_list = |other: ElementRef<'_>| {
        other.type_name() == element.type_name() && style(other).map(list_kind) == Some(kind)
    };

    let opens = restart(own).is_some()
        || !element.previous_sibling().is_some_and(same_list);
    let closes = match element.next_sibling() {
        Some(next) => !same_list(next) || style(next).and_then(restart).is_some(),
        None => true,
    };

    let number = match kind {
        ListKind::Bullet => 0,
        ListKind::Numbered => {
            let mut continued = 0;
            let mut start = None;
            for item in iter::once(element).chain(element.predecessors()) {
                if !same_list(item) {
                    break;
                }
                if let Some(at) = style(item).and_then(restart) {
                    start = Some(at);
                    break;
                }
                continued += 1;
            }
            start.map_or(continued, |at| at + continued)
        }
    };

    Some(ListPosition {
        kind,
        number,
        opens,
        closes,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests {
    use quire_tree::{parse_notation, ElementTree};

    use super::*;
    use crate::registry::Registry;

    fn positions(source: &str) -> Vec<Option<ListPosition>> {
        let tree: ElementTree = parse_notation(source, &Registry::with_builtins()).unwrap();
        let root = tree.root_cursor().unwrap();
        root.children().map(list_position).collect()
    }

    fn item(kind: ListKind, number: u32, opens: bool, closes: bool) -> Option<ListPosition> {
        Some(ListPosition {
            kind,
            number,
            opens,
            closes,
        })
    }

    #[test]
    fn test_numbered_run() {
        assert_eq!(
            positions(
                r#"Root(Paragraph{numbered}("a"), Paragraph{numbered}("b"), Paragraph{numbered}("c"))"#
            ),
            vec![
                item(ListKind::Numbered, 1, true, false),
                item(ListKind::Numbered, 2, false, false),
                item(ListKind::Numbered, 3, false, true),
            ]
        );
    }

    #[test]
    fn test_plain_paragraph_breaks_the_list() {
        assert_eq!(
            positions(
                r#"Root(Paragraph{numbered}("a"), Paragraph("gap"), Paragraph{numbered}("b"))"#
            ),
            vec![
                item(ListKind::Numbered, 1, true, true),
                None,
                item(ListKind::Numbered, 1, true, true),
            ]
        );
    }

    #[test]
    fn test_restart_continues_from_its_number() {
        assert_eq!(
            positions(
                r#"Root(Paragraph{numbered}("a"), Paragraph{numbered=5}("b"), Paragraph{numbered}("c"))"#
            ),
            vec![
                item(ListKind::Numbered, 1, true, true),
                item(ListKind::Numbered, 5, true, false),
                item(ListKind::Numbered, 6, false, true),
            ]
        );
    }

    #[test]
    fn test_bullets_and_numbers_are_separate_lists() {
        assert_eq!(
            positions(r#"Root(Paragraph{bullet}("a"), Paragraph{numbered}("b"))"#),
            vec![
                item(ListKind::Bullet, 0, true, true),
                item(ListKind::Numbered, 1, true, true),
            ]
        );
    }
}
