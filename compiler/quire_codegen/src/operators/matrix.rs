//! Row/column truncation for displayed matrices.

use quire_tree::Format;

/// One displayed row or column.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Member {
    Index(usize),
    /// Stands in for the hidden members.
    Ellipsis,
}

/// Members of a `count`-long axis to display under `format`.
///
/// With leading/trailing counts set and fewer visible than present, shows
/// the first `leading`, an ellipsis, then the last `trailing`.
pub fn visible_members(count: usize, format: Option<&Format>) -> Vec<Member> {
    let (leading, trailing) = match format {
        Some(f) if f.leading_members.is_some() || f.trailing_members.is_some() => (
            f.leading_members.unwrap_or(0),
            f.trailing_members.unwrap_or(0),
        ),
        _ => return (0..count).map(Member::Index).collect(),
    };
    if leading.saturating_add(trailing) >= count {
        return (0..count).map(Member::Index).collect();
    }
    let mut members: Vec<Member> = (0..leading).map(Member::Index).collect();
    members.push(Member::Ellipsis);
    members.extend((count - trailing..count).map(Member::Index));
    members
}
