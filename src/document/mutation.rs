//! Document mutation primitives
//!
//! Every operation is anchored at an inline and returns the id of the last
//! element it inserted, so insertions chain without re-querying the tree.
//! Anchors must be direct children of a paragraph.

use crate::colorize::{Colorizer, Syntax};

use super::{Document, Inline, InlineId};

/// Insert `element` right after `pos`
pub fn insert_inline(
    document: &mut Document,
    pos: InlineId,
    element: Inline,
) -> InlineId {
    document.insert_after(pos, element)
}

pub fn insert_line_break(
    document: &mut Document,
    pos: InlineId,
) -> InlineId {
    insert_inline(document, pos, Inline::LineBreak)
}

/// Insert `elements` after `pos`, keeping their order.
///
/// The primitive always inserts directly after the anchor, so elements go in
/// back to front. An empty sequence inserts nothing and returns `pos`.
pub fn insert_sequence(
    document: &mut Document,
    pos: InlineId,
    elements: Vec<Inline>,
) -> InlineId {
    let mut last = None;
    for element in elements.into_iter().rev() {
        let id = document.insert_after(pos, element);
        last.get_or_insert(id);
    }
    last.unwrap_or(pos)
}

/// Colorize `code` under `syntax` and insert the fragments
pub fn insert_colorized_code(
    document: &mut Document,
    colorizer: &dyn Colorizer,
    syntax: &Syntax,
    pos: InlineId,
    code: &str,
) -> InlineId {
    insert_sequence(document, pos, colorizer.colorize(syntax, code))
}

/// Insert an error message with error styling
pub fn insert_error(
    document: &mut Document,
    colorizer: &dyn Colorizer,
    pos: InlineId,
    message: &str,
) -> InlineId {
    insert_sequence(document, pos, colorizer.colorize_error(message))
}
