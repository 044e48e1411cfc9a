//! Rich-text document tree
//!
//! A document is an ordered list of paragraphs, each holding ordered inline
//! nodes: styled text runs, line breaks and spans (styled containers of
//! further inlines). Nodes are addressed by [`InlineId`]s that stay valid
//! until the node is removed, so callers can chain insertions without
//! re-querying the tree.
//!
//! Text positions are [`TextPointer`]s (a run plus a byte offset). The
//! document owns the caret and the live selection.
//!
//! Any violation of the tree's shape (an inline whose parent is not a
//! paragraph used as an insertion anchor, a pointer into a removed node)
//! panics with a `structural invariant violation` message. Continuing after
//! such a failure would corrupt every later edit.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub mod mutation;

/// Stable identity of an inline node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InlineId(u64);

impl fmt::Display for InlineId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable identity of a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParagraphId(u64);

/// Presentation style of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Style {
    /// Plain, unstyled text
    #[default]
    None,
    Keyword,
    String,
    Number,
    Comment,
    Identifier,
    Punctuation,
    Whitespace,
    /// Error messages
    Error,
}

/// A detached inline element, not yet part of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inline {
    Run { text: String, style: Style },
    LineBreak,
    Span { style: Style, children: Vec<Inline> },
}

impl Inline {
    /// A styled run
    pub fn run(
        text: impl Into<String>,
        style: Style,
    ) -> Self {
        Inline::Run {
            text: text.into(),
            style,
        }
    }

    /// An unstyled run
    pub fn plain(text: impl Into<String>) -> Self {
        Self::run(text, Style::None)
    }

    /// Text this element contributes; a line break reads as `\n`
    pub fn plain_text(&self) -> String {
        match self {
            Inline::Run { text, .. } => text.clone(),
            Inline::LineBreak => "\n".to_string(),
            Inline::Span { children, .. } => children.iter().map(Inline::plain_text).collect(),
        }
    }
}

/// Where an inline node hangs in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    Paragraph(ParagraphId),
    Span(InlineId),
}

#[derive(Debug, Clone)]
enum NodeKind {
    Run { text: String, style: Style },
    LineBreak,
    Span { style: Style, children: Vec<InlineId> },
}

#[derive(Debug, Clone)]
struct Node {
    parent: Parent,
    kind: NodeKind,
}

/// A position inside a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPointer {
    pub inline: InlineId,
    /// Byte offset into the run's text
    pub offset: usize,
}

impl TextPointer {
    pub fn new(
        inline: InlineId,
        offset: usize,
    ) -> Self {
        Self { inline, offset }
    }
}

/// A range between two pointers, in either order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start: TextPointer,
    pub end: TextPointer,
}

impl TextRange {
    pub fn new(
        start: TextPointer,
        end: TextPointer,
    ) -> Self {
        Self { start, end }
    }

    /// Empty range at a single position
    pub fn collapsed(at: TextPointer) -> Self {
        Self::new(at, at)
    }

    /// Both ends at the same position
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Serializable view of a whole document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub paragraphs: Vec<Vec<Inline>>,
}

/// Abort on a broken tree shape
#[cold]
#[track_caller]
fn structural_violation(message: impl fmt::Display) -> ! {
    panic!("structural invariant violation: {}", message)
}

/// Largest char boundary not after `offset`
fn floor_boundary(
    text: &str,
    offset: usize,
) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// The rich-text document
#[derive(Debug, Clone)]
pub struct Document {
    paragraphs: IndexMap<ParagraphId, Vec<InlineId>>,
    nodes: HashMap<InlineId, Node>,
    next_id: u64,
    caret: TextPointer,
    selection: TextRange,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document with one paragraph holding one empty run, caret inside it
    pub fn new() -> Self {
        Self::with_text("")
    }

    /// A single paragraph with `text`; `\n` becomes a line break. The caret
    /// sits at the end of the last line.
    pub fn with_text(text: &str) -> Self {
        let mut inlines = Vec::new();
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                inlines.push(Inline::LineBreak);
            }
            inlines.push(Inline::plain(line));
        }

        let placeholder = TextPointer::new(InlineId(0), 0);
        let mut document = Self {
            paragraphs: IndexMap::new(),
            nodes: HashMap::new(),
            next_id: 1,
            caret: placeholder,
            selection: TextRange::collapsed(placeholder),
        };
        let paragraph = document.push_paragraph(inlines);
        let last = *document.paragraphs[&paragraph]
            .last()
            .unwrap_or_else(|| structural_violation("new paragraph is empty"));
        let end = document.end_of(last);
        document.set_caret(end);
        document
    }

    /// Append a paragraph; an empty list gets one empty run
    pub fn push_paragraph(
        &mut self,
        inlines: Vec<Inline>,
    ) -> ParagraphId {
        let paragraph = ParagraphId(self.fresh_id());
        let inlines = if inlines.is_empty() {
            vec![Inline::plain("")]
        } else {
            inlines
        };
        let children = inlines
            .into_iter()
            .map(|inline| self.alloc(Parent::Paragraph(paragraph), inline))
            .collect();
        self.paragraphs.insert(paragraph, children);
        paragraph
    }

    fn fresh_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn alloc(
        &mut self,
        parent: Parent,
        element: Inline,
    ) -> InlineId {
        let id = InlineId(self.fresh_id());
        let kind = match element {
            Inline::Run { text, style } => NodeKind::Run { text, style },
            Inline::LineBreak => NodeKind::LineBreak,
            Inline::Span { style, children } => {
                let children = children
                    .into_iter()
                    .map(|child| self.alloc(Parent::Span(id), child))
                    .collect();
                NodeKind::Span { style, children }
            }
        };
        self.nodes.insert(id, Node { parent, kind });
        id
    }

    #[track_caller]
    fn node(
        &self,
        id: InlineId,
    ) -> &Node {
        self.nodes
            .get(&id)
            .unwrap_or_else(|| structural_violation(format!("inline {} is not part of the document", id)))
    }

    #[track_caller]
    fn node_mut(
        &mut self,
        id: InlineId,
    ) -> &mut Node {
        self.nodes
            .get_mut(&id)
            .unwrap_or_else(|| structural_violation(format!("inline {} is not part of the document", id)))
    }

    /// Whether `id` is still in the tree
    pub fn contains(
        &self,
        id: InlineId,
    ) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Parent of an inline
    pub fn parent(
        &self,
        id: InlineId,
    ) -> Option<Parent> {
        self.nodes.get(&id).map(|node| node.parent)
    }

    /// Detached copy of an inline and its children
    pub fn inline(
        &self,
        id: InlineId,
    ) -> Option<Inline> {
        let node = self.nodes.get(&id)?;
        Some(match &node.kind {
            NodeKind::Run { text, style } => Inline::run(text.clone(), *style),
            NodeKind::LineBreak => Inline::LineBreak,
            NodeKind::Span { style, children } => Inline::Span {
                style: *style,
                children: children.iter().filter_map(|c| self.inline(*c)).collect(),
            },
        })
    }

    /// Text of a run
    pub fn run_text(
        &self,
        id: InlineId,
    ) -> Option<&str> {
        match &self.nodes.get(&id)?.kind {
            NodeKind::Run { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Style of a run or span
    pub fn style(
        &self,
        id: InlineId,
    ) -> Option<Style> {
        match &self.nodes.get(&id)?.kind {
            NodeKind::Run { style, .. } | NodeKind::Span { style, .. } => Some(*style),
            NodeKind::LineBreak => None,
        }
    }

    /// Restyle a run or span
    pub fn set_style(
        &mut self,
        id: InlineId,
        new_style: Style,
    ) {
        match &mut self.node_mut(id).kind {
            NodeKind::Run { style, .. } | NodeKind::Span { style, .. } => *style = new_style,
            NodeKind::LineBreak => {}
        }
    }

    /// Paragraphs in order
    pub fn paragraph_ids(&self) -> Vec<ParagraphId> {
        self.paragraphs.keys().copied().collect()
    }

    /// Top-level inlines of a paragraph
    pub fn paragraph_inlines(
        &self,
        paragraph: ParagraphId,
    ) -> &[InlineId] {
        self.paragraphs
            .get(&paragraph)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Paragraph directly containing `id`
    ///
    /// Panics if `id` sits inside a span instead of a paragraph.
    #[track_caller]
    pub fn paragraph_of(
        &self,
        id: InlineId,
    ) -> ParagraphId {
        match self.node(id).parent {
            Parent::Paragraph(paragraph) => paragraph,
            Parent::Span(span) => structural_violation(format!(
                "inline {} has span {} as parent, not a paragraph",
                id, span
            )),
        }
    }

    /// Insert `element` immediately after `anchor` in the anchor's paragraph
    #[track_caller]
    pub fn insert_after(
        &mut self,
        anchor: InlineId,
        element: Inline,
    ) -> InlineId {
        let paragraph = self.paragraph_of(anchor);
        let id = self.alloc(Parent::Paragraph(paragraph), element);
        let children = self
            .paragraphs
            .get_mut(&paragraph)
            .unwrap_or_else(|| structural_violation("paragraph vanished"));
        let index = children
            .iter()
            .position(|child| *child == anchor)
            .unwrap_or_else(|| structural_violation(format!("inline {} missing from its paragraph", anchor)));
        children.insert(index + 1, id);
        id
    }

    /// Paragraph-level ancestor of an inline
    fn top_level(
        &self,
        id: InlineId,
    ) -> (ParagraphId, InlineId) {
        let mut current = id;
        loop {
            match self.node(current).parent {
                Parent::Paragraph(paragraph) => return (paragraph, current),
                Parent::Span(span) => current = span,
            }
        }
    }

    fn collect_leaves(
        &self,
        id: InlineId,
        out: &mut Vec<InlineId>,
    ) {
        match &self.node(id).kind {
            NodeKind::Span { children, .. } => {
                for child in children {
                    self.collect_leaves(*child, out);
                }
            }
            _ => out.push(id),
        }
    }

    /// Runs and line breaks in document order, with their paragraph index
    fn located_leaves(&self) -> Vec<(usize, InlineId)> {
        let mut located = Vec::new();
        for (index, children) in self.paragraphs.values().enumerate() {
            let mut leaves = Vec::new();
            for child in children {
                self.collect_leaves(*child, &mut leaves);
            }
            located.extend(leaves.into_iter().map(|leaf| (index, leaf)));
        }
        located
    }

    /// Runs and line breaks in document order
    pub fn leaves(&self) -> Vec<InlineId> {
        self.located_leaves()
            .into_iter()
            .map(|(_, leaf)| leaf)
            .collect()
    }

    fn leaf_text(
        &self,
        id: InlineId,
    ) -> &str {
        match &self.node(id).kind {
            NodeKind::Run { text, .. } => text,
            NodeKind::LineBreak => "\n",
            NodeKind::Span { .. } => "",
        }
    }

    /// The whole document as text; paragraphs are separated by `\n`
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        let mut previous = None;
        for (paragraph, leaf) in self.located_leaves() {
            if previous.is_some_and(|p| p != paragraph) {
                text.push('\n');
            }
            previous = Some(paragraph);
            text.push_str(self.leaf_text(leaf));
        }
        text
    }

    /// Pointer at the start of a run
    pub fn start_of(
        &self,
        id: InlineId,
    ) -> TextPointer {
        TextPointer::new(id, 0)
    }

    /// Pointer at the end of a run
    pub fn end_of(
        &self,
        id: InlineId,
    ) -> TextPointer {
        TextPointer::new(id, self.leaf_text(id).len())
    }

    /// The run a pointer points into
    #[track_caller]
    pub fn inline_under(
        &self,
        pointer: TextPointer,
    ) -> InlineId {
        match self.node(pointer.inline).kind {
            NodeKind::Run { .. } => pointer.inline,
            _ => structural_violation(format!(
                "text pointer into {} is not inside a run",
                pointer.inline
            )),
        }
    }

    pub fn caret(&self) -> TextPointer {
        self.caret
    }

    /// Move the caret; the selection collapses onto it
    pub fn set_caret(
        &mut self,
        pointer: TextPointer,
    ) {
        self.inline_under(pointer);
        self.caret = pointer;
        self.selection = TextRange::collapsed(pointer);
    }

    pub fn selection(&self) -> TextRange {
        self.selection
    }

    /// Select a range; the caret follows its end
    pub fn select(
        &mut self,
        range: TextRange,
    ) {
        self.inline_under(range.start);
        self.inline_under(range.end);
        self.selection = range;
        self.caret = range.end;
    }

    /// Order a range's ends and resolve their leaf indices
    #[track_caller]
    fn resolve(
        &self,
        located: &[(usize, InlineId)],
        range: TextRange,
    ) -> (TextPointer, usize, TextPointer, usize) {
        let index_of = |pointer: TextPointer| {
            self.inline_under(pointer);
            located
                .iter()
                .position(|(_, leaf)| *leaf == pointer.inline)
                .unwrap_or_else(|| structural_violation(format!("inline {} is unreachable", pointer.inline)))
        };
        let (a, b) = (index_of(range.start), index_of(range.end));
        let forward = a < b || (a == b && range.start.offset <= range.end.offset);
        if forward {
            (range.start, a, range.end, b)
        } else {
            (range.end, b, range.start, a)
        }
    }

    /// The same range with its ends in document order
    #[track_caller]
    pub fn ordered(
        &self,
        range: TextRange,
    ) -> TextRange {
        let located = self.located_leaves();
        let (start, _, end, _) = self.resolve(&located, range);
        TextRange::new(start, end)
    }

    /// Text covered by a range
    pub fn text(
        &self,
        range: TextRange,
    ) -> String {
        let located = self.located_leaves();
        let (start, s, end, e) = self.resolve(&located, range);

        let first = self.leaf_text(start.inline);
        let from = floor_boundary(first, start.offset);
        if s == e {
            let to = floor_boundary(first, end.offset).max(from);
            return first[from..to].to_string();
        }

        let mut text = first[from..].to_string();
        for i in s + 1..=e {
            let (paragraph, leaf) = located[i];
            if paragraph != located[i - 1].0 {
                text.push('\n');
            }
            let leaf_text = self.leaf_text(leaf);
            if i == e {
                text.push_str(&leaf_text[..floor_boundary(leaf_text, end.offset)]);
            } else {
                text.push_str(leaf_text);
            }
        }
        text
    }

    /// Replace the content of a range with plain text (no line breaks).
    /// Leaves strictly inside the range are removed; a range spanning
    /// paragraphs merges them. Returns the pointer after the new text.
    pub fn replace(
        &mut self,
        range: TextRange,
        replacement: &str,
    ) -> TextPointer {
        let located = self.located_leaves();
        let (start, s, end, e) = self.resolve(&located, range);

        if s == e {
            let text = self.run_text_mut(start.inline);
            let from = floor_boundary(text, start.offset);
            let to = floor_boundary(text, end.offset).max(from);
            text.replace_range(from..to, replacement);
            return TextPointer::new(start.inline, from + replacement.len());
        }

        for (_, leaf) in &located[s + 1..e] {
            self.remove(*leaf);
        }

        let tail = self.run_text_mut(end.inline);
        let cut = floor_boundary(tail, end.offset);
        tail.replace_range(..cut, "");

        let head = self.run_text_mut(start.inline);
        let from = floor_boundary(head, start.offset);
        head.truncate(from);
        head.push_str(replacement);
        let after = TextPointer::new(start.inline, from + replacement.len());

        if located[s].0 != located[e].0 {
            self.merge_paragraphs(start.inline, end.inline);
        }
        after
    }

    #[track_caller]
    fn run_text_mut(
        &mut self,
        id: InlineId,
    ) -> &mut String {
        match &mut self.node_mut(id).kind {
            NodeKind::Run { text, .. } => text,
            _ => structural_violation(format!("inline {} is not a run", id)),
        }
    }

    /// Move everything from `tail`'s top-level inline onwards into the
    /// paragraph of `head`, dropping the paragraphs in between.
    fn merge_paragraphs(
        &mut self,
        head: InlineId,
        tail: InlineId,
    ) {
        let (first, head_top) = self.top_level(head);
        let (last, tail_top) = self.top_level(tail);
        let first_index = self.paragraphs.get_index_of(&first).unwrap_or(0);
        let last_index = self.paragraphs.get_index_of(&last).unwrap_or(first_index);

        let last_children = self.paragraphs.get(&last).cloned().unwrap_or_default();
        let split = last_children
            .iter()
            .position(|c| *c == tail_top)
            .unwrap_or(last_children.len());
        let (dropped, moved) = last_children.split_at(split);

        for id in moved {
            self.node_mut(*id).parent = Parent::Paragraph(first);
        }
        for id in dropped.to_vec() {
            self.remove_subtree(id);
        }

        let doomed: Vec<ParagraphId> = self
            .paragraphs
            .keys()
            .skip(first_index + 1)
            .take(last_index - first_index)
            .copied()
            .collect();
        for paragraph in doomed {
            if let Some(children) = self.paragraphs.shift_remove(&paragraph) {
                if paragraph != last {
                    for id in children {
                        self.remove_subtree(id);
                    }
                }
            }
        }

        if let Some(children) = self.paragraphs.get_mut(&first) {
            let at = children
                .iter()
                .position(|c| *c == head_top)
                .map_or(children.len(), |i| i + 1);
            children.splice(at..at, moved.iter().copied());
        }
    }

    /// Detach a node from its parent and drop it with its children
    fn remove(
        &mut self,
        id: InlineId,
    ) {
        let parent = self.node(id).parent;
        match parent {
            Parent::Paragraph(paragraph) => {
                if let Some(children) = self.paragraphs.get_mut(&paragraph) {
                    children.retain(|c| *c != id);
                }
            }
            Parent::Span(span) => {
                if let NodeKind::Span { children, .. } = &mut self.node_mut(span).kind {
                    children.retain(|c| *c != id);
                }
            }
        }
        self.remove_subtree(id);
    }

    fn remove_subtree(
        &mut self,
        id: InlineId,
    ) {
        if let Some(node) = self.nodes.remove(&id) {
            if let NodeKind::Span { children, .. } = node.kind {
                for child in children {
                    self.remove_subtree(child);
                }
            }
        }
    }

    /// Start of the visual line containing `pointer`: just after the
    /// nearest preceding line break, or the start of the paragraph.
    pub fn line_start(
        &self,
        pointer: TextPointer,
    ) -> TextPointer {
        let located = self.located_leaves();
        let (_, index, _, _) = self.resolve(&located, TextRange::collapsed(pointer));
        let paragraph = located[index].0;

        let mut first = index;
        while first > 0 && located[first - 1].0 == paragraph {
            let previous = located[first - 1].1;
            if matches!(self.node(previous).kind, NodeKind::LineBreak) {
                break;
            }
            first -= 1;
        }

        if first == index {
            TextPointer::new(pointer.inline, 0)
        } else {
            self.start_of(located[first].1)
        }
    }

    /// Type text at the caret. `\n` splits the caret's run around new line
    /// breaks; the caret ends after the inserted text.
    pub fn insert_text_at_caret(
        &mut self,
        text: &str,
    ) {
        let caret = self.caret;
        let run = self.inline_under(caret);
        let style = self.style(run).unwrap_or_default();

        let mut lines = text.split('\n');
        let first = lines.next().unwrap_or_default();
        let rest: Vec<&str> = lines.collect();

        let current = self.run_text_mut(run);
        let at = floor_boundary(current, caret.offset);
        if rest.is_empty() {
            current.insert_str(at, first);
            let pointer = TextPointer::new(run, at + first.len());
            self.set_caret(pointer);
            return;
        }

        let suffix = current.split_off(at);
        current.push_str(first);

        let mut anchor = run;
        let mut caret = TextPointer::new(run, at + first.len());
        for (i, line) in rest.iter().enumerate() {
            anchor = self.insert_after(anchor, Inline::LineBreak);
            let content = if i + 1 == rest.len() {
                format!("{}{}", line, suffix)
            } else {
                line.to_string()
            };
            anchor = self.insert_after(anchor, Inline::run(content, style));
            caret = TextPointer::new(anchor, line.len());
        }
        self.set_caret(caret);
    }

    /// Serializable copy of the document
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            paragraphs: self
                .paragraphs
                .values()
                .map(|children| children.iter().filter_map(|c| self.inline(*c)).collect())
                .collect(),
        }
    }
}
