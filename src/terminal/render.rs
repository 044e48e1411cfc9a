//! ANSI rendering of document fragments

use owo_colors::{OwoColorize, Style as Paint};

use crate::document::{Document, InlineId, ParagraphId, Parent, Style};

fn paint_for(style: Style) -> Paint {
    match style {
        Style::Keyword => Paint::new().magenta().bold(),
        Style::String => Paint::new().green(),
        Style::Number => Paint::new().yellow(),
        Style::Comment => Paint::new().bright_black().italic(),
        Style::Error => Paint::new().red(),
        Style::None | Style::Identifier | Style::Punctuation | Style::Whitespace => Paint::new(),
    }
}

/// Text of one run with its style applied, or as-is without colors
pub fn paint(
    text: &str,
    style: Style,
    colors: bool,
) -> String {
    if colors && !text.is_empty() {
        text.style(paint_for(style)).to_string()
    } else {
        text.to_string()
    }
}

/// Render leaves in the given order; line breaks become `\n`
pub fn render_leaves(
    document: &Document,
    leaves: &[InlineId],
    colors: bool,
) -> String {
    let mut out = String::new();
    for leaf in leaves {
        match document.run_text(*leaf) {
            Some(text) => {
                let style = document.style(*leaf).unwrap_or_default();
                out.push_str(&paint(text, style, colors));
            }
            None => out.push('\n'),
        }
    }
    out
}

/// Render the whole document, paragraphs separated by blank lines
pub fn render_document(
    document: &Document,
    colors: bool,
) -> String {
    document
        .paragraph_ids()
        .into_iter()
        .map(|paragraph| {
            let leaves: Vec<InlineId> = document
                .leaves()
                .into_iter()
                .filter(|leaf| top_paragraph(document, *leaf) == Some(paragraph))
                .collect();
            render_leaves(document, &leaves, colors)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn top_paragraph(
    document: &Document,
    mut id: InlineId,
) -> Option<ParagraphId> {
    loop {
        match document.parent(id)? {
            Parent::Paragraph(paragraph) => return Some(paragraph),
            Parent::Span(span) => id = span,
        }
    }
}
