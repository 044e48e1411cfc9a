//! Syntax colorization
//!
//! Turns code or error text into styled inline fragments. Colorization only
//! decides presentation: the fragments' plain text always concatenates back
//! to the input.

mod syntax;

pub use syntax::Syntax;

use crate::document::{Inline, Style};

/// Produces styled fragments for code and for error messages
pub trait Colorizer {
    /// Split `code` into styled runs; `\n` becomes a line break
    fn colorize(
        &self,
        syntax: &Syntax,
        code: &str,
    ) -> Vec<Inline>;

    /// Error-styled runs, one per line, separated by line breaks
    fn colorize_error(
        &self,
        message: &str,
    ) -> Vec<Inline>;
}

/// Regex tokenizer shared by all built-in syntaxes
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalColorizer;

impl LexicalColorizer {
    pub fn new() -> Self {
        LexicalColorizer
    }
}

impl Colorizer for LexicalColorizer {
    fn colorize(
        &self,
        syntax: &Syntax,
        code: &str,
    ) -> Vec<Inline> {
        let mut fragments = Vec::new();
        for caps in syntax.pattern().captures_iter(code) {
            let Some(token) = caps.get(0) else { continue };
            let text = token.as_str();
            let style = if caps.name("newline").is_some() {
                fragments.push(Inline::LineBreak);
                continue;
            } else if caps.name("comment").is_some() {
                Style::Comment
            } else if caps.name("string").is_some() {
                Style::String
            } else if caps.name("number").is_some() {
                Style::Number
            } else if caps.name("ident").is_some() {
                if syntax.is_keyword(text) {
                    Style::Keyword
                } else {
                    Style::Identifier
                }
            } else if caps.name("space").is_some() {
                Style::Whitespace
            } else {
                Style::Punctuation
            };
            fragments.push(Inline::run(text, style));
        }
        fragments
    }

    fn colorize_error(
        &self,
        message: &str,
    ) -> Vec<Inline> {
        let mut fragments = Vec::new();
        for (i, line) in message.split('\n').enumerate() {
            if i > 0 {
                fragments.push(Inline::LineBreak);
            }
            if !line.is_empty() {
                fragments.push(Inline::run(line, Style::Error));
            }
        }
        if fragments.is_empty() {
            fragments.push(Inline::run("", Style::Error));
        }
        fragments
    }
}
