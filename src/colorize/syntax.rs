//! Per-language lexical syntax used for colorization

use std::collections::HashSet;

use regex::Regex;

const RUBY_KEYWORDS: &[&str] = &[
    "alias", "and", "begin", "break", "case", "class", "def", "defined?", "do", "else", "elsif",
    "end", "ensure", "false", "for", "if", "in", "module", "next", "nil", "not", "or", "redo",
    "rescue", "retry", "return", "self", "super", "then", "true", "undef", "unless", "until",
    "when", "while", "yield", "require", "puts",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield", "print",
];

/// Lexical rules of one guest language
///
/// The token pattern matches every character of its input, which keeps
/// colorization lossless.
#[derive(Debug, Clone)]
pub struct Syntax {
    name: String,
    keywords: HashSet<String>,
    pattern: Regex,
}

impl Syntax {
    /// Build a syntax from its keyword list and optional line-comment prefix
    pub fn new(
        name: impl Into<String>,
        keywords: &[&str],
        line_comment: Option<&str>,
    ) -> Self {
        let mut alternatives = Vec::new();
        if let Some(prefix) = line_comment.filter(|p| !p.is_empty()) {
            alternatives.push(format!(r"(?P<comment>{}[^\n]*)", regex::escape(prefix)));
        }
        alternatives.push(r#"(?P<string>"(?:\\.|[^"\\\n])*"?|'(?:\\.|[^'\\\n])*'?)"#.to_string());
        alternatives.push(r"(?P<number>\d+(?:\.\d+)?)".to_string());
        alternatives.push(r"(?P<ident>[\p{L}_][\p{L}\p{N}_]*[?!]?)".to_string());
        alternatives.push(r"(?P<newline>\n)".to_string());
        alternatives.push(r"(?P<space>[^\S\n]+)".to_string());
        alternatives.push(r"(?P<punct>.)".to_string());

        let pattern = Regex::new(&alternatives.join("|"))
            .unwrap_or_else(|e| panic!("built-in token pattern failed to compile: {}", e));

        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            pattern,
        }
    }

    pub fn ruby() -> Self {
        Self::new("ruby", RUBY_KEYWORDS, Some("#"))
    }

    pub fn python() -> Self {
        Self::new("python", PYTHON_KEYWORDS, Some("#"))
    }

    /// No keywords, no comments
    pub fn plain() -> Self {
        Self::new("plain", &[], None)
    }

    /// Preset by name, `plain` for anything unknown
    pub fn by_name(name: &str) -> Self {
        match name {
            "ruby" => Self::ruby(),
            "python" => Self::python(),
            _ => Self::plain(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_keyword(
        &self,
        word: &str,
    ) -> bool {
        self.keywords.contains(word)
    }

    pub(crate) fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

impl Default for Syntax {
    fn default() -> Self {
        Self::plain()
    }
}
