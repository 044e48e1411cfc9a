//! Line-based terminal front-end with rustyline
//!
//! Every line is typed into the pad's document at the caret and run with
//! "run current line"; the fragments it produced are printed. The document
//! keeps the whole transcript, so `:doc` and `:save` see everything.

use std::collections::HashSet;
use std::io;
use std::path::PathBuf;

use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{EditMode, Editor};
use tracing::debug;

use crate::document::mutation::{insert_inline, insert_line_break};
use crate::document::{Document, Inline, InlineId, Style};
use crate::error::{ReplError, ReplResult};
use crate::repl::ReplPad;
use crate::util::config::get_config_dir;

mod commands;
mod render;

pub use commands::{parse_host_value, CommandHandler, CommandResult};
pub use render::{paint, render_document, render_leaves};

/// Line REPL configuration
#[derive(Debug, Clone)]
pub struct LineReplConfig {
    /// Colorize fragments with ANSI escapes
    pub colors: bool,
    /// Enable VI mode
    pub vi_mode: bool,
    /// History file path
    pub history_file: Option<PathBuf>,
}

impl Default for LineReplConfig {
    fn default() -> Self {
        Self {
            colors: true,
            vi_mode: false,
            history_file: get_config_dir().map(|dir| dir.join("history.txt")),
        }
    }
}

/// Line REPL
pub struct LineRepl {
    config: LineReplConfig,
    editor: Editor<(), FileHistory>,
    pad: ReplPad,
}

impl LineRepl {
    pub fn new(pad: ReplPad) -> ReplResult<Self> {
        Self::with_config(pad, LineReplConfig::default())
    }

    /// Create with custom config
    pub fn with_config(
        pad: ReplPad,
        config: LineReplConfig,
    ) -> ReplResult<Self> {
        let rl_config = Config::builder()
            .history_ignore_space(true)
            .edit_mode(if config.vi_mode {
                EditMode::Vi
            } else {
                EditMode::Emacs
            })
            .build();

        let mut editor = Editor::with_config(rl_config).map_err(readline_error)?;

        if let Some(ref history_file) = config.history_file {
            if history_file.exists() {
                let _ = editor.load_history(history_file);
            }
        }

        Ok(Self { config, editor, pad })
    }

    /// Run the REPL until `:quit` or Ctrl-D
    pub fn run(&mut self) -> ReplResult<()> {
        println!("replpad {} - Type :help for assistance", crate::VERSION);
        println!("Press Ctrl+D or :quit to exit\n");

        loop {
            let prompt = format!("{}> ", self.pad.session().current_name());
            match self.editor.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line.as_str());

                    let mut handler = CommandHandler::new(&mut self.pad, self.config.colors);
                    match handler.handle(&line) {
                        Some(CommandResult::Exit) => break,
                        Some(CommandResult::Continue) => continue,
                        Some(CommandResult::Output(msg)) => {
                            println!("{}", msg);
                            continue;
                        }
                        None => {}
                    }

                    let output = eval_line(&mut self.pad, &line, self.config.colors);
                    if !output.is_empty() {
                        println!("{}", output);
                    }
                }
                Err(ReadlineError::Eof) => break,
                Err(ReadlineError::Interrupted) => {
                    println!("(Interrupted)");
                    continue;
                }
                Err(e) => return Err(readline_error(e)),
            }
        }

        if let Some(ref history_file) = self.config.history_file {
            if let Some(parent) = history_file.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Err(e) = self.editor.save_history(history_file) {
                debug!("could not save history: {}", e);
            }
        }
        Ok(())
    }

    pub fn pad(&self) -> &ReplPad {
        &self.pad
    }

    pub fn pad_mut(&mut self) -> &mut ReplPad {
        &mut self.pad
    }
}

fn readline_error(e: ReadlineError) -> ReplError {
    ReplError::Io(io::Error::other(format!("Readline error: {}", e)))
}

/// Type `line` at the caret, run the current line and render what the run
/// added to the document.
///
/// The echo of the input is left out. On failure only the error fragments
/// are rendered and the caret moves to a new line at the end of the
/// document, so the failed input is not typed over.
pub fn eval_line(
    pad: &mut ReplPad,
    line: &str,
    colors: bool,
) -> String {
    let before: HashSet<InlineId> = pad.document().leaves().into_iter().collect();
    pad.type_text(line);
    pad.run_current_line();

    let document = pad.document();
    let fresh: Vec<InlineId> = document
        .leaves()
        .into_iter()
        .filter(|leaf| !before.contains(leaf))
        .collect();

    let is_error = |leaf: &InlineId| document.style(*leaf) == Some(Style::Error);
    let (shown, failed) = match fresh.iter().rposition(is_error) {
        Some(last_error) => (&fresh[..=last_error], true),
        None => {
            let first_break = fresh
                .iter()
                .position(|leaf| document.run_text(*leaf).is_none())
                .map_or(fresh.len(), |i| i + 1);
            (&fresh[first_break..], false)
        }
    };
    let output = render_leaves(document, shown, colors)
        .trim_end_matches('\n')
        .to_string();

    if failed {
        start_fresh_line(pad.document_mut());
    }
    output
}

fn start_fresh_line(document: &mut Document) {
    let Some(last) = document.leaves().last().copied() else {
        return;
    };
    let anchor = match document.run_text(last) {
        Some(_) => insert_line_break(document, last),
        None => last,
    };
    let prompt = insert_inline(document, anchor, Inline::plain(""));
    let caret = document.start_of(prompt);
    document.set_caret(caret);
}
