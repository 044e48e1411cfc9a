//! The interactive REPL surface
//!
//! [`ReplPad`] binds a [`Session`] to a [`Document`] and implements the
//! named actions. Running a selection echoes the input colorized, executes
//! it, renders the outcome below, and leaves the caret in a fresh empty run
//! ready for the next line.
//!
//! Failures are written into the document where the live selection ends.
//! Nothing inserted before the failure is rolled back, so the user sees how
//! far the run got.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crossterm::event::KeyEvent;
use tracing::{debug, warn};

use super::inspector::InspectorLoader;
use super::keymap::{Action, Keymap};
use super::session::Session;
use crate::colorize::{Colorizer, LexicalColorizer};
use crate::document::mutation::{insert_colorized_code, insert_error, insert_inline, insert_line_break};
use crate::document::{Document, Inline, InlineId, Style, TextRange};
use crate::engine::{GuestValue, ProcessEngine, ScriptEngine};
use crate::error::{ReplError, ReplResult};
use crate::util::config::{ConfigError, DocumentConfig, PluginPaths, ReplConfig};

pub struct ReplPad {
    session: Session,
    document: Document,
    colorizer: Box<dyn Colorizer>,
    keymap: Keymap,
    indent: String,
    save_path: PathBuf,
}

impl std::fmt::Debug for ReplPad {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ReplPad")
            .field("session", &self.session)
            .field("document", &self.document)
            .field("save_path", &self.save_path)
            .finish_non_exhaustive()
    }
}

impl ReplPad {
    /// A pad over an empty document with default settings
    pub fn new(session: Session) -> Self {
        let settings = DocumentConfig::default();
        Self {
            session,
            document: Document::new(),
            colorizer: Box::new(LexicalColorizer::new()),
            keymap: Keymap::default(),
            indent: settings.indent.clone(),
            save_path: settings.save_path(),
        }
    }

    /// Build process engines and plugin locations from configuration
    pub fn from_config(config: &ReplConfig) -> ReplResult<Self> {
        Self::build(config, config.plugins.resolve())
    }

    /// Like [`ReplPad::from_config`] with explicit plugin locations
    pub fn build(
        config: &ReplConfig,
        paths: PluginPaths,
    ) -> ReplResult<Self> {
        config.validate()?;

        let mut engines = Vec::with_capacity(config.engines.len());
        for engine in &config.engines {
            let engine: Box<dyn ScriptEngine> = Box::new(ProcessEngine::from_config(engine)?);
            engines.push(engine);
        }
        let mut engines = engines.into_iter();
        let (Some(primary), Some(secondary)) = (engines.next(), engines.next()) else {
            return Err(ConfigError::Invalid("at least two engines are required".to_string()).into());
        };

        let mut session = Session::new(primary, secondary, InspectorLoader::from_dir(paths.viewers_dir.clone()));
        for engine in engines {
            session.register(engine);
        }
        match session.bootstrap_plugins(&paths.plugins_dir) {
            Ok(_) => {}
            // Values still render through the engine's own fallback
            Err(ReplError::GuestExecution(message)) => {
                warn!("default viewer not loaded: {}", message);
            }
            Err(err) => return Err(err),
        }

        Ok(Self::new(session).with_settings(&config.document))
    }

    pub fn with_document(
        mut self,
        document: Document,
    ) -> Self {
        self.document = document;
        self
    }

    pub fn with_colorizer(
        mut self,
        colorizer: Box<dyn Colorizer>,
    ) -> Self {
        self.colorizer = colorizer;
        self
    }

    pub fn with_keymap(
        mut self,
        keymap: Keymap,
    ) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn with_settings(
        mut self,
        settings: &DocumentConfig,
    ) -> Self {
        self.indent = settings.indent.clone();
        self.save_path = settings.save_path();
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn save_path(&self) -> &std::path::Path {
        &self.save_path
    }

    /// Type text at the caret
    pub fn type_text(
        &mut self,
        text: &str,
    ) {
        self.document.insert_text_at_caret(text);
    }

    /// Expose a host value to the current engine
    pub fn bind(
        &mut self,
        name: &str,
        value: GuestValue,
    ) -> ReplResult<()> {
        self.session.bind(name, value)
    }

    /// Run the text of `selection`, given in either order. An empty
    /// selection only moves the caret to its start. Returns the inline the
    /// caret ended up in, or the last error fragment.
    pub fn run_selection(
        &mut self,
        selection: TextRange,
    ) -> InlineId {
        let selection = self.document.ordered(selection);
        if self.document.text(selection).is_empty() {
            let inline = self.document.inline_under(selection.start);
            self.document.set_caret(selection.start);
            return inline;
        }

        match self.try_run_selection(selection) {
            Ok(prompt) => prompt,
            Err(err) => {
                warn!("run failed: {}", err);
                let live = self.document.ordered(self.document.selection());
                let anchor = self.document.inline_under(live.end);
                insert_error(&mut self.document, self.colorizer.as_ref(), anchor, &err.to_string())
            }
        }
    }

    fn try_run_selection(
        &mut self,
        selection: TextRange,
    ) -> ReplResult<InlineId> {
        let code = self.document.text(selection);
        let syntax = self.session.current_syntax();
        let colorizer = self.colorizer.as_ref();

        let anchor = self.document.inline_under(selection.end);
        let echo = insert_colorized_code(&mut self.document, colorizer, &syntax, anchor, &code);
        let gap = insert_line_break(&mut self.document, echo);

        let outcome = self.session.execute(&code)?;
        let rendered = self
            .session
            .render(&mut self.document, colorizer, outcome, gap)?;

        let gap = insert_line_break(&mut self.document, rendered);
        let prompt = insert_inline(&mut self.document, gap, Inline::plain(""));
        self.document.replace(selection, "");

        let caret = self.document.start_of(prompt);
        self.document.set_caret(caret);
        debug!("run finished, caret at {}", prompt);
        Ok(prompt)
    }

    /// Run the live selection
    pub fn run_live_selection(&mut self) -> InlineId {
        let selection = self.document.selection();
        self.run_selection(selection)
    }

    /// Run from the start of the caret's line up to the caret
    pub fn run_current_line(&mut self) -> InlineId {
        let caret = self.document.caret();
        let start = self.document.line_start(caret);
        self.run_selection(TextRange::new(start, caret))
    }

    /// Line break plus an empty run after the run under the caret; the caret
    /// moves into the new run
    pub fn insert_smart_line_break(&mut self) -> InlineId {
        let anchor = self.document.inline_under(self.document.caret());
        let gap = insert_line_break(&mut self.document, anchor);
        let run = insert_inline(&mut self.document, gap, Inline::plain(""));
        let caret = self.document.start_of(run);
        self.document.set_caret(caret);
        run
    }

    pub fn indent(&mut self) {
        let indent = self.indent.clone();
        self.document.insert_text_at_caret(&indent);
    }

    /// Drop the styling of the run under the caret
    pub fn reset_style_under_cursor(&mut self) {
        let run = self.document.inline_under(self.document.caret());
        self.document.set_style(run, Style::None);
    }

    /// Write the document as JSON
    pub fn save_to<W: Write>(
        &self,
        writer: W,
    ) -> ReplResult<()> {
        serde_json::to_writer_pretty(writer, &self.document.snapshot())?;
        Ok(())
    }

    /// Write the document to the configured save path
    pub fn save(&self) -> ReplResult<PathBuf> {
        let mut writer = BufWriter::new(File::create(&self.save_path)?);
        self.save_to(&mut writer)?;
        writer.flush()?;
        debug!("document saved to {}", self.save_path.display());
        Ok(self.save_path.clone())
    }

    /// Perform a named action
    pub fn perform(
        &mut self,
        action: Action,
    ) -> ReplResult<()> {
        match action {
            Action::RunSelection => {
                self.run_live_selection();
            }
            Action::RunCurrentLine => {
                self.run_current_line();
            }
            Action::InsertLineBreak => {
                self.insert_smart_line_break();
            }
            Action::Indent => self.indent(),
            Action::Save => {
                self.save()?;
            }
            Action::ResetStyle => self.reset_style_under_cursor(),
        }
        Ok(())
    }

    /// Perform the action bound to a key event; `false` if none is bound
    pub fn handle_key(
        &mut self,
        event: &KeyEvent,
    ) -> ReplResult<bool> {
        match self.keymap.action_for(event) {
            Some(action) => {
                debug!("key {:?} -> {}", event.code, action);
                self.perform(action)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
