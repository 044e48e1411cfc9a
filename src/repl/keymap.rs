//! Named actions and their default key chords
//!
//! The pad only knows actions; input layers translate key events through a
//! [`Keymap`]. Modifiers must match exactly, so `Enter` and `Ctrl+Enter`
//! are different chords.

use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Something the pad can do in response to input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    RunSelection,
    RunCurrentLine,
    InsertLineBreak,
    Indent,
    Save,
    ResetStyle,
}

impl fmt::Display for Action {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Action::RunSelection => "run-selection",
            Action::RunCurrentLine => "run-current-line",
            Action::InsertLineBreak => "insert-line-break",
            Action::Indent => "indent",
            Action::Save => "save",
            Action::ResetStyle => "reset-style-under-cursor",
        };
        write!(f, "{}", name)
    }
}

/// A key plus the exact modifier set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyChord {
    pub const fn new(
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CONTROL)
    }

    /// Chord of a key event; letters are folded to lower case
    pub fn from_event(event: &KeyEvent) -> Self {
        let code = match event.code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };
        Self::new(code, event.modifiers)
    }
}

/// Key chord to action table
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<KeyChord, Action>,
}

impl Default for Keymap {
    fn default() -> Self {
        let mut keymap = Self::empty();
        keymap.bind(KeyChord::ctrl(KeyCode::Char('e')), Action::RunSelection);
        keymap.bind(KeyChord::plain(KeyCode::Enter), Action::InsertLineBreak);
        keymap.bind(KeyChord::plain(KeyCode::Tab), Action::Indent);
        keymap.bind(KeyChord::ctrl(KeyCode::Char('s')), Action::Save);
        keymap.bind(KeyChord::ctrl(KeyCode::Enter), Action::RunCurrentLine);
        keymap.bind(KeyChord::ctrl(KeyCode::Char(' ')), Action::ResetStyle);
        keymap
    }
}

impl Keymap {
    /// No bindings at all
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind a chord, replacing any previous action
    pub fn bind(
        &mut self,
        chord: KeyChord,
        action: Action,
    ) {
        self.bindings.insert(chord, action);
    }

    pub fn unbind(
        &mut self,
        chord: &KeyChord,
    ) -> Option<Action> {
        self.bindings.remove(chord)
    }

    /// Action for a key press; releases never trigger anything
    pub fn action_for(
        &self,
        event: &KeyEvent,
    ) -> Option<Action> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        self.bindings.get(&KeyChord::from_event(event)).copied()
    }

    /// Chords bound to `action`
    pub fn chords_for(
        &self,
        action: Action,
    ) -> Vec<KeyChord> {
        self.bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(chord, _)| *chord)
            .collect()
    }
}
