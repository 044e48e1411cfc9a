//! Multi-language REPL core
//!
//! - [`session`]: engine registry, current language, `%name` directives
//! - [`inspector`]: per-type viewer loading
//! - [`renderer`]: outcome to document fragments
//! - [`pad`]: the interactive protocol over a document
//! - [`keymap`]: named actions and key chords
//! - [`plugins`]: default viewer bootstrap

pub mod inspector;
pub mod keymap;
pub mod pad;
pub mod plugins;
mod renderer;
pub mod session;

pub use inspector::{DirectoryViewers, InspectorLoader, ViewerSource};
pub use keymap::{Action, KeyChord, Keymap};
pub use pad::ReplPad;
pub use session::{Outcome, Session, DIRECTIVE_PREFIX};
