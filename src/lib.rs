//! ReplPad
//!
//! A multi-language REPL hosted inside a rich-text document. Input typed into
//! the document runs in one of several guest language engines; the echoed
//! input, captured output or inspected result, and errors are written back
//! into the document as styled fragments.
//!
//! # Example
//!
//! ```no_run
//! use replpad::{ReplConfig, ReplPad};
//!
//! fn main() -> replpad::ReplResult<()> {
//!     let mut pad = ReplPad::from_config(&ReplConfig::default())?;
//!     pad.type_text("puts 1 + 1");
//!     pad.run_current_line();
//!     println!("{}", pad.document().plain_text());
//!     Ok(())
//! }
//! ```

#![warn(rust_2018_idioms)]

pub mod colorize;
pub mod document;
pub mod engine;
pub mod error;
pub mod repl;
pub mod terminal;

// Utility modules
pub mod util;

// Re-exports
pub use colorize::{Colorizer, LexicalColorizer, Syntax};
pub use document::{Document, Inline, InlineId, Style, TextPointer, TextRange};
pub use engine::{EngineRegistry, GuestValue, ProcessEngine, ScriptEngine};
pub use error::{ReplError, ReplResult};
pub use repl::{Action, InspectorLoader, Keymap, Outcome, ReplPad, Session};
pub use util::config::ReplConfig;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Program name
pub const NAME: &str = "ReplPad";
