//! Script Engine Abstraction
//!
//! Defines the capability contract every guest-language backend satisfies.
//!
//! This module contains:
//! - [`ScriptEngine`] - the integration seam with language runtimes
//! - [`GuestValue`] - values crossing that seam
//! - [`registry::EngineRegistry`] - available engines and the current one
//! - [`process::ProcessEngine`] - engines hosted in an external interpreter

use std::fmt;
use std::path::Path;

use crate::colorize::Syntax;
use crate::error::ReplResult;

pub mod process;
pub mod registry;

pub use process::{Dialect, LanguageProfile, ProcessEngine};
pub use registry::EngineRegistry;

/// Member invoked on a value to get its displayable form
pub const INSPECT_HOOK: &str = "as_markup";

/// A value produced by, or handed to, a guest engine
#[derive(Debug, Clone, PartialEq)]
pub enum GuestValue {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<GuestValue>),
    /// A guest object known only by its type and a printable form
    Object { type_name: String, repr: String },
    /// A rich visual element, not representable as text
    Element { type_name: String },
}

impl GuestValue {
    /// Stable type tag of the value
    pub fn type_name(&self) -> &str {
        match self {
            GuestValue::Nil => "NilClass",
            GuestValue::Bool(_) => "Boolean",
            GuestValue::Int(_) => "Integer",
            GuestValue::Float(_) => "Float",
            GuestValue::Str(_) => "String",
            GuestValue::List(_) => "Array",
            GuestValue::Object { type_name, .. } | GuestValue::Element { type_name } => type_name,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, GuestValue::Nil)
    }

    /// The text of a `Str`, `None` for everything else
    pub fn as_text(&self) -> Option<&str> {
        match self {
            GuestValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for GuestValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            GuestValue::Nil => write!(f, "nil"),
            GuestValue::Bool(b) => write!(f, "{}", b),
            GuestValue::Int(i) => write!(f, "{}", i),
            GuestValue::Float(x) => write!(f, "{:?}", x),
            GuestValue::Str(s) => write!(f, "{}", s),
            GuestValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            GuestValue::Object { repr, .. } => write!(f, "{}", repr),
            GuestValue::Element { type_name } => write!(f, "<{}>", type_name),
        }
    }
}

/// Guest engine trait
///
/// This trait defines the interface that all guest-language backends must
/// implement. Engines are driven from a single thread, one call at a time.
pub trait ScriptEngine {
    /// Language name, the key under which the engine is registered
    fn name(&self) -> &str;

    /// Evaluate code in the engine's persistent scope
    fn execute(
        &mut self,
        code: &str,
    ) -> ReplResult<GuestValue>;

    /// Standard output accumulated since the last read, then cleared
    fn read_captured_output(&mut self) -> Option<String>;

    /// Load a source file into the persistent scope
    fn require(
        &mut self,
        path: &Path,
    ) -> ReplResult<()>;

    /// Call `member` on `value`
    fn invoke_member(
        &mut self,
        value: &GuestValue,
        member: &str,
    ) -> ReplResult<GuestValue>;

    /// Bind a host value into the guest scope
    fn set_variable(
        &mut self,
        name: &str,
        value: GuestValue,
    ) -> ReplResult<()>;

    /// Recognized source-file extensions, leading dot included, in
    /// preference order
    fn file_extensions(&self) -> Vec<String>;

    /// Lexical rules used to colorize this language
    fn syntax(&self) -> Syntax {
        Syntax::plain()
    }
}
