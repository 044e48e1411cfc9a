//! REPL session and execution dispatcher
//!
//! The session owns every piece of mutable REPL state: the engine registry
//! (and with it the current language), the viewer memo, and the name of the
//! engine that renders inspected values. It is driven from one thread, one
//! operation at a time; hosts that can dispatch input concurrently must
//! serialize calls into it.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::inspector::InspectorLoader;
use super::plugins;
use crate::colorize::Syntax;
use crate::engine::{EngineRegistry, GuestValue, ScriptEngine};
use crate::error::ReplResult;

/// Prefix of a language-switch directive (`%python`)
pub const DIRECTIVE_PREFIX: char = '%';

/// Result of dispatching one piece of input
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A directive made this language current
    Switched(String),
    /// Whatever the engine returned, untouched
    Value(GuestValue),
}

impl fmt::Display for Outcome {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Outcome::Switched(language) => write!(f, "Switched to {}", language),
            Outcome::Value(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug)]
pub struct Session {
    pub(super) registry: EngineRegistry,
    pub(super) inspector: InspectorLoader,
    /// Engine rendering inspected values, whatever language is current.
    /// Fixed at construction.
    pub(super) inspector_engine: String,
}

impl Session {
    /// Register two engines; `primary` becomes current and renders inspected
    /// values for the rest of the session.
    pub fn new(
        primary: Box<dyn ScriptEngine>,
        secondary: Box<dyn ScriptEngine>,
        inspector: InspectorLoader,
    ) -> Self {
        let inspector_engine = primary.name().to_string();
        let mut registry = EngineRegistry::new(primary);
        registry.register(secondary);
        debug!(
            "session started with {:?}, current '{}'",
            registry.names(),
            registry.current_name()
        );
        Self {
            registry,
            inspector,
            inspector_engine,
        }
    }

    /// Add another engine after construction
    pub fn register(
        &mut self,
        engine: Box<dyn ScriptEngine>,
    ) {
        self.registry.register(engine);
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    pub fn current_name(&self) -> &str {
        self.registry.current_name()
    }

    pub fn inspector_engine_name(&self) -> &str {
        &self.inspector_engine
    }

    pub fn inspector(&self) -> &InspectorLoader {
        &self.inspector
    }

    /// Syntax of the current language
    pub fn current_syntax(&self) -> Syntax {
        self.registry.current().syntax()
    }

    /// Dispatch raw input: `%name` switches language, anything else runs
    /// verbatim in the current engine.
    pub fn execute(
        &mut self,
        raw: &str,
    ) -> ReplResult<Outcome> {
        if let Some(directive) = raw.strip_prefix(DIRECTIVE_PREFIX) {
            let language = directive.trim();
            self.registry.set_current(language)?;
            info!("switched to {}", language);
            return Ok(Outcome::Switched(language.to_string()));
        }

        debug!("executing {} bytes in {}", raw.len(), self.registry.current_name());
        self.registry.current_mut().execute(raw).map(Outcome::Value)
    }

    /// Expose a host value to the current engine under `name`
    pub fn bind(
        &mut self,
        name: &str,
        value: GuestValue,
    ) -> ReplResult<()> {
        debug!("binding {} in {}", name, self.registry.current_name());
        self.registry.current_mut().set_variable(name, value)
    }

    /// Install the default viewer into the plugins dir and load it into the
    /// inspecting engine
    pub fn bootstrap_plugins(
        &mut self,
        plugins_dir: &Path,
    ) -> ReplResult<Option<PathBuf>> {
        let engine = self.inspecting_engine();
        plugins::bootstrap(plugins_dir, engine)
    }

    pub(super) fn inspecting_engine(&mut self) -> &mut (dyn ScriptEngine + 'static) {
        match self.registry.get_mut(&self.inspector_engine) {
            Ok(engine) => engine,
            Err(_) => panic!("inspecting engine '{}' is not registered", self.inspector_engine),
        }
    }
}
