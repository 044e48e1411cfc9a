//! Engine Registry
//!
//! Available engines keyed by language name, plus the name of the current
//! one. The current engine is a separate key rather than a flag on the
//! entries, so two entries can never both claim it.

use indexmap::IndexMap;
use tracing::debug;

use super::ScriptEngine;
use crate::error::{ReplError, ReplResult};

pub struct EngineRegistry {
    engines: IndexMap<String, Box<dyn ScriptEngine>>,
    current: String,
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("engines", &self.engines.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .finish()
    }
}

impl EngineRegistry {
    /// Create a registry whose first engine is current
    pub fn new(first: Box<dyn ScriptEngine>) -> Self {
        let current = first.name().to_string();
        let mut engines = IndexMap::new();
        engines.insert(current.clone(), first);
        Self { engines, current }
    }

    /// Insert or replace an engine under its own name
    pub fn register(
        &mut self,
        engine: Box<dyn ScriptEngine>,
    ) {
        let name = engine.name().to_string();
        debug!("registering engine '{}'", name);
        self.engines.insert(name, engine);
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.engines.contains_key(name)
    }

    pub fn get(
        &self,
        name: &str,
    ) -> ReplResult<&dyn ScriptEngine> {
        self.engines
            .get(name)
            .map(|engine| &**engine)
            .ok_or_else(|| ReplError::UnknownLanguage(name.to_string()))
    }

    pub fn get_mut(
        &mut self,
        name: &str,
    ) -> ReplResult<&mut (dyn ScriptEngine + 'static)> {
        self.engines
            .get_mut(name)
            .map(|engine| &mut **engine)
            .ok_or_else(|| ReplError::UnknownLanguage(name.to_string()))
    }

    pub fn current_name(&self) -> &str {
        &self.current
    }

    /// The current engine
    ///
    /// Panics if the current name has no entry; the registry never lets
    /// that happen.
    pub fn current(&self) -> &dyn ScriptEngine {
        match self.engines.get(&self.current) {
            Some(engine) => &**engine,
            None => panic!("current engine '{}' is not registered", self.current),
        }
    }

    pub fn current_mut(&mut self) -> &mut (dyn ScriptEngine + 'static) {
        match self.engines.get_mut(&self.current) {
            Some(engine) => &mut **engine,
            None => panic!("current engine '{}' is not registered", self.current),
        }
    }

    /// Make `name` current; unknown names leave the selection untouched
    pub fn set_current(
        &mut self,
        name: &str,
    ) -> ReplResult<()> {
        if !self.contains(name) {
            return Err(ReplError::UnknownLanguage(name.to_string()));
        }
        self.current = name.to_string();
        Ok(())
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.engines.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
