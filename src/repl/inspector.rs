//! Inspector Loader
//!
//! Loads a per-type viewer file the first time a value of that type is
//! about to be inspected. A viewer is guest source named
//! `<type name>.viewer<extension>`; requiring it may define or override the
//! inspection hook for the type. Each type is probed at most once per
//! session, whether or not a viewer exists.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::engine::{GuestValue, ScriptEngine};
use crate::error::ReplResult;

/// File name of the viewer for one type and extension
pub fn viewer_file_name(
    type_name: &str,
    extension: &str,
) -> String {
    format!("{}.viewer{}", type_name, extension)
}

/// Where viewer files are looked up
pub trait ViewerSource {
    /// Path of the viewer for `type_name` in the language of `extension`
    fn locate(
        &self,
        type_name: &str,
        extension: &str,
    ) -> Option<PathBuf>;
}

/// Viewers stored flat in one directory
#[derive(Debug, Clone)]
pub struct DirectoryViewers {
    dir: PathBuf,
}

impl DirectoryViewers {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ViewerSource for DirectoryViewers {
    fn locate(
        &self,
        type_name: &str,
        extension: &str,
    ) -> Option<PathBuf> {
        let path = self.dir.join(viewer_file_name(type_name, extension));
        path.is_file().then_some(path)
    }
}

/// Per-session memo of which types have been probed for viewers
pub struct InspectorLoader {
    /// type name -> a viewer was found and required
    viewers: HashMap<String, bool>,
    source: Box<dyn ViewerSource>,
}

impl std::fmt::Debug for InspectorLoader {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("InspectorLoader")
            .field("viewers", &self.viewers)
            .finish_non_exhaustive()
    }
}

impl InspectorLoader {
    pub fn new(source: Box<dyn ViewerSource>) -> Self {
        Self {
            viewers: HashMap::new(),
            source,
        }
    }

    /// Look viewers up in a directory
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(DirectoryViewers::new(dir)))
    }

    /// Make sure the viewer for `value`'s type, if any, is loaded into
    /// `engine`. Nil values and already visited types are skipped. The type
    /// is marked visited before requiring, so a broken viewer file is not
    /// retried.
    pub fn ensure_loaded(
        &mut self,
        value: &GuestValue,
        engine: &mut dyn ScriptEngine,
    ) -> ReplResult<()> {
        if value.is_nil() {
            return Ok(());
        }

        let type_name = value.type_name();
        if self.viewers.contains_key(type_name) {
            return Ok(());
        }
        self.viewers.insert(type_name.to_string(), false);

        for extension in engine.file_extensions() {
            if let Some(path) = self.source.locate(type_name, &extension) {
                debug!("loading viewer {} into {}", path.display(), engine.name());
                engine.require(&path)?;
                self.viewers.insert(type_name.to_string(), true);
            }
        }

        if self.viewers.get(type_name) == Some(&false) {
            debug!("no viewer for {}, default inspection applies", type_name);
        }
        Ok(())
    }

    /// Whether the type has been probed
    pub fn is_visited(
        &self,
        type_name: &str,
    ) -> bool {
        self.viewers.contains_key(type_name)
    }

    /// Whether a viewer file was loaded for the type
    pub fn has_viewer(
        &self,
        type_name: &str,
    ) -> bool {
        self.viewers.get(type_name).copied().unwrap_or(false)
    }

    pub fn visited_count(&self) -> usize {
        self.viewers.len()
    }
}
