//! Default viewer bootstrap
//!
//! On first run the packaged default viewer is copied into the plugins
//! directory; after that the file on disk is used, so users can edit it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::engine::ScriptEngine;
use crate::error::ReplResult;

/// File name of the default viewer inside the plugins directory
pub const DEFAULT_VIEWER: &str = "default.viewer.rb";

const DEFAULT_VIEWER_SOURCE: &str = include_str!("../../resources/default.viewer.rb");

/// Ensure the default viewer exists and require it into `engine`.
///
/// The viewer is Ruby; an engine that does not recognize `.rb` gets the
/// file installed but not loaded, and `None` is returned.
pub fn bootstrap(
    plugins_dir: &Path,
    engine: &mut dyn ScriptEngine,
) -> ReplResult<Option<PathBuf>> {
    fs::create_dir_all(plugins_dir)?;

    let viewer = plugins_dir.join(DEFAULT_VIEWER);
    if !viewer.is_file() {
        debug!("installing default viewer at {}", viewer.display());
        fs::write(&viewer, DEFAULT_VIEWER_SOURCE)?;
    }

    if !engine.file_extensions().iter().any(|ext| ext == ".rb") {
        debug!("{} does not load .rb viewers, skipping default viewer", engine.name());
        return Ok(None);
    }

    engine.require(&viewer)?;
    Ok(Some(viewer))
}
