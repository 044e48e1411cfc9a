//! ReplPad configuration system
//!
//! A single user-level TOML file, every section optional.
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. CLI arguments
//! 2. Environment variables (REPL_PLUGINS)
//! 3. User-level (~/.config/replpad/config.toml)
//! 4. Default values
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use replpad::util::config::load_user_config;
//!
//! let config = load_user_config().unwrap();
//! let plugins = config.plugins.resolve();
//! println!("viewers live in {}", plugins.viewers_dir.display());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the plugins directory
pub const PLUGINS_ENV: &str = "REPL_PLUGINS";

/// Directory name used under the home directory when nothing else is set
pub const DEFAULT_PLUGINS_DIR: &str = "ReplPlugins";

/// Sub-directory of the plugins dir holding per-type viewer files
pub const DEFAULT_VIEWERS_DIR: &str = "Viewers";

/// User-level configuration for ReplPad
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplConfig {
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
    /// Plugin and viewer locations
    #[serde(default)]
    pub plugins: PluginConfig,
    /// Document editing settings
    #[serde(default)]
    pub document: DocumentConfig,
    /// Guest languages, in registration order. The first one starts as the
    /// current language and renders inspected values.
    #[serde(default = "default_engines")]
    pub engines: Vec<EngineConfig>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            plugins: PluginConfig::default(),
            document: DocumentConfig::default(),
            engines: default_engines(),
        }
    }
}

impl ReplConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ReplConfig = toml::from_str(content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file from an explicit path
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(ConfigError::IoError)?;
        Self::from_toml(&content)
    }

    /// Check semantic constraints serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engines.len() < 2 {
            return Err(ConfigError::Invalid(format!(
                "at least two engines are required, found {}",
                self.engines.len()
            )));
        }

        let mut seen = HashSet::new();
        for engine in &self.engines {
            if engine.name.trim().is_empty() {
                return Err(ConfigError::Invalid("engine name is empty".to_string()));
            }
            if engine.program.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "engine '{}' has no program",
                    engine.name
                )));
            }
            if !seen.insert(engine.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "engine '{}' is configured twice",
                    engine.name
                )));
            }
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// One of `debug`, `info`, `warn`, `error`
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Plugin configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PluginConfig {
    /// Plugins directory (the `REPL_PLUGINS` variable wins over this)
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Viewers directory, defaults to `<plugins dir>/Viewers`
    #[serde(default)]
    pub viewers_dir: Option<PathBuf>,
}

/// Fully resolved plugin locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginPaths {
    pub plugins_dir: PathBuf,
    pub viewers_dir: PathBuf,
}

impl PluginConfig {
    /// Resolve directories against the environment and the home directory
    pub fn resolve(&self) -> PluginPaths {
        let plugins_dir = resolve_plugins_dir(
            std::env::var(PLUGINS_ENV).ok(),
            self.dir.clone(),
            dirs::home_dir(),
        );
        self.resolve_with(plugins_dir)
    }

    /// Resolve the viewers directory for an already known plugins dir
    pub fn resolve_with(
        &self,
        plugins_dir: PathBuf,
    ) -> PluginPaths {
        let viewers_dir = self
            .viewers_dir
            .clone()
            .unwrap_or_else(|| plugins_dir.join(DEFAULT_VIEWERS_DIR));
        PluginPaths {
            plugins_dir,
            viewers_dir,
        }
    }
}

/// Pick the plugins directory: environment override, then configured
/// value, then `<home>/ReplPlugins`, then the working directory.
pub fn resolve_plugins_dir(
    env_override: Option<String>,
    configured: Option<PathBuf>,
    home: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = env_override.filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir);
    }
    if let Some(dir) = configured {
        return dir;
    }
    home.unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_PLUGINS_DIR)
}

/// Document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Text inserted by the indent action
    #[serde(default = "default_indent")]
    pub indent: String,
    /// Where the save action writes the document
    #[serde(default)]
    pub save_path: Option<PathBuf>,
}

fn default_indent() -> String {
    "  ".to_string()
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            indent: default_indent(),
            save_path: None,
        }
    }
}

impl DocumentConfig {
    /// Save path, falling back to the temp directory
    pub fn save_path(&self) -> PathBuf {
        self.save_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("replpad-document.json"))
    }
}

/// One process-hosted guest language
///
/// `preset` selects built-in literal spellings, templates and syntax
/// (`ruby`, `python`); any field set here overrides the preset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Language name used by `%name` directives
    pub name: String,
    /// Interpreter executable
    pub program: String,
    /// Arguments placed before the code argument
    #[serde(default)]
    pub args: Vec<String>,
    /// Built-in profile to start from
    #[serde(default)]
    pub preset: Option<String>,
    /// Source-file extensions, with the leading dot
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    /// Template for calling a member: `{receiver}`, `{member}`
    #[serde(default)]
    pub invoke_template: Option<String>,
    /// Template for binding a variable: `{name}`, `{value}`
    #[serde(default)]
    pub assign_template: Option<String>,
    /// Template printing the `{marker}` line that ends replayed code
    #[serde(default)]
    pub marker_template: Option<String>,
}

impl EngineConfig {
    /// `ruby -e <code>`
    pub fn ruby() -> Self {
        Self::preset("ruby", "ruby", &["-e"])
    }

    /// `python3 -c <code>`
    pub fn python() -> Self {
        Self::preset("python", "python3", &["-c"])
    }

    fn preset(
        name: &str,
        program: &str,
        args: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            preset: Some(name.to_string()),
            extensions: None,
            invoke_template: None,
            assign_template: None,
            marker_template: None,
        }
    }
}

fn default_engines() -> Vec<EngineConfig> {
    vec![EngineConfig::ruby(), EngineConfig::python()]
}

/// Get the user config directory
pub fn get_config_dir() -> Option<PathBuf> {
    // Try XDG config directory on Unix
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join("replpad"));
    }

    // Fallback to ~/.config/replpad
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home).join(".config").join("replpad"));
    }

    // On Windows, try %APPDATA%
    if let Ok(appdata) = std::env::var("APPDATA") {
        return Some(PathBuf::from(appdata).join("replpad"));
    }

    None
}

/// Get the user config file path (~/.config/replpad/config.toml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}

/// Load user-level configuration
/// Returns default config if file doesn't exist
pub fn load_user_config() -> Result<ReplConfig, ConfigError> {
    let path = match get_config_path() {
        Some(p) => p,
        None => return Ok(ReplConfig::default()),
    };

    if !path.exists() {
        return Ok(ReplConfig::default());
    }

    ReplConfig::load(&path)
}

/// Save user-level configuration
pub fn save_user_config(config: &ReplConfig) -> Result<(), ConfigError> {
    let dir = get_config_dir().ok_or(ConfigError::NoConfigDir)?;
    let path = dir.join("config.toml");

    if !dir.exists() {
        fs::create_dir_all(&dir).map_err(ConfigError::IoError)?;
    }

    let content = toml::to_string_pretty(config).map_err(ConfigError::SerializeError)?;
    fs::write(&path, content).map_err(ConfigError::IoError)?;

    Ok(())
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(toml::de::Error),
    SerializeError(toml::ser::Error),
    NoConfigDir,
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Config parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Config serialize error: {}", e),
            ConfigError::NoConfigDir => write!(f, "Cannot determine config directory"),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
