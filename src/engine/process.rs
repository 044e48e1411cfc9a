//! Process-hosted guest engines
//!
//! Each call runs a fresh interpreter process (`program args... <script>`).
//! Persistence across calls comes from a prelude: required files, bound
//! variables and every piece of code that executed successfully are
//! replayed in front of each new script. A marker line printed between the
//! prelude and the new code separates replayed output from fresh output, so
//! only the latter is captured. Replayed code repeats its side effects
//! outside the process (files written, network calls).
//!
//! Nothing enters the prelude unless a run containing it succeeded, so one
//! bad binding or viewer file cannot break later runs.
//!
//! There is no live value channel back from the process: `execute` always
//! yields `nil`, and whatever the code prints is the captured output.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use super::{GuestValue, ScriptEngine};
use crate::colorize::Syntax;
use crate::error::{ReplError, ReplResult};
use crate::util::config::{ConfigError, EngineConfig};

/// Line printed after the replayed prelude
pub const REPLAY_MARKER: &str = "__replpad_replay_done__";

const RUBY_RESERVED: &[&str] = &[
    "BEGIN", "END", "alias", "and", "begin", "break", "case", "class", "def", "defined?", "do",
    "else", "elsif", "end", "ensure", "false", "for", "if", "in", "module", "next", "nil", "not",
    "or", "redo", "rescue", "retry", "return", "self", "super", "then", "true", "undef",
    "unless", "until", "when", "while", "yield", "__FILE__", "__LINE__", "__ENCODING__",
];

const PYTHON_RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Literal and identifier rules of a guest language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Ruby,
    Python,
    /// POSIX shell spelling, also used by profiles without a preset
    Shell,
}

impl Dialect {
    fn reserved(self) -> &'static [&'static str] {
        match self {
            Dialect::Ruby => RUBY_RESERVED,
            Dialect::Python => PYTHON_RESERVED,
            Dialect::Shell => &[],
        }
    }

    /// Whether `name` can be assigned to as a plain variable
    pub fn is_identifier(
        self,
        name: &str,
    ) -> bool {
        let mut chars = name.chars();
        let head_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        head_ok
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !self.reserved().contains(&name)
    }

    fn float(
        self,
        x: f64,
    ) -> String {
        if x.is_finite() {
            return format!("{:?}", x);
        }
        let (nan, inf) = match self {
            Dialect::Ruby => ("Float::NAN", "Float::INFINITY"),
            Dialect::Python => ("float('nan')", "float('inf')"),
            Dialect::Shell => return format!("'{:?}'", x),
        };
        if x.is_nan() {
            nan.to_string()
        } else if x > 0.0 {
            inf.to_string()
        } else {
            format!("-{}", inf)
        }
    }

    /// Quoted string literal that reads back as exactly `s`
    fn string(
        self,
        s: &str,
    ) -> ReplResult<String> {
        let mut out = String::with_capacity(s.len() + 2);
        match self {
            // Double quotes so control characters can be escaped; `#` is
            // escaped to stop interpolation.
            Dialect::Ruby => {
                out.push('"');
                for c in s.chars() {
                    match c {
                        '\\' => out.push_str("\\\\"),
                        '"' => out.push_str("\\\""),
                        '#' => out.push_str("\\#"),
                        c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
                        c => out.push(c),
                    }
                }
                out.push('"');
            }
            Dialect::Python => {
                out.push('\'');
                for c in s.chars() {
                    match c {
                        '\\' => out.push_str("\\\\"),
                        '\'' => out.push_str("\\'"),
                        c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
                        c => out.push(c),
                    }
                }
                out.push('\'');
            }
            Dialect::Shell => {
                if s.contains('\0') {
                    return Err(ReplError::guest("a shell string cannot hold a NUL byte"));
                }
                out.push('\'');
                out.push_str(&s.replace('\'', "'\\''"));
                out.push('\'');
            }
        }
        Ok(out)
    }
}

/// How to drive one interpreter and spell values in its language
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    pub name: String,
    pub program: String,
    /// Arguments placed before the script
    pub args: Vec<String>,
    pub extensions: Vec<String>,
    pub dialect: Dialect,
    /// Prints the result of calling `{member}` on `{receiver}`
    pub invoke_template: String,
    /// Binds `{value}` to `{name}`
    pub assign_template: String,
    /// Prints the `{marker}` line
    pub marker_template: String,
    pub syntax: Syntax,
}

impl LanguageProfile {
    /// Values without an `as_markup` member fall back to `inspect`
    pub fn ruby() -> Self {
        Self {
            name: "ruby".to_string(),
            program: "ruby".to_string(),
            args: vec!["-e".to_string()],
            extensions: vec![".rb".to_string()],
            dialect: Dialect::Ruby,
            invoke_template: "puts(->(v) { v.respond_to?(:{member}) ? v.{member} : v.inspect }.call({receiver}))"
                .to_string(),
            assign_template: "{name} = {value}".to_string(),
            marker_template: "puts('{marker}')".to_string(),
            syntax: Syntax::ruby(),
        }
    }

    /// Values without an `as_markup` member fall back to `repr`, strings
    /// print as they are
    pub fn python() -> Self {
        Self {
            name: "python".to_string(),
            program: "python3".to_string(),
            args: vec!["-c".to_string()],
            extensions: vec![".py".to_string()],
            dialect: Dialect::Python,
            invoke_template: "print((lambda v: v.{member}() if hasattr(v, '{member}') \
                              else v if isinstance(v, str) else repr(v))({receiver}))"
                .to_string(),
            assign_template: "{name} = {value}".to_string(),
            marker_template: "print('{marker}')".to_string(),
            syntax: Syntax::python(),
        }
    }

    /// A language with no preset: plain syntax, shell spelling, no
    /// extensions
    pub fn generic(
        name: &str,
        program: &str,
        args: Vec<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            program: program.to_string(),
            args,
            extensions: Vec::new(),
            dialect: Dialect::Shell,
            invoke_template: "{receiver}.{member}".to_string(),
            assign_template: "{name}={value}".to_string(),
            marker_template: "echo {marker}".to_string(),
            syntax: Syntax::plain(),
        }
    }

    /// Start from the configured preset, then apply explicit fields
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let mut profile = match config.preset.as_deref() {
            Some("ruby") => Self::ruby(),
            Some("python") => Self::python(),
            Some(other) => {
                return Err(ConfigError::Invalid(format!(
                    "engine '{}' uses unknown preset '{}'",
                    config.name, other
                )))
            }
            None => Self::generic(&config.name, &config.program, Vec::new()),
        };

        profile.name = config.name.clone();
        profile.program = config.program.clone();
        profile.args = config.args.clone();
        if let Some(extensions) = &config.extensions {
            profile.extensions = extensions.clone();
        }
        if let Some(template) = &config.invoke_template {
            profile.invoke_template = template.clone();
        }
        if let Some(template) = &config.assign_template {
            profile.assign_template = template.clone();
        }
        if let Some(template) = &config.marker_template {
            profile.marker_template = template.clone();
        }
        Ok(profile)
    }

    /// Source literal for a value
    pub fn literal(
        &self,
        value: &GuestValue,
    ) -> ReplResult<String> {
        let dialect = self.dialect;
        Ok(match value {
            GuestValue::Nil => match dialect {
                Dialect::Ruby => "nil".to_string(),
                Dialect::Python => "None".to_string(),
                Dialect::Shell => "nil".to_string(),
            },
            GuestValue::Bool(b) => match (dialect, b) {
                (Dialect::Python, true) => "True".to_string(),
                (Dialect::Python, false) => "False".to_string(),
                (_, b) => b.to_string(),
            },
            GuestValue::Int(i) => i.to_string(),
            GuestValue::Float(x) => dialect.float(*x),
            GuestValue::Str(s) => dialect.string(s)?,
            GuestValue::List(items) if dialect != Dialect::Shell => {
                let items = items
                    .iter()
                    .map(|item| self.literal(item))
                    .collect::<ReplResult<Vec<_>>>()?;
                format!("[{}]", items.join(", "))
            }
            GuestValue::List(_) | GuestValue::Object { .. } | GuestValue::Element { .. } => {
                return Err(ReplError::guest(format!(
                    "cannot pass a {} value to the {} process",
                    value.type_name(),
                    self.name
                )))
            }
        })
    }
}

/// Guest engine backed by an external interpreter
#[derive(Debug)]
pub struct ProcessEngine {
    profile: LanguageProfile,
    prelude: Vec<String>,
    captured: String,
}

impl ProcessEngine {
    pub fn new(profile: LanguageProfile) -> Self {
        Self {
            profile,
            prelude: Vec::new(),
            captured: String::new(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        LanguageProfile::from_config(config).map(Self::new)
    }

    pub fn profile(&self) -> &LanguageProfile {
        &self.profile
    }

    /// Sources replayed before every script
    pub fn prelude(&self) -> &[String] {
        &self.prelude
    }

    /// Prelude, marker line, then `code`. The marker is left out while the
    /// prelude is empty.
    fn script(
        &self,
        code: &str,
    ) -> String {
        if self.prelude.is_empty() {
            return code.to_string();
        }
        let marker = self.profile.marker_template.replace("{marker}", REPLAY_MARKER);
        let mut script = self.prelude.join("\n");
        script.push('\n');
        script.push_str(&marker);
        script.push('\n');
        script.push_str(code);
        script
    }

    /// Run `code` after the prelude and return only what `code` printed
    fn run_after_prelude(
        &self,
        code: &str,
    ) -> ReplResult<String> {
        let stdout = self.run(&self.script(code))?;
        if self.prelude.is_empty() {
            return Ok(stdout);
        }
        Ok(match stdout.find(REPLAY_MARKER) {
            Some(at) => {
                let rest = &stdout[at + REPLAY_MARKER.len()..];
                rest.strip_prefix("\r\n")
                    .or_else(|| rest.strip_prefix('\n'))
                    .unwrap_or(rest)
                    .to_string()
            }
            None => stdout,
        })
    }

    /// Run a script and return its standard output
    fn run(
        &self,
        script: &str,
    ) -> ReplResult<String> {
        debug!("{}: running {} bytes", self.profile.name, script.len());
        let output = Command::new(&self.profile.program)
            .args(&self.profile.args)
            .arg(script)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ReplError::guest(format!("failed to start {}: {}", self.profile.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .rev()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| match output.status.code() {
                    Some(code) => format!("{} exited with status {}", self.profile.name, code),
                    None => format!("{} was terminated by a signal", self.profile.name),
                });
            return Err(ReplError::GuestExecution(message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Add `source` to the prelude once a run containing it succeeds
    fn commit(
        &mut self,
        source: String,
    ) -> ReplResult<()> {
        self.run_after_prelude(&source)?;
        self.prelude.push(source);
        Ok(())
    }
}

impl ScriptEngine for ProcessEngine {
    fn name(&self) -> &str {
        &self.profile.name
    }

    fn execute(
        &mut self,
        code: &str,
    ) -> ReplResult<GuestValue> {
        let stdout = self.run_after_prelude(code)?;
        self.captured.push_str(&stdout);
        self.prelude.push(code.to_string());
        Ok(GuestValue::Nil)
    }

    fn read_captured_output(&mut self) -> Option<String> {
        if self.captured.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.captured))
        }
    }

    fn require(
        &mut self,
        path: &Path,
    ) -> ReplResult<()> {
        debug!("{}: require {}", self.profile.name, path.display());
        let source = fs::read_to_string(path)?;
        self.commit(source)
    }

    fn invoke_member(
        &mut self,
        value: &GuestValue,
        member: &str,
    ) -> ReplResult<GuestValue> {
        let receiver = self.profile.literal(value)?;
        let call = self
            .profile
            .invoke_template
            .replace("{member}", member)
            .replace("{receiver}", &receiver);
        let stdout = self.run_after_prelude(&call)?;
        Ok(GuestValue::Str(stdout.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn set_variable(
        &mut self,
        name: &str,
        value: GuestValue,
    ) -> ReplResult<()> {
        if !self.profile.dialect.is_identifier(name) {
            return Err(ReplError::guest(format!(
                "'{}' is not a valid {} variable name",
                name, self.profile.name
            )));
        }
        let literal = self.profile.literal(&value)?;
        let binding = self
            .profile
            .assign_template
            .replace("{name}", name)
            .replace("{value}", &literal);
        self.commit(binding)
    }

    fn file_extensions(&self) -> Vec<String> {
        self.profile.extensions.clone()
    }

    fn syntax(&self) -> Syntax {
        self.profile.syntax.clone()
    }
}
