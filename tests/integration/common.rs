//! Shared fixtures: a scripted engine and pads built on it

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use replpad::document::Document;
use replpad::repl::{InspectorLoader, ReplPad, Session, ViewerSource};
use replpad::{GuestValue, InlineId, ReplError, ReplResult, ScriptEngine, Style};

/// Answers and call log of one scripted engine
#[derive(Default)]
pub struct Script {
    pub results: HashMap<String, Result<GuestValue, String>>,
    pub output: HashMap<String, String>,
    pub markup: HashMap<String, GuestValue>,
    pub calls: Vec<String>,
}

impl Script {
    pub fn returns(
        &mut self,
        code: &str,
        value: GuestValue,
    ) {
        self.results.insert(code.to_string(), Ok(value));
    }

    pub fn fails(
        &mut self,
        code: &str,
        message: &str,
    ) {
        self.results.insert(code.to_string(), Err(message.to_string()));
    }

    pub fn prints(
        &mut self,
        code: &str,
        output: &str,
    ) {
        self.output.insert(code.to_string(), output.to_string());
    }

    pub fn count(
        &self,
        prefix: &str,
    ) -> usize {
        self.calls.iter().filter(|c| c.starts_with(prefix)).count()
    }
}

pub type Handle = Rc<RefCell<Script>>;

pub struct ScriptedEngine {
    name: String,
    extensions: Vec<String>,
    script: Handle,
    pending: String,
}

impl ScriptedEngine {
    pub fn boxed(
        name: &str,
        extensions: &[&str],
    ) -> (Box<dyn ScriptEngine>, Handle) {
        let script = Handle::default();
        let engine = Self {
            name: name.to_string(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            script: script.clone(),
            pending: String::new(),
        };
        (Box::new(engine), script)
    }
}

impl ScriptEngine for ScriptedEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(
        &mut self,
        code: &str,
    ) -> ReplResult<GuestValue> {
        let mut script = self.script.borrow_mut();
        script.calls.push(format!("execute {}", code));
        if let Some(output) = script.output.get(code) {
            self.pending.push_str(output);
        }
        match script.results.get(code) {
            Some(result) => result.clone().map_err(ReplError::guest),
            None => Ok(GuestValue::Nil),
        }
    }

    fn read_captured_output(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }

    fn require(
        &mut self,
        path: &Path,
    ) -> ReplResult<()> {
        let file = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.script.borrow_mut().calls.push(format!("require {}", file));
        Ok(())
    }

    fn invoke_member(
        &mut self,
        value: &GuestValue,
        member: &str,
    ) -> ReplResult<GuestValue> {
        let mut script = self.script.borrow_mut();
        script.calls.push(format!("invoke {} {}", member, value));
        Ok(script
            .markup
            .get(&value.to_string())
            .cloned()
            .unwrap_or_else(|| GuestValue::Str(value.to_string())))
    }

    fn set_variable(
        &mut self,
        name: &str,
        value: GuestValue,
    ) -> ReplResult<()> {
        self.script
            .borrow_mut()
            .calls
            .push(format!("set {}={}", name, value));
        Ok(())
    }

    fn file_extensions(&self) -> Vec<String> {
        self.extensions.clone()
    }
}

/// Viewer source with nothing in it that counts probes
#[derive(Default)]
pub struct EmptyViewers {
    pub probes: Rc<RefCell<usize>>,
}

impl ViewerSource for EmptyViewers {
    fn locate(
        &self,
        _type_name: &str,
        _extension: &str,
    ) -> Option<PathBuf> {
        *self.probes.borrow_mut() += 1;
        None
    }
}

/// Session over `ruby` (current, inspecting) and `python`
pub fn session() -> (Session, Handle, Handle) {
    let (ruby, ruby_script) = ScriptedEngine::boxed("ruby", &[".rb"]);
    let (python, python_script) = ScriptedEngine::boxed("python", &[".py"]);
    let loader = InspectorLoader::new(Box::new(EmptyViewers::default()));
    (Session::new(ruby, python, loader), ruby_script, python_script)
}

/// Pad over a document holding `text`, caret at its end
pub fn pad(text: &str) -> (ReplPad, Handle, Handle) {
    let (session, ruby, python) = session();
    let pad = ReplPad::new(session).with_document(Document::with_text(text));
    (pad, ruby, python)
}

pub fn error_texts(document: &Document) -> Vec<String> {
    runs_with(document, |style| style == Style::Error)
}

pub fn runs_with(
    document: &Document,
    keep: impl Fn(Style) -> bool,
) -> Vec<String> {
    document
        .leaves()
        .into_iter()
        .filter(|id| document.style(*id).is_some_and(&keep))
        .filter_map(|id| document.run_text(id).map(str::to_string))
        .collect()
}

pub fn last_leaf(document: &Document) -> InlineId {
    document.leaves().last().copied().unwrap()
}
