//! REPL Command Handler
//!
//! Handles special commands starting with ':'.

use super::render::render_document;
use crate::engine::GuestValue;
use crate::repl::ReplPad;

/// Command result
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Exit the REPL
    Exit,
    /// Continue to next input
    Continue,
    /// Output a message
    Output(String),
}

/// Command handler for REPL
pub struct CommandHandler<'a> {
    pad: &'a mut ReplPad,
    colors: bool,
}

impl<'a> CommandHandler<'a> {
    /// Create a new command handler
    pub fn new(
        pad: &'a mut ReplPad,
        colors: bool,
    ) -> Self {
        Self { pad, colors }
    }

    /// Handle a command; `None` if `line` is not a command
    pub fn handle(
        &mut self,
        line: &str,
    ) -> Option<CommandResult> {
        let cmd = line.trim().strip_prefix(':')?.trim();
        let mut parts = cmd.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or_default().trim();

        let result = match name {
            "quit" | "q" => CommandResult::Exit,
            "help" | "h" => CommandResult::Output(help_text()),
            "langs" | "l" => CommandResult::Output(self.languages()),
            "doc" | "d" => CommandResult::Output(render_document(self.pad.document(), self.colors)),
            "save" | "s" => match self.pad.save() {
                Ok(path) => CommandResult::Output(format!("Saved to {}", path.display())),
                Err(e) => CommandResult::Output(format!("Error: {}", e)),
            },
            "bind" | "b" => self.bind(rest),
            "" => CommandResult::Continue,
            _ => CommandResult::Output(format!("Unknown command: {}", line.trim())),
        };
        Some(result)
    }

    /// Registered languages, current one marked with `*`
    fn languages(&self) -> String {
        let session = self.pad.session();
        session
            .registry()
            .names()
            .into_iter()
            .map(|name| {
                let marker = if name == session.current_name() { "*" } else { " " };
                format!("{} {}", marker, name)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn bind(
        &mut self,
        args: &str,
    ) -> CommandResult {
        let mut parts = args.splitn(2, char::is_whitespace);
        let (Some(name), Some(value)) = (parts.next().filter(|n| !n.is_empty()), parts.next()) else {
            return CommandResult::Output("Usage: :bind <name> <value>".to_string());
        };

        let value = parse_host_value(value.trim());
        let shown = value.to_string();
        match self.pad.bind(name, value) {
            Ok(()) => CommandResult::Output(format!("{} = {}", name, shown)),
            Err(e) => CommandResult::Output(format!("Error: {}", e)),
        }
    }
}

fn help_text() -> String {
    [
        "Available commands:",
        "  :quit, :q              - Exit the REPL",
        "  :help, :h              - Show this help",
        "  :langs, :l             - List languages (* marks the current one)",
        "  :doc, :d               - Print the whole document",
        "  :save, :s              - Save the document as JSON",
        "  :bind, :b <name> <val> - Bind a host value in the current language",
        "",
        "Type %<language> to switch languages.",
    ]
    .join("\n")
}

/// Host value from command text: `nil`, booleans, integers, floats,
/// double-quoted strings; anything else is taken as a bare string.
pub fn parse_host_value(text: &str) -> GuestValue {
    match text {
        "nil" => return GuestValue::Nil,
        "true" => return GuestValue::Bool(true),
        "false" => return GuestValue::Bool(false),
        _ => {}
    }
    if let Ok(i) = text.parse::<i64>() {
        return GuestValue::Int(i);
    }
    // `inf` and `nan` stay text
    if let Some(x) = text.parse::<f64>().ok().filter(|x| x.is_finite()) {
        return GuestValue::Float(x);
    }
    let unquoted = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    GuestValue::Str(unquoted.to_string())
}
