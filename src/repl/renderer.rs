//! Result Renderer
//!
//! Turns an execution outcome into document fragments. Captured output wins
//! over the returned value: print-style statements are the common case and
//! skip the inspection round-trip entirely.

use tracing::debug;

use super::session::{Outcome, Session};
use crate::colorize::Colorizer;
use crate::document::mutation::insert_colorized_code;
use crate::document::{Document, InlineId};
use crate::engine::{GuestValue, INSPECT_HOOK};
use crate::error::{ReplError, ReplResult};

impl Session {
    /// Insert the rendering of `outcome` after `at`; returns the last
    /// inserted inline.
    pub fn render(
        &mut self,
        document: &mut Document,
        colorizer: &dyn Colorizer,
        outcome: Outcome,
        at: InlineId,
    ) -> ReplResult<InlineId> {
        let syntax = self.current_syntax();

        let value = match outcome {
            // A switch runs no guest code, so there is no output to read
            Outcome::Switched(_) => {
                let confirmation = outcome.to_string();
                return Ok(insert_colorized_code(document, colorizer, &syntax, at, &confirmation));
            }
            Outcome::Value(value) => value,
        };

        if let Some(output) = self.registry.current_mut().read_captured_output() {
            let output = output.trim_end();
            if !output.is_empty() {
                debug!("rendering {} bytes of captured output", output.len());
                return Ok(insert_colorized_code(document, colorizer, &syntax, at, output));
            }
        }

        let text = self.inspect(&value)?;
        Ok(insert_colorized_code(document, colorizer, &syntax, at, &text))
    }

    /// Textual form of a value via the inspection hook.
    ///
    /// The viewer for the value's type is loaded into the current engine
    /// first; the hook itself always runs on the inspecting engine.
    pub fn inspect(
        &mut self,
        value: &GuestValue,
    ) -> ReplResult<String> {
        self.inspector
            .ensure_loaded(value, self.registry.current_mut())?;

        match self.inspecting_engine().invoke_member(value, INSPECT_HOOK)? {
            GuestValue::Str(text) => Ok(text),
            other => Err(ReplError::NotImplemented(format!(
                "cannot insert a {} in the middle of a document yet",
                other.type_name()
            ))),
        }
    }
}
